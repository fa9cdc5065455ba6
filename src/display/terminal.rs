use std::io::Write;

use crate::{
    acquisition::{AcquisitionStatus, SessionSnapshot},
    protocol::Reading,
};

use super::{bar_value, DisplaySink, PadCell, BAR_MAX};

const BAR_WIDTH: usize = 20;

/// Single-line live view: both axes as bars, the direction cross and the rate.
pub struct TerminalDisplay<W: Write> {
    out: W,
    last: Option<Reading>,
    hz: Option<f64>,
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last: None,
            hz: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&mut self) {
        let Some(reading) = &self.last else {
            return;
        };
        let rate = match self.hz {
            Some(hz) => format!("{hz:.1}"),
            None => "-".to_string(),
        };
        let line = format!(
            "\rX: {:.2} V {} Y: {:.2} V {} {} Dir: {:<7} Hz: {:<6}",
            reading.x,
            bar(reading.x),
            reading.y,
            bar(reading.y),
            pad(PadCell::from(&reading.direction)),
            reading.direction.as_str(),
            rate,
        );
        let _ = self.out.write_all(line.as_bytes());
        let _ = self.out.flush();
    }
}

impl<W: Write> DisplaySink for TerminalDisplay<W> {
    fn on_reading(&mut self, reading: &Reading) {
        self.last = Some(reading.clone());
        self.render();
    }

    fn on_rate(&mut self, hz: f64) {
        self.hz = Some(hz);
        self.render();
    }

    fn on_state_changed(&mut self, snapshot: &SessionSnapshot) {
        let message = match (snapshot.status, &snapshot.last_error) {
            (AcquisitionStatus::Running, _) => {
                self.last = None;
                self.hz = None;
                format!(
                    "Running on {}. Type 'stop' to end.",
                    snapshot.port.as_deref().unwrap_or("?")
                )
            }
            (AcquisitionStatus::Idle, Some(err)) => {
                format!("Stopped: {err}. Type 'start' to retry.")
            }
            (AcquisitionStatus::Idle, None) => "Stopped. Type 'start' to begin.".to_string(),
        };
        let _ = writeln!(self.out, "\n{message}");
        let _ = self.out.flush();
    }
}

fn bar(volts: f64) -> String {
    let filled = bar_value(volts) as usize * BAR_WIDTH / BAR_MAX as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

/// Cross laid out left-to-right as `< ^ o v >`; only the lit cell shows.
fn pad(cell: PadCell) -> String {
    [
        (PadCell::Left, '<'),
        (PadCell::Up, '^'),
        (PadCell::Center, 'o'),
        (PadCell::Down, 'v'),
        (PadCell::Right, '>'),
    ]
    .iter()
    .map(|&(candidate, glyph)| if candidate == cell { glyph } else { '.' })
    .collect()
}
