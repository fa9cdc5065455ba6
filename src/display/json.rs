use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    acquisition::SessionSnapshot,
    protocol::{Direction, Reading},
};

use super::{bar_value, DisplaySink};

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
enum DisplayEvent<'a> {
    #[serde(rename_all = "camelCase")]
    Reading {
        timestamp: DateTime<Utc>,
        x: f64,
        y: f64,
        direction: &'a Direction,
        bar_x: u16,
        bar_y: u16,
    },
    Rate {
        hz: f64,
    },
    StateChanged {
        state: &'a SessionSnapshot,
    },
}

/// Emits one JSON object per line for consumption by another program.
pub struct JsonLinesDisplay<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, event: &DisplayEvent<'_>) {
        if serde_json::to_writer(&mut self.out, event).is_ok() {
            let _ = self.out.write_all(b"\n");
            let _ = self.out.flush();
        }
    }
}

impl<W: Write> DisplaySink for JsonLinesDisplay<W> {
    fn on_reading(&mut self, reading: &Reading) {
        self.emit(&DisplayEvent::Reading {
            timestamp: Utc::now(),
            x: reading.x,
            y: reading.y,
            direction: &reading.direction,
            bar_x: bar_value(reading.x),
            bar_y: bar_value(reading.y),
        });
    }

    fn on_rate(&mut self, hz: f64) {
        self.emit(&DisplayEvent::Rate { hz });
    }

    fn on_state_changed(&mut self, snapshot: &SessionSnapshot) {
        self.emit(&DisplayEvent::StateChanged { state: snapshot });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::AcquisitionStatus;
    use serde_json::Value;

    fn events(display: JsonLinesDisplay<Vec<u8>>) -> Vec<Value> {
        String::from_utf8(display.into_inner())
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn reading_event_carries_clamped_bars() {
        let mut display = JsonLinesDisplay::new(Vec::new());
        display.on_reading(&Reading {
            x: 10.0,
            y: -5.0,
            direction: Direction::Right,
        });

        let events = events(display);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["event"], "reading");
        assert_eq!(events[0]["direction"], "RIGHT");
        assert_eq!(events[0]["barX"], 500);
        assert_eq!(events[0]["barY"], 0);
        assert!(events[0]["timestamp"].is_string());
    }

    #[test]
    fn state_and_rate_events_are_camel_case() {
        let mut display = JsonLinesDisplay::new(Vec::new());
        let snapshot = SessionSnapshot {
            status: AcquisitionStatus::Running,
            port: Some("/dev/ttyACM0".into()),
            ..SessionSnapshot::default()
        };
        display.on_state_changed(&snapshot);
        display.on_rate(20.0);

        let events = events(display);
        assert_eq!(events[0]["event"], "stateChanged");
        assert_eq!(events[0]["state"]["status"], "running");
        assert_eq!(events[0]["state"]["port"], "/dev/ttyACM0");
        assert_eq!(events[1]["event"], "rate");
        assert_eq!(events[1]["hz"], 20.0);
    }
}
