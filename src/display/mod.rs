pub mod json;
pub mod terminal;

pub use json::JsonLinesDisplay;
pub use terminal::TerminalDisplay;

use crate::{
    acquisition::SessionSnapshot,
    protocol::{Direction, Reading},
};

/// Full-scale value of an axis bar.
pub const BAR_MAX: u16 = 500;

/// Receives everything the acquisition loop wants shown.
pub trait DisplaySink {
    fn on_reading(&mut self, reading: &Reading);

    fn on_rate(&mut self, _hz: f64) {}

    fn on_state_changed(&mut self, _snapshot: &SessionSnapshot) {}
}

impl<T: DisplaySink + ?Sized> DisplaySink for Box<T> {
    fn on_reading(&mut self, reading: &Reading) {
        (**self).on_reading(reading)
    }

    fn on_rate(&mut self, hz: f64) {
        (**self).on_rate(hz)
    }

    fn on_state_changed(&mut self, snapshot: &SessionSnapshot) {
        (**self).on_state_changed(snapshot)
    }
}

/// Scales an axis voltage to the 0..=500 bar range, truncating toward zero.
pub fn bar_value(volts: f64) -> u16 {
    if volts.is_nan() {
        return 0;
    }
    (volts * 100.0).trunc().clamp(0.0, BAR_MAX as f64) as u16
}

/// Which cell of the five-cell direction cross is lit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadCell {
    Up,
    Down,
    Left,
    Right,
    Center,
}

impl From<&Direction> for PadCell {
    fn from(direction: &Direction) -> Self {
        match direction {
            Direction::Up => PadCell::Up,
            Direction::Down => PadCell::Down,
            Direction::Left => PadCell::Left,
            Direction::Right => PadCell::Right,
            Direction::Center | Direction::Other(_) => PadCell::Center,
        }
    }
}
