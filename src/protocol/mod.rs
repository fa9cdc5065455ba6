pub mod command;
pub mod parser;
pub mod reading;

pub use command::DeviceCommand;
pub use parser::{classify, parse, LineKind};
pub use reading::{Direction, Reading};
