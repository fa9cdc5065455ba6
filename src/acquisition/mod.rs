pub mod commands;
pub mod controller;
pub mod loop_worker;
pub mod state;

pub use commands::{spawn_stdin_commands, ControlCommand};
pub use controller::{AcquisitionController, TickOutcome};
pub use loop_worker::acquisition_loop;
pub use state::{AcquisitionStatus, SessionSnapshot, SessionState};
