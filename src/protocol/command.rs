/// Commands the host sends to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCommand {
    Start,
    Stop,
}

impl DeviceCommand {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DeviceCommand::Start => "START",
            DeviceCommand::Stop => "STOP",
        }
    }

    /// Wire form: the token followed by a newline.
    pub const fn as_bytes(&self) -> &'static [u8] {
        match self {
            DeviceCommand::Start => b"START\n",
            DeviceCommand::Stop => b"STOP\n",
        }
    }
}
