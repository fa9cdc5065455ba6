use std::{fmt, io};

/// Everything that can end a connection attempt or a running session.
///
/// None of these are fatal to the process. The controller logs them and
/// drops back to idle so the user can retry.
#[derive(Debug)]
pub enum MonitorError {
    DeviceNotFound,
    DeviceBusy { path: String, reason: String },
    HandshakeWriteFailed { path: String, source: io::Error },
    SessionIo(io::Error),
}

impl fmt::Display for MonitorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorError::DeviceNotFound => f.write_str("joystick board not found"),
            MonitorError::DeviceBusy { path, reason } => {
                write!(f, "port {path} busy/unavailable: {reason}")
            }
            MonitorError::HandshakeWriteFailed { path, source } => {
                write!(f, "failed to send START on {path}: {source}")
            }
            MonitorError::SessionIo(err) => write!(f, "serial I/O failed: {err}"),
        }
    }
}

impl std::error::Error for MonitorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MonitorError::HandshakeWriteFailed { source, .. } => Some(source),
            MonitorError::SessionIo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for MonitorError {
    fn from(value: io::Error) -> Self {
        Self::SessionIo(value)
    }
}

pub type Result<T> = core::result::Result<T, MonitorError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn handshake_failure_keeps_io_source() {
        let err = MonitorError::HandshakeWriteFailed {
            path: "/dev/ttyACM0".into(),
            source: io::Error::new(io::ErrorKind::BrokenPipe, "gone"),
        };
        assert!(err.to_string().contains("/dev/ttyACM0"));
        assert!(err.source().is_some());
    }

    #[test]
    fn io_errors_convert_to_session_errors() {
        let err: MonitorError = io::Error::from(io::ErrorKind::TimedOut).into();
        assert!(matches!(err, MonitorError::SessionIo(_)));
    }
}
