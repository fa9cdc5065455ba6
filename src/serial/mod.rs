pub mod connection;
pub mod discovery;
#[cfg(test)]
pub(crate) mod fake;
pub mod transport;

use std::time::Duration;

pub use connection::{connect_and_start, Connection, HandshakeConfig};
pub use transport::{Connector, Transport};

use crate::{error::MonitorError, settings::MonitorSettings};

/// Real serial ports, found by pattern or taken from the configured override.
#[derive(Debug, Clone)]
pub struct SerialConnector {
    port_override: Option<String>,
    patterns: Vec<String>,
    baud: u32,
    read_timeout: Duration,
}

impl SerialConnector {
    pub fn new(settings: &MonitorSettings) -> Self {
        Self {
            port_override: settings.port.clone(),
            patterns: settings.port_patterns.clone(),
            baud: settings.baud,
            read_timeout: settings.read_timeout(),
        }
    }
}

impl Connector for SerialConnector {
    fn discover(&self) -> Option<String> {
        match &self.port_override {
            Some(port) => Some(port.clone()),
            None => discovery::discover(&self.patterns),
        }
    }

    fn open(&self, path: &str) -> Result<Box<dyn Transport>, MonitorError> {
        serialport::new(path, self.baud)
            .timeout(self.read_timeout)
            .open()
            .map(|port| Box::new(port) as Box<dyn Transport>)
            .map_err(|err| MonitorError::DeviceBusy {
                path: path.to_string(),
                reason: err.to_string(),
            })
    }
}
