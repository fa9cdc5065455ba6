use std::{
    io::{self, ErrorKind, Read, Write},
    thread,
    time::{Duration, Instant},
};

use crate::{
    error::{MonitorError, Result},
    protocol::DeviceCommand,
    settings::MonitorSettings,
};

use super::transport::{Connector, Transport};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

const READ_CHUNK: usize = 256;
/// A line longer than this without a newline is noise; drop it.
const MAX_PENDING: usize = 4096;

/// Timing and marker used while the board boots after the port opens.
#[derive(Debug, Clone)]
pub struct HandshakeConfig {
    pub baud: u32,
    pub settle: Duration,
    pub boot_timeout: Duration,
    pub boot_marker: String,
    pub poll_interval: Duration,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self::from(&MonitorSettings::default())
    }
}

impl From<&MonitorSettings> for HandshakeConfig {
    fn from(settings: &MonitorSettings) -> Self {
        Self {
            baud: settings.baud,
            settle: Duration::from_millis(settings.settle_ms),
            boot_timeout: Duration::from_millis(settings.boot_timeout_ms),
            boot_marker: settings.boot_marker.clone(),
            poll_interval: Duration::from_millis(10),
        }
    }
}

/// An open link to the board.
///
/// Holding a `Connection` means the port is open. Dropping it sends `STOP`
/// (errors ignored) and releases the port, unless the board never got `START`.
pub struct Connection {
    path: String,
    baud: u32,
    transport: Box<dyn Transport>,
    pending: Vec<u8>,
    stop_on_drop: bool,
}

impl Connection {
    pub fn new(path: impl Into<String>, baud: u32, transport: Box<dyn Transport>) -> Self {
        Self {
            path: path.into(),
            baud,
            transport,
            pending: Vec::new(),
            stop_on_drop: true,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn baud(&self) -> u32 {
        self.baud
    }

    pub fn send(&mut self, command: DeviceCommand) -> io::Result<()> {
        self.transport.write_all(command.as_bytes())?;
        self.transport.flush()
    }

    /// Reads everything currently buffered and returns the complete lines.
    ///
    /// Checks `bytes_available` before every read so it never blocks on an
    /// idle port. A trailing partial line stays buffered for the next call.
    pub fn drain_lines(&mut self) -> io::Result<Vec<String>> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            let available = self.transport.bytes_available()?;
            if available == 0 {
                break;
            }

            let want = available.min(READ_CHUNK);
            match self.transport.read(&mut chunk[..want]) {
                Ok(0) => break,
                Ok(read) => self.pending.extend_from_slice(&chunk[..read]),
                Err(err) if matches!(err.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                    break
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }

        Ok(self.take_lines())
    }

    fn take_lines(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=pos).collect();
            lines.push(decode_line(&raw));
        }

        if self.pending.len() > MAX_PENDING {
            log_warn!(
                "Discarding {} bytes without a line ending from {}",
                self.pending.len(),
                self.path
            );
            self.pending.clear();
        }
        lines
    }

    /// Polls for a line containing `marker` until `timeout` elapses.
    /// A read error ends the wait early; it is reported as "not seen".
    pub fn wait_for_marker(&mut self, marker: &str, timeout: Duration, poll: Duration) -> bool {
        let started = Instant::now();
        while started.elapsed() < timeout {
            match self.drain_lines() {
                Ok(lines) => {
                    for line in &lines {
                        log_debug!("BOOT: {}", line.trim());
                    }
                    if lines.iter().any(|line| line.contains(marker)) {
                        return true;
                    }
                }
                Err(err) => {
                    log_debug!("Read failed while waiting for boot marker: {err}");
                    return false;
                }
            }
            thread::sleep(poll);
        }
        false
    }

    /// Drops buffered input, both in the driver and in the line assembler.
    pub fn discard_input(&mut self) {
        if let Err(err) = self.transport.clear_input() {
            log_debug!("Failed to clear input on {}: {err}", self.path);
        }
        self.pending.clear();
    }

    /// Closes the port, sending `STOP` first.
    pub fn close(self) {
        log_info!("Closing {}", self.path);
        drop(self);
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if !self.stop_on_drop {
            return;
        }
        if let Err(err) = self.send(DeviceCommand::Stop) {
            log_debug!("STOP not delivered to {}: {err}", self.path);
        }
    }
}

/// Decodes a raw line, dropping byte sequences that are not valid UTF-8.
fn decode_line(raw: &[u8]) -> String {
    raw.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("path", &self.path)
            .field("baud", &self.baud)
            .field("pending", &self.pending.len())
            .finish()
    }
}

/// Opens `path`, waits out the board reset and sends `START`.
///
/// The boot marker is best-effort: some boards never print it, so a missing
/// marker only logs a warning.
pub fn connect_and_start(
    connector: &dyn Connector,
    path: &str,
    config: &HandshakeConfig,
) -> Result<Connection> {
    let transport = connector.open(path)?;
    let mut connection = Connection::new(path, config.baud, transport);

    thread::sleep(config.settle);

    if connection.wait_for_marker(&config.boot_marker, config.boot_timeout, config.poll_interval) {
        log_debug!("Saw boot marker on {path}");
    } else {
        log_warn!("No '{}' from {path}; sending START anyway", config.boot_marker);
    }

    connection.discard_input();

    if let Err(source) = connection.send(DeviceCommand::Start) {
        log_error!("Failed to send START on {path}: {source}");
        connection.stop_on_drop = false;
        return Err(MonitorError::HandshakeWriteFailed {
            path: path.to_string(),
            source,
        });
    }

    log_info!("Connected on {path} -> START sent");
    Ok(connection)
}
