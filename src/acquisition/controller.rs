use std::time::Instant;

use chrono::Utc;
use log::{debug, error, info, trace, warn};
use uuid::Uuid;

use crate::{
    display::DisplaySink,
    error::{MonitorError, Result},
    protocol::{classify, LineKind},
    serial::{connect_and_start, Connection, Connector, HandshakeConfig},
};

use super::{AcquisitionStatus, SessionSnapshot, SessionState};

/// Result of one poll step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running, nothing read.
    Idle,
    /// Port drained; this many readings went to the display.
    Drained(usize),
    /// The port failed and the session was torn down.
    Failed,
}

/// Idle/Running state machine driven by `start`, `stop` and `tick`.
///
/// Owns the connection outright: it exists only while a session runs and is
/// dropped (which sends `STOP`) on every path back to idle.
pub struct AcquisitionController<D: DisplaySink> {
    state: SessionState,
    connection: Option<Connection>,
    connector: Box<dyn Connector>,
    handshake: HandshakeConfig,
    display: D,
}

impl<D: DisplaySink> AcquisitionController<D> {
    pub fn new(connector: Box<dyn Connector>, handshake: HandshakeConfig, display: D) -> Self {
        Self {
            state: SessionState::new(),
            connection: None,
            connector,
            handshake,
            display,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.clone()
    }

    pub fn status(&self) -> AcquisitionStatus {
        self.state.status
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Connects (discovery plus handshake) and begins a session.
    ///
    /// Failures leave the controller idle with the error recorded and the
    /// display notified; they are also returned for the caller's benefit.
    pub fn start(&mut self) -> Result<()> {
        if self.state.is_running() {
            warn!("Start requested while already running; ignoring");
            return Ok(());
        }

        if self.connection.is_none() {
            match self.connect() {
                Ok(connection) => self.connection = Some(connection),
                Err(err) => {
                    error!("Start failed: {err}");
                    self.state.fail(err.to_string());
                    self.notify_state();
                    return Err(err);
                }
            }
        }

        let port = self
            .connection
            .as_ref()
            .map(|conn| conn.path().to_string())
            .unwrap_or_default();
        let session_id = Uuid::new_v4().to_string();
        info!("Session {session_id} running on {port}");
        self.state.begin_session(session_id, port, Utc::now());
        self.notify_state();
        Ok(())
    }

    fn connect(&self) -> Result<Connection> {
        let path = self.connector.discover().ok_or(MonitorError::DeviceNotFound)?;
        info!("Connecting to {path} at {} baud", self.handshake.baud);
        connect_and_start(&*self.connector, &path, &self.handshake)
    }

    pub fn stop(&mut self) {
        let was_active = self.state.is_running() || self.connection.is_some();
        self.state.stop();
        self.release();
        if was_active {
            info!("Session stopped");
            self.notify_state();
        }
    }

    /// Drains the port and forwards every parsed reading to the display.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        if !self.state.is_running() {
            return TickOutcome::Idle;
        }
        let Some(connection) = self.connection.as_mut() else {
            return TickOutcome::Idle;
        };

        let lines = match connection.drain_lines() {
            Ok(lines) => lines,
            Err(err) => {
                self.fail_session(MonitorError::SessionIo(err));
                return TickOutcome::Failed;
            }
        };

        let mut parsed = 0;
        for line in &lines {
            match classify(line) {
                LineKind::Telemetry(reading) => {
                    self.display.on_reading(&reading);
                    parsed += 1;
                }
                LineKind::Status(status) => debug!("Device status: {status}"),
                LineKind::Malformed => trace!("Dropping malformed line {:?}", line.trim_end()),
                LineKind::Blank => {}
            }
        }

        if let Some(hz) = self.state.record_tick(parsed, now) {
            self.display.on_rate(hz);
        }
        TickOutcome::Drained(parsed)
    }

    fn fail_session(&mut self, err: MonitorError) {
        error!("Session ended: {err}");
        self.state.fail(err.to_string());
        self.release();
        self.notify_state();
    }

    fn release(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.close();
        }
    }

    fn notify_state(&mut self) {
        let snapshot = self.state.clone();
        self.display.on_state_changed(&snapshot);
    }
}

impl<D: DisplaySink> Drop for AcquisitionController<D> {
    fn drop(&mut self) {
        self.release();
    }
}
