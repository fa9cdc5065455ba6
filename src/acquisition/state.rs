use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum AcquisitionStatus {
    #[default]
    Idle,
    Running,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub status: AcquisitionStatus,
    pub session_id: Option<String>,
    pub port: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub readings: u64,
    pub last_error: Option<String>,
    /// Wall-clock anchor of the previous tick that produced readings.
    #[serde(skip)]
    pub last_reading_at: Option<Instant>,
}

/// What the display is told about on every state change.
pub type SessionSnapshot = SessionState;

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.status == AcquisitionStatus::Running
    }

    pub fn begin_session(&mut self, session_id: String, port: String, started_at: DateTime<Utc>) {
        *self = Self {
            status: AcquisitionStatus::Running,
            session_id: Some(session_id),
            port: Some(port),
            started_at: Some(started_at),
            readings: 0,
            last_error: None,
            last_reading_at: None,
        };
    }

    /// Records a tick that parsed `parsed` readings and returns the update
    /// rate in Hz when there is a previous productive tick to measure from.
    pub fn record_tick(&mut self, parsed: usize, now: Instant) -> Option<f64> {
        if parsed == 0 {
            return None;
        }
        self.readings = self.readings.saturating_add(parsed as u64);

        let rate = self.last_reading_at.and_then(|previous| {
            let elapsed = now.saturating_duration_since(previous).as_secs_f64();
            (elapsed > 0.0).then(|| 1.0 / elapsed)
        });
        self.last_reading_at = Some(now);
        rate
    }

    pub fn stop(&mut self) {
        self.status = AcquisitionStatus::Idle;
        self.last_reading_at = None;
    }

    pub fn fail(&mut self, reason: String) {
        self.stop();
        self.last_error = Some(reason);
    }
}
