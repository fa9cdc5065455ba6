use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock, time::Duration};

pub const CONFIG_ENV: &str = "JOYMON_CONFIG";
pub const PORT_ENV: &str = "JOYMON_PORT";
const DEFAULT_CONFIG_FILE: &str = "joymon.json";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum OutputMode {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MonitorSettings {
    /// Fixed device path; skips discovery when set.
    pub port: Option<String>,
    /// Device path patterns tried in order. A single `*` matches anything.
    pub port_patterns: Vec<String>,
    pub baud: u32,
    pub read_timeout_ms: u64,
    /// Opening the port resets the board; give it this long to boot.
    pub settle_ms: u64,
    pub boot_timeout_ms: u64,
    pub boot_marker: String,
    pub tick_interval_ms: u64,
    pub output: OutputMode,
    pub auto_start: bool,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            port: None,
            port_patterns: vec![
                "/dev/cu.usbmodem*".into(),
                "/dev/cu.usbserial*".into(),
                "/dev/ttyACM*".into(),
                "/dev/ttyUSB*".into(),
            ],
            baud: 9600,
            read_timeout_ms: 200,
            settle_ms: 2000,
            boot_timeout_ms: 3000,
            boot_marker: "SYSTEM READY".into(),
            tick_interval_ms: 20,
            output: OutputMode::Text,
            auto_start: false,
        }
    }
}

impl MonitorSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    fn apply_env(&mut self) {
        if let Ok(port) = std::env::var(PORT_ENV) {
            let port = port.trim();
            if !port.is_empty() {
                self.port = Some(port.to_string());
            }
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<MonitorSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("Ignoring invalid settings in {}: {err}", path.display());
                MonitorSettings::default()
            })
        } else {
            MonitorSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    /// Loads from `JOYMON_CONFIG` (or `./joymon.json`) and applies env overrides.
    pub fn from_env() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        let store = Self::new(path)?;
        {
            let mut guard = store
                .data
                .write()
                .map_err(|_| anyhow::anyhow!("settings lock poisoned"))?;
            guard.apply_env();
        }
        Ok(store)
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn current(&self) -> MonitorSettings {
        match self.data.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn update(&self, settings: MonitorSettings) -> Result<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow::anyhow!("settings lock poisoned"))?;
        *guard = settings;
        self.persist(&guard)
    }

    fn persist(&self, data: &MonitorSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("joymon-settings-{}.json", uuid::Uuid::new_v4()))
    }

    #[test]
    fn missing_file_gives_defaults() {
        let store = SettingsStore::new(temp_path()).unwrap();
        let settings = store.current();
        assert_eq!(settings.baud, 9600);
        assert_eq!(settings.tick_interval(), Duration::from_millis(20));
        assert_eq!(settings.boot_marker, "SYSTEM READY");
        assert_eq!(settings.port_patterns[0], "/dev/cu.usbmodem*");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let path = temp_path();
        fs::write(&path, r#"{"port": "/dev/ttyACM3", "output": "json"}"#).unwrap();

        let settings = SettingsStore::new(path.clone()).unwrap().current();
        assert_eq!(settings.port.as_deref(), Some("/dev/ttyACM3"));
        assert_eq!(settings.output, OutputMode::Json);
        assert_eq!(settings.settle_ms, 2000);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn invalid_file_falls_back_to_defaults() {
        let path = temp_path();
        fs::write(&path, "not json").unwrap();

        let settings = SettingsStore::new(path.clone()).unwrap().current();
        assert_eq!(settings, MonitorSettings::default());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn update_persists_to_disk() {
        let path = temp_path();
        let store = SettingsStore::new(path.clone()).unwrap();

        let mut settings = store.current();
        settings.baud = 115_200;
        store.update(settings).unwrap();

        let reloaded = SettingsStore::new(path.clone()).unwrap().current();
        assert_eq!(reloaded.baud, 115_200);

        let _ = fs::remove_file(path);
    }
}
