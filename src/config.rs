use crate::constants::{
    EMERGENCY_CLEAR_SECONDS, EVENT_FILE, LOG_FILE, MAX_GREEN, MIN_GREEN, PHASE_REPORT_FILE,
    TICK_MILLIS,
};
use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Runtime settings for one simulation run.
///
/// Every field has a default, so a JSON file only needs the keys it changes:
///
/// ```json
/// { "event_file": "rush_hour.txt", "tick_millis": 20 }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Event source to replay.
    pub event_file: PathBuf,
    /// Status log written during the run.
    pub log_file: PathBuf,
    /// CSV summary of every green phase, written after the run. `null` disables it.
    pub phase_report: Option<PathBuf>,
    /// Real milliseconds per simulated second.
    pub tick_millis: u64,
    /// Simulated seconds until an emergency clears itself.
    pub emergency_clear_seconds: u64,
    pub min_green: u32,
    pub max_green: u32,
    /// Echo status lines to stdout as well as the log file.
    pub echo_stdout: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            event_file: PathBuf::from(EVENT_FILE),
            log_file: PathBuf::from(LOG_FILE),
            phase_report: Some(PathBuf::from(PHASE_REPORT_FILE)),
            tick_millis: TICK_MILLIS,
            emergency_clear_seconds: EMERGENCY_CLEAR_SECONDS,
            min_green: MIN_GREEN,
            max_green: MAX_GREEN,
            echo_stdout: true,
        }
    }
}

impl SimulationConfig {
    /// Reads and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_green == 0 {
            return Err(ConfigError::Invalid("min_green must be at least 1".into()));
        }
        if self.min_green > self.max_green {
            return Err(ConfigError::Invalid(format!(
                "min_green ({}) exceeds max_green ({})",
                self.min_green, self.max_green
            )));
        }
        Ok(())
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }
}
