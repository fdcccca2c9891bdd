//! Runtime configuration.
//!
//! All fields have serde defaults, so a partial JSON object (or none at all)
//! yields a usable configuration. CLI flags override individual fields through
//! the `with_*` builders.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration of the dashboard engine and its runtime glue.
///
/// # Example
///
/// ```
/// use blockday::config::DashboardConfig;
///
/// let config = DashboardConfig::default().with_autosave_seconds(30);
/// assert_eq!(config.autosave_seconds, 30);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Path of the JSON state file.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Seconds between background saves.
    #[serde(default = "default_autosave_seconds")]
    pub autosave_seconds: u64,

    /// Milliseconds between ticks. One tick counts one second.
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,

    /// Seconds between a block completion and the next-block prompt.
    #[serde(default = "default_next_block_delay_seconds")]
    pub next_block_delay_seconds: u64,

    /// Starting block 1 before this local hour counts as an early start.
    #[serde(default = "default_early_bird_hour")]
    pub early_bird_hour: u32,
}

fn default_autosave_seconds() -> u64 {
    10
}

fn default_tick_millis() -> u64 {
    1000
}

fn default_next_block_delay_seconds() -> u64 {
    3
}

fn default_early_bird_hour() -> u32 {
    7
}

/// Default location of the state file: `<data dir>/blockday/state.json`.
///
/// Falls back to the working directory when the platform has no data dir.
pub fn default_data_file() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("blockday")
        .join("state.json")
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            autosave_seconds: default_autosave_seconds(),
            tick_millis: default_tick_millis(),
            next_block_delay_seconds: default_next_block_delay_seconds(),
            early_bird_hour: default_early_bird_hour(),
        }
    }
}

impl DashboardConfig {
    /// Sets the state file path.
    pub fn with_data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_file = path.into();
        self
    }

    /// Sets the autosave period.
    pub fn with_autosave_seconds(mut self, seconds: u64) -> Self {
        self.autosave_seconds = seconds;
        self
    }

    /// Sets the tick period.
    pub fn with_tick_millis(mut self, millis: u64) -> Self {
        self.tick_millis = millis;
        self
    }

    /// Sets the delay before the next-block prompt.
    pub fn with_next_block_delay_seconds(mut self, seconds: u64) -> Self {
        self.next_block_delay_seconds = seconds;
        self
    }

    /// Sets the early-bird cutoff hour.
    pub fn with_early_bird_hour(mut self, hour: u32) -> Self {
        self.early_bird_hour = hour;
        self
    }

    pub fn autosave_period(&self) -> Duration {
        Duration::from_secs(self.autosave_seconds)
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }

    pub fn next_block_delay(&self) -> Duration {
        Duration::from_secs(self.next_block_delay_seconds)
    }

    /// Validates the configuration.
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.autosave_seconds < 1 || self.autosave_seconds > 3600 {
            return Err("El autoguardado debe estar entre 1 y 3600 segundos".to_string());
        }
        if self.tick_millis < 1 {
            return Err("El intervalo de tick debe ser de al menos 1 ms".to_string());
        }
        if self.early_bird_hour > 23 {
            return Err("La hora de madrugador debe estar entre 0 y 23".to_string());
        }
        Ok(())
    }
}
