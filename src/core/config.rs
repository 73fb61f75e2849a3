//! File-based logger configuration
//!
//! A JSON mirror of [`LoggerBuilder`](super::logger::LoggerBuilder). Every
//! field is optional except `base_filename`.
//!
//! ```
//! use rust_stream_logger::LoggerConfig;
//!
//! let config = LoggerConfig::from_json_str(r#"{
//!     "base_filename": "/data/servers/log/saver",
//!     "suffix": "10.0.0.7",
//!     "rotation": { "backup_dir": "/data/servers/log/backup", "max_generations": 5 },
//!     "min_level": 2
//! }"#).unwrap();
//!
//! assert_eq!(config.rotation.max_generations, 5);
//! assert_eq!(config.queue_capacity, 50_000);
//! ```

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use crate::stream::policy::RotationPolicy;
use crate::stream::task::{DEFAULT_PROMOTE_INTERVAL, DEFAULT_QUEUE_CAPACITY};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Level streams are written to `<base_filename>-<level>.log`
    pub base_filename: PathBuf,
    /// Trailing field appended to level records
    pub suffix: String,
    pub rotation: RotationPolicy,
    pub queue_capacity: usize,
    pub promote_interval_ms: u64,
    /// Threshold index into `[debug, trace, warn, error]`; 0 records everything
    pub min_level: usize,
    /// Levels whose records start with the calling site
    pub call_site_levels: Vec<LogLevel>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            base_filename: PathBuf::new(),
            suffix: String::new(),
            rotation: RotationPolicy::default(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            promote_interval_ms: DEFAULT_PROMOTE_INTERVAL.as_millis() as u64,
            min_level: 0,
            call_site_levels: vec![LogLevel::Debug, LogLevel::Trace],
        }
    }
}

impl LoggerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation(
                "read logger config",
                format!("Failed to read '{}'", path.display()),
                e,
            )
        })?;
        Self::from_json_str(&json)
    }

    pub fn promote_interval(&self) -> Duration {
        Duration::from_millis(self.promote_interval_ms)
    }
}
