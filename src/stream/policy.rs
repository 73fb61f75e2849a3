//! Rotation thresholds and rotated-file naming

use crate::core::clock::hour_stamp;
use crate::core::error::{LoggerError, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Size past which the stream file is split (2 GiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 2 * 1024 * 1024 * 1024;

/// Number of distinct split files kept per hour
pub const DEFAULT_MAX_GENERATIONS: u32 = 10;

/// Rotation configuration for a stream
///
/// # Examples
///
/// ```
/// use rust_stream_logger::RotationPolicy;
///
/// let policy = RotationPolicy::new()
///     .with_max_size(512 * 1024 * 1024)
///     .with_max_generations(5)
///     .with_backup_dir("/data/log/backup")
///     .with_compression(true);
///
/// assert_eq!(policy.max_generations, 5);
/// assert!(policy.archival_enabled());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationPolicy {
    /// A stream file larger than this is split within the hour
    pub max_file_size: u64,
    /// Split generations cycle through `0..max_generations`
    pub max_generations: u32,
    /// Root of the dated backup tree; `None` disables archival
    pub backup_dir: Option<PathBuf>,
    /// Gzip files as they are archived
    pub compress_archives: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_generations: DEFAULT_MAX_GENERATIONS,
            backup_dir: None,
            compress_archives: false,
        }
    }
}

impl RotationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_generations(mut self, count: u32) -> Self {
        self.max_generations = count;
        self
    }

    /// Set the backup root. An empty path disables archival.
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_backup_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.backup_dir = if dir.as_os_str().is_empty() { None } else { Some(dir) };
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn without_backup(mut self) -> Self {
        self.backup_dir = None;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress_archives = enabled;
        self
    }

    #[must_use]
    pub fn archival_enabled(&self) -> bool {
        self.backup_dir.is_some()
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_file_size == 0 {
            return Err(LoggerError::config(
                "RotationPolicy",
                "max_file_size must be greater than 0",
            ));
        }
        if self.max_generations == 0 {
            return Err(LoggerError::config(
                "RotationPolicy",
                "max_generations must be at least 1",
            ));
        }
        Ok(())
    }
}

/// `<path>.<suffix>`, keeping the full original file name
pub(crate) fn with_name_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// `<path>.<YYYYMMDDHH>`: the hour file left by an hour rotation at generation 0
pub fn hour_file_path(path: &Path, hour: &NaiveDateTime) -> PathBuf {
    with_name_suffix(path, &hour_stamp(hour))
}

/// `<path>.<YYYYMMDDHH>.<generation>`
pub fn generation_file_path(path: &Path, hour: &NaiveDateTime, generation: u32) -> PathBuf {
    with_name_suffix(path, &format!("{}.{}", hour_stamp(hour), generation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn hour() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let policy = RotationPolicy::default();
        assert_eq!(policy.max_file_size, 2 * 1024 * 1024 * 1024);
        assert_eq!(policy.max_generations, 10);
        assert!(!policy.archival_enabled());
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_empty_backup_dir_disables_archival() {
        let policy = RotationPolicy::new().with_backup_dir("");
        assert!(!policy.archival_enabled());

        let policy = RotationPolicy::new().with_backup_dir("/tmp/backup").without_backup();
        assert!(!policy.archival_enabled());
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        assert!(RotationPolicy::new().with_max_size(0).validate().is_err());
        assert!(RotationPolicy::new().with_max_generations(0).validate().is_err());
    }

    #[test]
    fn test_rotated_names() {
        let base = Path::new("/var/log/app-warn.log");
        assert_eq!(
            hour_file_path(base, &hour()),
            PathBuf::from("/var/log/app-warn.log.2024030510")
        );
        assert_eq!(
            generation_file_path(base, &hour(), 3),
            PathBuf::from("/var/log/app-warn.log.2024030510.3")
        );
    }
}
