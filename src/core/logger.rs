//! Level router: the application-facing logger
//!
//! A [`Logger`] owns one [`Stream`] per standard level plus any custom
//! streams created on first use. Level writes pass the severity threshold;
//! custom writes bypass it.

use super::{
    clock::{Clock, SystemClock},
    config::LoggerConfig,
    error::{LoggerError, Result},
    formatter::format_record_at,
    log_level::LogLevel,
    log_value::LogValue,
    metrics::StreamMetrics,
};
use crate::stream::policy::RotationPolicy;
use crate::stream::task::{Stream, StreamOptions, DEFAULT_PROMOTE_INTERVAL, DEFAULT_QUEUE_CAPACITY};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Where a record was logged from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub file: &'static str,
    pub line: u32,
    pub routine: &'static str,
}

impl CallSite {
    pub const fn new(file: &'static str, line: u32, routine: &'static str) -> Self {
        Self { file, line, routine }
    }

    /// The site of a `#[track_caller]` call; the routine is unknown
    pub fn from_location(location: &'static Location<'static>) -> Self {
        Self::new(location.file(), location.line(), "")
    }
}

impl fmt::Display for CallSite {
    /// `<file from "src/">,<line>:<routine>`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = self
            .file
            .find("src/")
            .map_or(self.file, |start| &self.file[start..]);
        write!(f, "{},{}:{}", file, self.line, self.routine)
    }
}

struct Registry {
    /// Index into [`LogLevel::ALL`]; 0 enables everything, 4 nothing
    threshold: usize,
    custom: HashMap<String, Arc<Stream>>,
    closed: bool,
}

impl Registry {
    fn is_enabled(&self, name: &str) -> bool {
        if self.threshold == 0 {
            return true;
        }
        LogLevel::ALL[self.threshold..]
            .iter()
            .any(|level| level.as_str() == name)
    }
}

pub struct Logger {
    suffix: String,
    /// Indexed by [`LogLevel::index`]
    levels: Vec<Arc<Stream>>,
    registry: RwLock<Registry>,
    call_sites: [bool; LogLevel::COUNT],
    custom_options: StreamOptions,
    clock: Arc<dyn Clock>,
}

impl Logger {
    /// Create a logger with default rotation settings.
    ///
    /// Level streams are written to `<filename>-<level>.log`; rotated files
    /// are archived under `backup_dir` (an empty path disables archival).
    ///
    /// # Errors
    ///
    /// Returns error if any level stream cannot be opened
    pub fn new(
        filename: impl Into<PathBuf>,
        suffix: impl Into<String>,
        backup_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        LoggerBuilder::new(filename)
            .suffix(suffix)
            .backup_dir(backup_dir)
            .build()
    }

    /// Create a builder for Logger
    ///
    /// # Example
    /// ```no_run
    /// use rust_stream_logger::prelude::*;
    ///
    /// let logger = Logger::builder("/data/servers/log/saver")
    ///     .suffix("10.0.0.7")
    ///     .backup_dir("/data/servers/log/backup")
    ///     .min_level(LogLevel::Warn)
    ///     .build()
    ///     .unwrap();
    /// ```
    #[must_use]
    pub fn builder(filename: impl Into<PathBuf>) -> LoggerBuilder {
        LoggerBuilder::new(filename)
    }

    /// File path of a standard level's stream
    pub fn level_path(base: &Path, level: LogLevel) -> PathBuf {
        let mut name = base.as_os_str().to_os_string();
        name.push(format!("-{}.log", level));
        PathBuf::from(name)
    }

    pub fn path(&self, level: LogLevel) -> &Path {
        self.levels[level.index()].path()
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Set the threshold index. Values past the last level disable all of them.
    pub fn set_level(&self, threshold: usize) {
        self.registry.write().threshold = threshold.min(LogLevel::COUNT);
    }

    pub fn set_min_level(&self, level: LogLevel) {
        self.set_level(level.index());
    }

    /// Current threshold index
    pub fn level(&self) -> usize {
        self.registry.read().threshold
    }

    /// Whether a level name passes the threshold.
    ///
    /// With a threshold of 0 every name is enabled, including unknown ones.
    pub fn is_enabled(&self, level: &str) -> bool {
        self.registry.read().is_enabled(level)
    }

    /// Log at `level` with an explicit call site.
    ///
    /// The site is prepended as the first field only for levels configured
    /// to capture it.
    pub fn log_at(&self, level: LogLevel, site: CallSite, values: &[LogValue]) {
        let stream = {
            let registry = self.registry.read();
            if registry.closed || !registry.is_enabled(level.as_str()) {
                return;
            }
            Arc::clone(&self.levels[level.index()])
        };

        let now = self.clock.now();
        let record = if self.call_sites[level.index()] {
            let mut fields = Vec::with_capacity(values.len() + 1);
            fields.push(LogValue::Other(site.to_string()));
            fields.extend_from_slice(values);
            format_record_at(&now, true, &self.suffix, &fields)
        } else {
            format_record_at(&now, true, &self.suffix, values)
        };
        stream.write(&record);
    }

    #[track_caller]
    pub fn log(&self, level: LogLevel, values: &[LogValue]) {
        self.log_at(level, CallSite::from_location(Location::caller()), values);
    }

    #[inline]
    #[track_caller]
    pub fn debug(&self, values: &[LogValue]) {
        self.log(LogLevel::Debug, values);
    }

    #[inline]
    #[track_caller]
    pub fn trace(&self, values: &[LogValue]) {
        self.log(LogLevel::Trace, values);
    }

    #[inline]
    #[track_caller]
    pub fn warn(&self, values: &[LogValue]) {
        self.log(LogLevel::Warn, values);
    }

    #[inline]
    #[track_caller]
    pub fn error(&self, values: &[LogValue]) {
        self.log(LogLevel::Error, values);
    }

    /// Write to a custom stream whose file path is `name`.
    ///
    /// The stream is created on first use and is not subject to the
    /// severity threshold. If it cannot be created the record is dropped
    /// and the failure reported to stderr.
    pub fn write(&self, name: &str, append_suffix: bool, values: &[LogValue]) {
        let Some(stream) = self.custom_stream(name) else {
            return;
        };
        let record = format_record_at(&self.clock.now(), append_suffix, &self.suffix, values);
        stream.write(&record);
    }

    fn custom_stream(&self, name: &str) -> Option<Arc<Stream>> {
        {
            let registry = self.registry.read();
            if registry.closed {
                return None;
            }
            if let Some(stream) = registry.custom.get(name) {
                return Some(Arc::clone(stream));
            }
        }

        let mut registry = self.registry.write();
        if registry.closed {
            return None;
        }
        if let Some(stream) = registry.custom.get(name) {
            return Some(Arc::clone(stream));
        }
        match Stream::open(name, name, self.custom_options.clone()) {
            Ok(stream) => {
                let stream = Arc::new(stream);
                registry.custom.insert(name.to_string(), Arc::clone(&stream));
                Some(stream)
            }
            Err(e) => {
                eprintln!("[LOGGER ERROR] Failed to open custom stream '{}': {}", name, e);
                None
            }
        }
    }

    /// Metrics for a level name or a custom stream name
    pub fn metrics(&self, name: &str) -> Option<Arc<StreamMetrics>> {
        if let Ok(level) = name.parse::<LogLevel>() {
            if level.as_str() == name {
                return Some(Arc::clone(self.levels[level.index()].metrics()));
            }
        }
        self.registry
            .read()
            .custom
            .get(name)
            .map(|stream| Arc::clone(stream.metrics()))
    }

    pub fn is_closed(&self) -> bool {
        self.registry.read().closed
    }

    /// Flush everything buffered or queued to disk and stop every stream.
    ///
    /// Blocks until all streams (and their pending archival) have finished.
    /// Later writes are ignored. Records written concurrently with `close`
    /// may be lost.
    pub fn close(&self) {
        let custom: Vec<Arc<Stream>> = {
            let mut registry = self.registry.write();
            if registry.closed {
                return;
            }
            registry.closed = true;
            registry.custom.values().cloned().collect()
        };

        for stream in self.levels.iter().chain(custom.iter()) {
            stream.close();
        }
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.close();
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```no_run
/// use rust_stream_logger::prelude::*;
/// use std::time::Duration;
///
/// let logger = Logger::builder("log/app")
///     .suffix("node-1")
///     .backup_dir("log/backup")
///     .max_file_size(256 * 1024 * 1024)
///     .promote_interval(Duration::from_millis(500))
///     .capture_call_site(LogLevel::Error, true)
///     .build()
///     .unwrap();
/// ```
pub struct LoggerBuilder {
    base_filename: PathBuf,
    suffix: String,
    policy: RotationPolicy,
    queue_capacity: usize,
    promote_interval: Duration,
    threshold: usize,
    call_sites: [bool; LogLevel::COUNT],
    clock: Arc<dyn Clock>,
}

impl LoggerBuilder {
    pub fn new(base_filename: impl Into<PathBuf>) -> Self {
        Self {
            base_filename: base_filename.into(),
            suffix: String::new(),
            policy: RotationPolicy::default(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            promote_interval: DEFAULT_PROMOTE_INTERVAL,
            threshold: 0,
            call_sites: [true, true, false, false],
            clock: Arc::new(SystemClock),
        }
    }

    pub fn from_config(config: LoggerConfig) -> Self {
        let promote_interval = config.promote_interval();
        let mut policy = config.rotation;
        if let Some(dir) = policy.backup_dir.take() {
            policy = policy.with_backup_dir(dir);
        }

        let mut builder = Self::new(config.base_filename)
            .suffix(config.suffix)
            .rotation_policy(policy)
            .queue_capacity(config.queue_capacity)
            .promote_interval(promote_interval)
            .level(config.min_level);
        builder.call_sites = [false; LogLevel::COUNT];
        for level in config.call_site_levels {
            builder.call_sites[level.index()] = true;
        }
        builder
    }

    /// Trailing field appended to every level record
    #[must_use = "builder methods return a new value"]
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Root of the dated backup tree; an empty path disables archival
    #[must_use = "builder methods return a new value"]
    pub fn backup_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.policy = self.policy.with_backup_dir(dir);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn rotation_policy(mut self, policy: RotationPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn max_file_size(mut self, size: u64) -> Self {
        self.policy = self.policy.with_max_size(size);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn max_generations(mut self, count: u32) -> Self {
        self.policy = self.policy.with_max_generations(count);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn compress_archives(mut self, enabled: bool) -> Self {
        self.policy = self.policy.with_compression(enabled);
        self
    }

    /// Capacity of each stream's handoff queue, in batches
    #[must_use = "builder methods return a new value"]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn promote_interval(mut self, interval: Duration) -> Self {
        self.promote_interval = interval;
        self
    }

    /// Initial threshold index
    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, threshold: usize) -> Self {
        self.threshold = threshold.min(LogLevel::COUNT);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn min_level(self, level: LogLevel) -> Self {
        self.level(level.index())
    }

    /// Whether records at `level` start with the calling site.
    ///
    /// Enabled for debug and trace by default.
    #[must_use = "builder methods return a new value"]
    pub fn capture_call_site(mut self, level: LogLevel, enabled: bool) -> Self {
        self.call_sites[level.index()] = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Open every level stream and start its background tasks.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or a stream file
    /// cannot be opened
    pub fn build(self) -> Result<Logger> {
        if self.base_filename.as_os_str().is_empty() {
            return Err(LoggerError::config("LoggerBuilder", "base filename must not be empty"));
        }
        if self.queue_capacity == 0 {
            return Err(LoggerError::config("LoggerBuilder", "queue_capacity must be at least 1"));
        }
        if self.promote_interval.is_zero() {
            return Err(LoggerError::config(
                "LoggerBuilder",
                "promote_interval must be greater than 0",
            ));
        }
        self.policy.validate()?;

        let options = StreamOptions {
            policy: self.policy.clone(),
            queue_capacity: self.queue_capacity,
            promote_interval: self.promote_interval,
            clock: Arc::clone(&self.clock),
        };
        let levels = LogLevel::ALL
            .iter()
            .map(|level| {
                Stream::open(
                    level.as_str(),
                    Logger::level_path(&self.base_filename, *level),
                    options.clone(),
                )
                .map(Arc::new)
            })
            .collect::<Result<Vec<_>>>()?;

        // Custom streams are not archived
        let custom_options = StreamOptions {
            policy: self.policy.without_backup(),
            ..options
        };

        Ok(Logger {
            suffix: self.suffix,
            levels,
            registry: RwLock::new(Registry {
                threshold: self.threshold,
                custom: HashMap::new(),
                closed: false,
            }),
            call_sites: self.call_sites,
            custom_options,
            clock: self.clock,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn logger(dir: &Path) -> Logger {
        Logger::builder(dir.join("app"))
            .promote_interval(Duration::from_secs(60))
            .build()
            .unwrap()
    }

    #[test]
    fn test_level_paths() {
        assert_eq!(
            Logger::level_path(Path::new("/var/log/saver"), LogLevel::Warn),
            PathBuf::from("/var/log/saver-warn.log")
        );
    }

    #[test]
    fn test_build_creates_level_files() {
        let dir = tempdir().unwrap();
        let logger = logger(dir.path());
        for level in LogLevel::ALL {
            assert!(logger.path(level).exists());
        }
        logger.close();
    }

    #[test]
    fn test_threshold_enables_levels_at_or_above() {
        let dir = tempdir().unwrap();
        let logger = logger(dir.path());

        logger.set_min_level(LogLevel::Warn);
        assert!(logger.is_enabled("warn"));
        assert!(logger.is_enabled("error"));
        assert!(!logger.is_enabled("debug"));
        assert!(!logger.is_enabled("trace"));

        logger.set_level(0);
        for level in LogLevel::ALL {
            assert!(logger.is_enabled(level.as_str()));
        }

        logger.set_level(99);
        assert_eq!(logger.level(), LogLevel::COUNT);
        assert!(!logger.is_enabled("error"));
    }

    #[test]
    fn test_call_site_display() {
        let site = CallSite::new("/home/dev/project/src/server/main.rs", 42, "server::main");
        assert_eq!(site.to_string(), "src/server/main.rs,42:server::main");

        let site = CallSite::new("build.rs", 7, "");
        assert_eq!(site.to_string(), "build.rs,7:");
    }

    #[test]
    fn test_build_rejects_empty_base() {
        assert!(Logger::builder("").build().is_err());
    }

    #[test]
    fn test_build_rejects_zero_interval() {
        let dir = tempdir().unwrap();
        let result = Logger::builder(dir.path().join("app"))
            .promote_interval(Duration::ZERO)
            .build();
        assert!(matches!(result, Err(LoggerError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_from_config_call_sites() {
        let dir = tempdir().unwrap();
        let config = LoggerConfig {
            base_filename: dir.path().join("cfg"),
            call_site_levels: vec![LogLevel::Error],
            ..LoggerConfig::default()
        };
        let builder = LoggerBuilder::from_config(config);
        assert_eq!(builder.call_sites, [false, false, false, true]);
    }
}
