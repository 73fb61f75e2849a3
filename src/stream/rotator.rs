//! The per-stream rotation engine
//!
//! [`StreamRotator`] is the single writer of a stream file. Each drained
//! batch goes through one cycle:
//!
//! 1. If the current hour is past the watermark, rotate for the hour
//!    boundary (size is not checked in that cycle).
//! 2. Otherwise probe the file size. A missing file is recreated and the
//!    cycle's batch is skipped; other probe errors skip rotation only.
//!    A file larger than `max_file_size` is split.
//! 3. Write the batch, retrying once, then sync.
//!
//! Nothing here returns an error to the caller: failures go to stderr and
//! to [`StreamMetrics`].

use super::archive::ArchiveJob;
use super::policy::{generation_file_path, hour_file_path, RotationPolicy};
use crate::core::clock::{truncate_to_hour, Clock};
use crate::core::error::{LoggerError, Result};
use crate::core::metrics::StreamMetrics;
use chrono::NaiveDateTime;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// What a flush cycle did before writing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDecision {
    /// No rotation; the batch was written to the current file
    Write,
    /// The file exceeded the size limit and was split within the hour
    Split,
    /// The hour watermark was crossed; the file was rotated and archival fired
    HourBoundary,
    /// The file had gone missing and was recreated; the batch was skipped
    Recovered,
}

pub struct StreamRotator {
    path: PathBuf,
    file: Option<File>,
    /// Start of the hour currently being written
    hour: NaiveDateTime,
    /// Splits since the watermark last advanced; the next slot is this
    /// modulo `max_generations`
    splits_this_hour: u64,
    policy: RotationPolicy,
    clock: Arc<dyn Clock>,
    metrics: Arc<StreamMetrics>,
    archivers: Vec<JoinHandle<()>>,
}

impl StreamRotator {
    /// Open (or create) the stream file and set the watermark to the current hour.
    ///
    /// # Errors
    ///
    /// Returns error if the policy is invalid or the file cannot be opened
    pub fn open(
        path: impl Into<PathBuf>,
        policy: RotationPolicy,
        clock: Arc<dyn Clock>,
        metrics: Arc<StreamMetrics>,
    ) -> Result<Self> {
        policy.validate()?;
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let file = open_append(&path).map_err(|e| {
            LoggerError::io_operation(
                "open stream file",
                format!("Failed to open '{}'", path.display()),
                e,
            )
        })?;
        let hour = truncate_to_hour(&clock.now());

        Ok(Self {
            path,
            file: Some(file),
            hour,
            splits_this_hour: 0,
            policy,
            clock,
            metrics,
            archivers: Vec::new(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The hour watermark
    #[must_use]
    pub fn hour(&self) -> NaiveDateTime {
        self.hour
    }

    /// Next split slot, always in `0..max_generations`
    #[must_use]
    pub fn generation(&self) -> u32 {
        // Below max_generations, so it fits in u32
        (self.splits_this_hour % u64::from(self.policy.max_generations)) as u32
    }

    /// Size splits since the last hour rotation
    #[must_use]
    pub fn splits_this_hour(&self) -> u64 {
        self.splits_this_hour
    }

    #[must_use]
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    #[must_use]
    pub fn metrics(&self) -> &Arc<StreamMetrics> {
        &self.metrics
    }

    /// Run one flush cycle for `batch`.
    pub fn process_batch(&mut self, batch: &[u8]) -> RotationDecision {
        let decision = self.check_rotation();
        match decision {
            RotationDecision::Write => {}
            RotationDecision::Split => self.split(),
            RotationDecision::HourBoundary => self.rotate_hour(),
            RotationDecision::Recovered => {
                eprintln!(
                    "[LOGGER WARNING] Skipped {} bytes for '{}' while recreating the file",
                    batch.len(),
                    self.path.display()
                );
                self.metrics.record_dropped();
                return decision;
            }
        }

        self.write_batch(batch);
        decision
    }

    /// Join every archival run started so far.
    pub fn wait_for_archives(&mut self) {
        for handle in self.archivers.drain(..) {
            if handle.join().is_err() {
                eprintln!("[LOGGER ERROR] Archive thread panicked");
            }
        }
    }

    /// Close the file after waiting for pending archival.
    pub fn finish(mut self) {
        self.wait_for_archives();
        drop(self.file.take());
    }

    fn check_rotation(&mut self) -> RotationDecision {
        if truncate_to_hour(&self.clock.now()) > self.hour {
            return RotationDecision::HourBoundary;
        }

        match fs::metadata(&self.path) {
            Ok(meta) if meta.len() > self.policy.max_file_size => RotationDecision::Split,
            Ok(_) => RotationDecision::Write,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                eprintln!("[LOGGER ERROR] probe '{}': {}", self.path.display(), e);
                self.metrics.record_recovery();
                drop(self.file.take());
                match open_append(&self.path) {
                    Ok(file) => self.file = Some(file),
                    Err(e) => {
                        eprintln!("[LOGGER ERROR] recreate '{}': {}", self.path.display(), e)
                    }
                }
                RotationDecision::Recovered
            }
            Err(e) => {
                eprintln!("[LOGGER ERROR] probe '{}': {}", self.path.display(), e);
                RotationDecision::Write
            }
        }
    }

    fn split(&mut self) {
        let target = generation_file_path(&self.path, &self.hour, self.generation());
        self.rotate_current_file(&target);
        self.splits_this_hour += 1;
        self.metrics.record_size_rotation();
    }

    fn rotate_hour(&mut self) {
        // The bare hour name only when the hour saw no split
        let target = if self.splits_this_hour == 0 {
            hour_file_path(&self.path, &self.hour)
        } else {
            generation_file_path(&self.path, &self.hour, self.generation())
        };
        self.rotate_current_file(&target);
        self.splits_this_hour = 0;
        self.metrics.record_hour_rotation();

        let finished_hour = self.hour;
        self.spawn_archive(finished_hour);
        self.hour = truncate_to_hour(&self.clock.now()).max(finished_hour);
    }

    /// Close, move the current file to `target`, and reopen a fresh one.
    fn rotate_current_file(&mut self, target: &Path) {
        drop(self.file.take());

        if target.exists() {
            if let Err(e) = fs::remove_file(target) {
                eprintln!("[LOGGER ERROR] remove '{}': {}", target.display(), e);
            }
        }
        if let Err(e) = fs::rename(&self.path, target) {
            eprintln!(
                "[LOGGER ERROR] rename '{}' -> '{}': {}",
                self.path.display(),
                target.display(),
                e
            );
        }

        match open_append(&self.path) {
            Ok(file) => self.file = Some(file),
            Err(e) => eprintln!("[LOGGER ERROR] reopen '{}': {}", self.path.display(), e),
        }
    }

    fn spawn_archive(&mut self, hour: NaiveDateTime) {
        let Some(backup_dir) = self.policy.backup_dir.clone() else {
            return;
        };

        let job = ArchiveJob {
            stream_path: self.path.clone(),
            backup_dir,
            hour,
            max_generations: self.policy.max_generations,
            compress: self.policy.compress_archives,
        };
        let metrics = Arc::clone(&self.metrics);
        metrics.record_archive_started();

        self.archivers.retain(|handle| !handle.is_finished());
        let spawned = thread::Builder::new()
            .name("stream-archive".to_string())
            .spawn(move || {
                if let Err(e) = job.run() {
                    eprintln!("[LOGGER ERROR] archive: {}", e);
                    metrics.record_archive_failure();
                }
            });

        match spawned {
            Ok(handle) => self.archivers.push(handle),
            Err(e) => {
                eprintln!("[LOGGER ERROR] Failed to start archive thread: {}", e);
                self.metrics.record_archive_failure();
            }
        }
    }

    /// Write, retry once on failure, then drop the batch.
    fn write_batch(&mut self, batch: &[u8]) {
        let first = match self.write_once(batch) {
            Ok(()) => return self.sync(batch.len()),
            Err(e) => e,
        };
        eprintln!("[LOGGER ERROR] write '{}': {}", self.path.display(), first);
        self.metrics.record_retry();

        match self.write_once(batch) {
            Ok(()) => self.sync(batch.len()),
            Err(e) => {
                eprintln!(
                    "[LOGGER ERROR] write retry '{}': {}. Dropped {} bytes",
                    self.path.display(),
                    e,
                    batch.len()
                );
                self.metrics.record_dropped();
            }
        }
    }

    fn write_once(&mut self, batch: &[u8]) -> io::Result<()> {
        if self.file.is_none() {
            self.file = Some(open_append(&self.path)?);
        }
        match self.file.as_mut() {
            Some(file) => file.write_all(batch),
            None => Err(io::Error::other("stream file is not open")),
        }
    }

    fn sync(&mut self, written: usize) {
        self.metrics.record_written(written);
        if let Some(file) = self.file.as_mut() {
            if let Err(e) = file.sync_all() {
                eprintln!("[LOGGER ERROR] sync '{}': {}", self.path.display(), e);
            }
        }
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
