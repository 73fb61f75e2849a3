//! Archival of rotated stream files into dated backup directories
//!
//! After an hour rotation, every file rotated during that hour
//! (`<path>.<hour>` and `<path>.<hour>.<n>`) is moved under
//! `<backup_dir>/<YYYY-MM-DD>/`, optionally gzip'd on the way.

use super::policy::{generation_file_path, hour_file_path};
use crate::core::clock::date_stamp;
use crate::core::error::{LoggerError, Result};
use chrono::NaiveDateTime;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// What to archive and where
#[derive(Debug, Clone)]
pub struct ArchiveJob {
    pub stream_path: PathBuf,
    pub backup_dir: PathBuf,
    /// The hour whose rotated files are moved
    pub hour: NaiveDateTime,
    pub max_generations: u32,
    pub compress: bool,
}

impl ArchiveJob {
    /// `<backup_dir>/<YYYY-MM-DD>` for this job's hour
    pub fn target_dir(&self) -> PathBuf {
        self.backup_dir.join(date_stamp(&self.hour))
    }

    /// Move every rotated file for the hour. Returns how many were archived.
    ///
    /// Individual file failures are reported and skipped; only failing to
    /// create the dated directory aborts the job.
    pub fn run(&self) -> Result<usize> {
        let target_dir = self.target_dir();
        fs::create_dir_all(&target_dir).map_err(|e| {
            LoggerError::io_operation(
                "create backup directory",
                format!("Failed to create directory '{}'", target_dir.display()),
                e,
            )
        })?;

        let candidates = std::iter::once(hour_file_path(&self.stream_path, &self.hour)).chain(
            (0..self.max_generations)
                .map(|generation| generation_file_path(&self.stream_path, &self.hour, generation)),
        );

        let mut archived = 0;
        let mut failures = 0;
        for source in candidates {
            if !source.exists() {
                continue;
            }
            match self.archive_file(&source, &target_dir) {
                Ok(()) => archived += 1,
                Err(e) => {
                    eprintln!("[LOGGER ERROR] archive: {}", e);
                    failures += 1;
                }
            }
        }

        if failures > 0 {
            return Err(LoggerError::archive(
                self.stream_path.display().to_string(),
                format!("{} of {} files could not be archived", failures, archived + failures),
            ));
        }
        Ok(archived)
    }

    fn archive_file(&self, source: &Path, target_dir: &Path) -> Result<()> {
        let file_name = source.file_name().ok_or_else(|| {
            LoggerError::archive(source.display().to_string(), "Rotated path has no file name")
        })?;
        let destination = target_dir.join(file_name);

        if self.compress {
            return compress_into(source, &destination);
        }

        // A previous run for the same hour may have left a file here
        if destination.exists() {
            let _ = fs::remove_file(&destination);
        }
        fs::rename(source, &destination).map_err(|e| {
            LoggerError::archive(
                source.display().to_string(),
                format!("Failed to move to '{}': {}", destination.display(), e),
            )
        })
    }
}

/// Gzip `source` into `<destination>.gz`, removing `source` only after the
/// compressed file is fully in place.
fn compress_into(source: &Path, destination: &Path) -> Result<()> {
    let mut gz_name = destination.as_os_str().to_os_string();
    gz_name.push(".gz");
    let gz_path = PathBuf::from(gz_name);
    let mut tmp_name = gz_path.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let temp_gz_path = PathBuf::from(tmp_name);

    let input = File::open(source).map_err(|e| {
        LoggerError::io_operation(
            "compress rotated file",
            format!("Failed to open file for compression: {}", source.display()),
            e,
        )
    })?;
    let mut reader = BufReader::with_capacity(64 * 1024, input);

    let output = File::create(&temp_gz_path).map_err(|e| {
        LoggerError::io_operation(
            "compress rotated file",
            format!("Failed to create temporary compressed file: {}", temp_gz_path.display()),
            e,
        )
    })?;
    let mut encoder = flate2::write::GzEncoder::new(
        BufWriter::with_capacity(64 * 1024, output),
        flate2::Compression::default(),
    );

    let mut buffer = vec![0u8; 64 * 1024];
    loop {
        let bytes_read = reader.read(&mut buffer).map_err(|e| {
            let _ = fs::remove_file(&temp_gz_path);
            LoggerError::io_operation(
                "compress rotated file",
                format!("Failed to read from file: {}", source.display()),
                e,
            )
        })?;
        if bytes_read == 0 {
            break;
        }
        encoder.write_all(&buffer[..bytes_read]).map_err(|e| {
            let _ = fs::remove_file(&temp_gz_path);
            LoggerError::io_operation("compress rotated file", "Failed to compress data chunk", e)
        })?;
    }

    let mut writer = encoder.finish().map_err(|e| {
        let _ = fs::remove_file(&temp_gz_path);
        LoggerError::io_operation("compress rotated file", "Failed to finish compression", e)
    })?;
    writer.flush().map_err(|e| {
        let _ = fs::remove_file(&temp_gz_path);
        LoggerError::io_operation("compress rotated file", "Failed to flush compressed file", e)
    })?;
    drop(writer);

    fs::rename(&temp_gz_path, &gz_path).map_err(|e| {
        let _ = fs::remove_file(&temp_gz_path);
        LoggerError::io_operation(
            "compress rotated file",
            format!("Failed to rename compressed file to: {}", gz_path.display()),
            e,
        )
    })?;

    if let Err(e) = fs::remove_file(source) {
        eprintln!(
            "[LOGGER WARNING] Compressed '{}' but failed to remove it: {}",
            source.display(),
            e
        );
    }
    Ok(())
}
