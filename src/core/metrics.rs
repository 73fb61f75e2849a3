//! Per-stream metrics for observability
//!
//! Every failure on the background write path is fail-open: it is reported
//! to stderr and counted here, never returned to the application.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one stream
///
/// # Example
///
/// ```
/// use rust_stream_logger::StreamMetrics;
///
/// let metrics = StreamMetrics::new();
/// metrics.record_written(128);
/// metrics.record_dropped();
///
/// assert_eq!(metrics.batches_written(), 1);
/// assert_eq!(metrics.bytes_written(), 128);
/// assert_eq!(metrics.batches_dropped(), 1);
/// ```
#[derive(Debug, Default)]
pub struct StreamMetrics {
    /// Batches moved from the swap buffer into the handoff queue
    batches_promoted: AtomicU64,

    /// Batches written and synced to disk
    batches_written: AtomicU64,

    bytes_written: AtomicU64,

    /// Writes that failed once and were retried
    write_retries: AtomicU64,

    /// Batches lost after a failed retry or a skipped recovery cycle
    batches_dropped: AtomicU64,

    size_rotations: AtomicU64,

    hour_rotations: AtomicU64,

    /// Times the stream file was found missing and recreated
    recoveries: AtomicU64,

    archives_started: AtomicU64,

    archive_failures: AtomicU64,
}

impl StreamMetrics {
    pub const fn new() -> Self {
        Self {
            batches_promoted: AtomicU64::new(0),
            batches_written: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            write_retries: AtomicU64::new(0),
            batches_dropped: AtomicU64::new(0),
            size_rotations: AtomicU64::new(0),
            hour_rotations: AtomicU64::new(0),
            recoveries: AtomicU64::new(0),
            archives_started: AtomicU64::new(0),
            archive_failures: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn batches_promoted(&self) -> u64 {
        self.batches_promoted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn batches_written(&self) -> u64 {
        self.batches_written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn write_retries(&self) -> u64 {
        self.write_retries.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn batches_dropped(&self) -> u64 {
        self.batches_dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn size_rotations(&self) -> u64 {
        self.size_rotations.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn hour_rotations(&self) -> u64 {
        self.hour_rotations.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn recoveries(&self) -> u64 {
        self.recoveries.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn archives_started(&self) -> u64 {
        self.archives_started.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn archive_failures(&self) -> u64 {
        self.archive_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_promoted(&self) -> u64 {
        self.batches_promoted.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a batch written to disk
    #[inline]
    pub fn record_written(&self, bytes: usize) -> u64 {
        self.bytes_written.fetch_add(bytes as u64, Ordering::Relaxed);
        self.batches_written.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_retry(&self) -> u64 {
        self.write_retries.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.batches_dropped.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_size_rotation(&self) -> u64 {
        self.size_rotations.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_hour_rotation(&self) -> u64 {
        self.hour_rotations.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_recovery(&self) -> u64 {
        self.recoveries.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_archive_started(&self) -> u64 {
        self.archives_started.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_archive_failure(&self) -> u64 {
        self.archive_failures.fetch_add(1, Ordering::Relaxed)
    }

    /// Share of processed batches that were dropped, as a percentage
    ///
    /// Returns 0.0 if nothing has been processed.
    pub fn drop_rate(&self) -> f64 {
        let dropped = self.batches_dropped();
        let total = self.batches_written() + dropped;
        if total == 0 {
            0.0
        } else {
            (dropped as f64 / total as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let metrics = StreamMetrics::new();
        assert_eq!(metrics.batches_promoted(), 0);
        assert_eq!(metrics.batches_written(), 0);
        assert_eq!(metrics.size_rotations(), 0);
        assert_eq!(metrics.hour_rotations(), 0);
        assert_eq!(metrics.drop_rate(), 0.0);
    }

    #[test]
    fn test_drop_rate() {
        let metrics = StreamMetrics::new();
        for _ in 0..9 {
            metrics.record_written(10);
        }
        metrics.record_dropped();

        assert_eq!(metrics.bytes_written(), 90);
        let rate = metrics.drop_rate();
        assert!((9.9..=10.1).contains(&rate), "Drop rate was {}", rate);
    }
}
