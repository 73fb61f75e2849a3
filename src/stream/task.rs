//! A running stream: swap buffer plus its promotion and flush threads

use super::rotator::StreamRotator;
use crate::core::clock::Clock;
use crate::core::error::{LoggerError, Result};
use crate::core::metrics::StreamMetrics;
use crate::core::swap_buffer::SwapBuffer;
use crate::stream::policy::RotationPolicy;
use crossbeam_channel::{bounded, select, tick, Receiver, Sender};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Handoff queue capacity, in batches
pub const DEFAULT_QUEUE_CAPACITY: usize = 50_000;

/// How often the swap buffer is promoted to the handoff queue
pub const DEFAULT_PROMOTE_INTERVAL: Duration = Duration::from_secs(1);

/// Settings for starting a [`Stream`]
#[derive(Clone)]
pub struct StreamOptions {
    pub policy: RotationPolicy,
    pub queue_capacity: usize,
    pub promote_interval: Duration,
    pub clock: Arc<dyn Clock>,
}

/// One independently rotated log destination.
///
/// Callers append through [`Stream::write`]; a promotion thread moves the
/// buffer into a bounded queue every `promote_interval`, and a flush thread
/// owns the file and runs every queued batch through the rotator.
pub struct Stream {
    name: String,
    path: PathBuf,
    buffer: Arc<SwapBuffer>,
    metrics: Arc<StreamMetrics>,
    closed: AtomicBool,
    shutdown: Mutex<Option<Sender<()>>>,
    promoter: Mutex<Option<JoinHandle<()>>>,
    flusher: Mutex<Option<JoinHandle<()>>>,
}

impl Stream {
    /// Open the stream file and start both background threads.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be opened, the options are invalid,
    /// or a thread cannot be spawned
    pub fn open(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        options: StreamOptions,
    ) -> Result<Self> {
        let name = name.into();
        let path = path.into();
        if options.queue_capacity == 0 {
            return Err(LoggerError::config("Stream", "queue_capacity must be at least 1"));
        }
        if options.promote_interval.is_zero() {
            return Err(LoggerError::config("Stream", "promote_interval must be greater than 0"));
        }

        let metrics = Arc::new(StreamMetrics::new());
        let rotator = StreamRotator::open(
            path.clone(),
            options.policy,
            options.clock,
            Arc::clone(&metrics),
        )?;

        let buffer = Arc::new(SwapBuffer::new());
        let (queue_tx, queue_rx) = bounded::<Vec<u8>>(options.queue_capacity);
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);

        let flusher = thread::Builder::new()
            .name(format!("{}-flush", name))
            .spawn(move || flush_loop(rotator, queue_rx))
            .map_err(|e| LoggerError::io_operation("spawn flush thread", name.clone(), e))?;

        let promoter = {
            let buffer = Arc::clone(&buffer);
            let metrics = Arc::clone(&metrics);
            let interval = options.promote_interval;
            thread::Builder::new()
                .name(format!("{}-promote", name))
                .spawn(move || promote_loop(buffer, queue_tx, shutdown_rx, interval, metrics))
                .map_err(|e| LoggerError::io_operation("spawn promotion thread", name.clone(), e))?
        };

        Ok(Self {
            name,
            path,
            buffer,
            metrics,
            closed: AtomicBool::new(false),
            shutdown: Mutex::new(Some(shutdown_tx)),
            promoter: Mutex::new(Some(promoter)),
            flusher: Mutex::new(Some(flusher)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metrics(&self) -> &Arc<StreamMetrics> {
        &self.metrics
    }

    /// Buffer a formatted record. Never blocks on the queue or the disk.
    ///
    /// Records written after [`Stream::close`] are discarded.
    #[inline]
    pub fn write(&self, record: &str) {
        if self.closed.load(Ordering::Acquire) {
            return;
        }
        self.buffer.append(record);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Stop both threads after everything buffered or queued is on disk.
    ///
    /// Blocks until the flush thread (and any archival it started) has
    /// finished. Calling it again is a no-op.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        drop(self.shutdown.lock().take());

        if let Some(handle) = self.promoter.lock().take() {
            if handle.join().is_err() {
                eprintln!("[LOGGER ERROR] Promotion thread for '{}' panicked", self.name);
            }
        }
        // The promoter dropped the queue sender on exit, so the flusher
        // ends once the queue is empty.
        if let Some(handle) = self.flusher.lock().take() {
            if handle.join().is_err() {
                eprintln!("[LOGGER ERROR] Flush thread for '{}' panicked", self.name);
            }
        }
    }
}

impl Drop for Stream {
    fn drop(&mut self) {
        self.close();
    }
}

fn promote_loop(
    buffer: Arc<SwapBuffer>,
    queue: Sender<Vec<u8>>,
    shutdown: Receiver<()>,
    interval: Duration,
    metrics: Arc<StreamMetrics>,
) {
    let ticker = tick(interval);
    loop {
        select! {
            recv(ticker) -> _ => {
                if buffer.drain_if_non_empty(&queue) {
                    metrics.record_promoted();
                }
            }
            recv(shutdown) -> _ => {
                if buffer.drain_if_non_empty(&queue) {
                    metrics.record_promoted();
                }
                break;
            }
        }
    }
}

fn flush_loop(mut rotator: StreamRotator, queue: Receiver<Vec<u8>>) {
    for batch in queue.iter() {
        rotator.process_batch(&batch);
    }
    rotator.finish();
}
