//! Accumulate-then-swap record buffer
//!
//! Producers append formatted records under a short mutex. The promotion
//! task swaps the whole accumulator out for an empty one under the same
//! mutex, so a drained batch always holds complete records and nothing
//! appended before the swap is left behind.

use crossbeam_channel::Sender;
use parking_lot::Mutex;

/// Initial capacity of a fresh accumulator (2 KiB)
pub const DEFAULT_BUFFER_CAPACITY: usize = 2 * 1024;

#[derive(Debug)]
pub struct SwapBuffer {
    content: Mutex<Vec<u8>>,
    capacity: usize,
}

impl SwapBuffer {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            content: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    /// Append a record. Never touches the queue or the disk.
    #[inline]
    pub fn append(&self, text: &str) {
        self.content.lock().extend_from_slice(text.as_bytes());
    }

    /// Number of bytes currently accumulated
    pub fn len(&self) -> usize {
        self.content.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.lock().is_empty()
    }

    /// Take the accumulated content, leaving an empty accumulator behind.
    ///
    /// Returns `None` when there is nothing to take.
    pub fn swap(&self) -> Option<Vec<u8>> {
        let mut content = self.content.lock();
        if content.is_empty() {
            return None;
        }
        Some(std::mem::replace(
            &mut *content,
            Vec::with_capacity(self.capacity),
        ))
    }

    /// Move the whole accumulator into `queue` as one batch, if non-empty.
    ///
    /// The swap happens under the producer mutex; the send happens after it
    /// is released, so a full queue blocks only the caller (the promotion
    /// task) while producers keep appending to the fresh accumulator.
    /// Returns `true` when a batch was handed off.
    ///
    /// Call from a single drainer only. Two concurrent drainers can each
    /// swap a batch and then send them to the queue in either order.
    pub fn drain_if_non_empty(&self, queue: &Sender<Vec<u8>>) -> bool {
        let Some(batch) = self.swap() else {
            return false;
        };

        let len = batch.len();
        if queue.send(batch).is_err() {
            eprintln!(
                "[LOGGER ERROR] Handoff queue disconnected, dropped {} buffered bytes",
                len
            );
            return false;
        }
        true
    }
}

impl Default for SwapBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_drain_empty_is_noop() {
        let buffer = SwapBuffer::new();
        let (tx, rx) = bounded(4);

        assert!(!buffer.drain_if_non_empty(&tx));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_drain_moves_whole_content() {
        let buffer = SwapBuffer::new();
        let (tx, rx) = bounded(4);

        buffer.append("first\n");
        buffer.append("second\n");
        assert!(buffer.drain_if_non_empty(&tx));

        assert_eq!(rx.try_recv().unwrap(), b"first\nsecond\n".to_vec());
        assert!(rx.try_recv().is_err());
        assert!(buffer.is_empty());

        buffer.append("third\n");
        assert!(buffer.drain_if_non_empty(&tx));
        assert_eq!(rx.try_recv().unwrap(), b"third\n".to_vec());
    }

    #[test]
    fn test_drain_on_disconnected_queue() {
        let buffer = SwapBuffer::new();
        let (tx, rx) = bounded::<Vec<u8>>(1);
        drop(rx);

        buffer.append("lost\n");
        assert!(!buffer.drain_if_non_empty(&tx));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_producers_not_blocked_by_full_queue() {
        let buffer = Arc::new(SwapBuffer::new());
        let (tx, rx) = bounded(1);

        buffer.append("a\n");
        assert!(buffer.drain_if_non_empty(&tx));

        // Queue is now full; the next drain blocks until we receive.
        buffer.append("b\n");
        let drainer = {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || buffer.drain_if_non_empty(&tx))
        };

        // Appends keep working while the drainer is parked on the queue.
        for _ in 0..100 {
            buffer.append("c\n");
        }

        assert_eq!(rx.recv().unwrap(), b"a\n".to_vec());
        assert!(drainer.join().unwrap());
        let second = rx.recv().unwrap();
        assert!(second.starts_with(b"b\n"));
        assert_eq!(second.len() + buffer.len(), 2 + 200);
    }

    #[test]
    fn test_concurrent_append_and_drain_never_splits_records() {
        let buffer = Arc::new(SwapBuffer::new());
        let (tx, rx) = bounded(100_000);
        let record = "0123456789abcdefghij\n";

        let writers: Vec<_> = (0..4)
            .map(|_| {
                let buffer = Arc::clone(&buffer);
                thread::spawn(move || {
                    for _ in 0..2_000 {
                        buffer.append(record);
                    }
                })
            })
            .collect();

        let drainer = {
            let buffer = Arc::clone(&buffer);
            let tx = tx.clone();
            thread::spawn(move || {
                for _ in 0..500 {
                    buffer.drain_if_non_empty(&tx);
                    thread::yield_now();
                }
            })
        };

        for w in writers {
            w.join().unwrap();
        }
        drainer.join().unwrap();
        buffer.drain_if_non_empty(&tx);
        drop(tx);

        let mut total = 0;
        for batch in rx.iter() {
            assert_eq!(batch.len() % record.len(), 0);
            for chunk in batch.chunks(record.len()) {
                assert_eq!(chunk, record.as_bytes());
            }
            total += batch.len() / record.len();
        }
        assert_eq!(total, 4 * 2_000);
    }
}
