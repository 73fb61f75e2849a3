//! Concurrency tests
//!
//! These tests verify:
//! - No record is lost or torn across concurrent writers
//! - Size splits under load keep every record in some rotated file
//! - Concurrent first use of a custom stream creates it exactly once

mod common;

use common::{files_with_prefix, read_lines, ManualClock};
use rust_stream_logger::prelude::*;
use rust_stream_logger::{warn, write_stream};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

const THREADS: usize = 8;
const RECORDS_PER_THREAD: usize = 1000;

fn assert_complete(lines: &[String], suffix_fields: usize) {
    assert_eq!(lines.len(), THREADS * RECORDS_PER_THREAD);

    let mut seen = HashSet::new();
    for line in lines {
        let fields: Vec<&str> = line.split('|').collect();
        assert_eq!(fields.len(), 3 + suffix_fields, "torn record: {}", line);
        assert_eq!(fields[0].len(), "2024-03-05 10:00:00.000".len());
        assert!(seen.insert((fields[1].to_string(), fields[2].to_string())), "duplicate: {}", line);
    }
}

#[test]
fn test_concurrent_writers_lose_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let clock = ManualClock::at(10, 0);
    let logger = Arc::new(
        Logger::builder(temp_dir.path().join("app"))
            .suffix("node-1")
            .clock(clock.shared())
            .promote_interval(Duration::from_millis(5))
            .build()
            .unwrap(),
    );

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..RECORDS_PER_THREAD {
                    warn!(logger, format!("writer-{}", t), i);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    logger.close();

    let lines = read_lines(&logger.path(LogLevel::Warn));
    assert_complete(&lines, 1);

    let metrics = logger.metrics("warn").unwrap();
    assert_eq!(metrics.batches_dropped(), 0);
    assert_eq!(metrics.batches_written(), metrics.batches_promoted());
}

#[test]
fn test_size_splits_under_load_keep_every_record() {
    let temp_dir = TempDir::new().unwrap();
    let clock = ManualClock::at(10, 0);
    let logger = Arc::new(
        Logger::builder(temp_dir.path().join("app"))
            .suffix("node-1")
            .clock(clock.shared())
            .max_file_size(4 * 1024)
            // Enough slots that no split file is reused
            .max_generations(100_000)
            .promote_interval(Duration::from_millis(2))
            .build()
            .unwrap(),
    );

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..RECORDS_PER_THREAD {
                    warn!(logger, format!("writer-{}", t), i);
                    if i % 100 == 0 {
                        thread::sleep(Duration::from_millis(1));
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    logger.close();

    let lines: Vec<String> = files_with_prefix(temp_dir.path(), "app-warn.log")
        .iter()
        .flat_map(|name| read_lines(&temp_dir.path().join(name)))
        .collect();
    assert_complete(&lines, 1);

    let metrics = logger.metrics("warn").unwrap();
    assert!(metrics.size_rotations() > 0);
    assert_eq!(metrics.hour_rotations(), 0);
}

#[test]
fn test_concurrent_custom_stream_creation() {
    let temp_dir = TempDir::new().unwrap();
    let clock = ManualClock::at(10, 0);
    let logger = Arc::new(
        Logger::builder(temp_dir.path().join("app"))
            .clock(clock.shared())
            .promote_interval(Duration::from_millis(5))
            .build()
            .unwrap(),
    );
    let custom = temp_dir.path().join("shared.log");
    let name = custom.to_str().unwrap().to_string();

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = Arc::clone(&logger);
            let name = name.clone();
            thread::spawn(move || {
                for i in 0..RECORDS_PER_THREAD {
                    write_stream!(logger, &name, false, format!("writer-{}", t), i);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    logger.close();

    assert_complete(&read_lines(&custom), 0);
}
