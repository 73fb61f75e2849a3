//! Shared helpers for integration tests

#![allow(dead_code)]

use chrono::{DateTime, Local, TimeZone};
use rust_stream_logger::Clock;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// A clock that only moves when told to
#[derive(Clone)]
pub struct ManualClock(Arc<Mutex<DateTime<Local>>>);

impl ManualClock {
    /// 2024-03-05 at `hour:minute`
    pub fn at(hour: u32, minute: u32) -> Self {
        ManualClock(Arc::new(Mutex::new(local(2024, 3, 5, hour, minute))))
    }

    pub fn set(&self, time: DateTime<Local>) {
        *self.0.lock().unwrap() = time;
    }

    /// Move to `hour:minute` on 2024-03-05
    pub fn set_time(&self, hour: u32, minute: u32) {
        self.set(local(2024, 3, 5, hour, minute));
    }

    pub fn shared(&self) -> Arc<dyn Clock> {
        Arc::new(self.clone())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        *self.0.lock().unwrap()
    }
}

pub fn local(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(year, month, day, hour, minute, 0)
        .unwrap()
}

pub fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(String::from)
        .collect()
}

/// Poll until `condition` holds or five seconds pass
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}

/// Names of the files in `dir` starting with `prefix`, sorted
pub fn files_with_prefix(dir: &Path, prefix: &str) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter_map(|e| e.file_name().to_str().map(String::from))
        .filter(|name| name.starts_with(prefix))
        .collect();
    names.sort();
    names
}
