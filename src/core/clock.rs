//! Time source for record timestamps and rotation decisions

use chrono::{DateTime, Local, NaiveDateTime, Timelike};

/// Hour stamp used in rotated file names: `YYYYMMDDHH`
pub const HOUR_FORMAT: &str = "%Y%m%d%H";

/// Date used for backup directories: `YYYY-MM-DD`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A source of the current local time.
///
/// Everything time-dependent in a stream (record timestamps, the hour
/// watermark, rotated file names) reads through this trait so that hour
/// boundaries can be driven from tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// The wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Truncate a local time to the start of its hour.
pub fn truncate_to_hour(time: &DateTime<Local>) -> NaiveDateTime {
    let naive = time.naive_local();
    naive
        .date()
        .and_hms_opt(naive.hour(), 0, 0)
        .unwrap_or(naive)
}

pub fn hour_stamp(hour: &NaiveDateTime) -> String {
    hour.format(HOUR_FORMAT).to_string()
}

pub fn date_stamp(hour: &NaiveDateTime) -> String {
    hour.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_truncate_to_hour() {
        let t = Local.with_ymd_and_hms(2024, 3, 5, 10, 42, 17).unwrap();
        let hour = truncate_to_hour(&t);
        assert_eq!(hour_stamp(&hour), "2024030510");
        assert_eq!(date_stamp(&hour), "2024-03-05");
        assert_eq!(hour.minute(), 0);
        assert_eq!(hour.second(), 0);
    }

    #[test]
    fn test_hours_order() {
        let a = truncate_to_hour(&Local.with_ymd_and_hms(2024, 3, 5, 23, 59, 59).unwrap());
        let b = truncate_to_hour(&Local.with_ymd_and_hms(2024, 3, 6, 0, 0, 1).unwrap());
        assert!(b > a);
    }
}
