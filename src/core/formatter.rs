//! Record formatting
//!
//! A record is one line: `<timestamp>|field1|field2|...[|suffix]\n`, with the
//! timestamp at millisecond precision.

use super::log_value::LogValue;
use chrono::{DateTime, Local};

/// Timestamp at the head of every record
pub const RECORD_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Format a record stamped with the current local time.
///
/// # Examples
///
/// ```
/// use rust_stream_logger::{format_record, LogValue};
///
/// let line = format_record(true, "host-7", &[LogValue::from(1), LogValue::from("ok\n")]);
/// assert!(line.ends_with("|1|ok|host-7\n"));
/// ```
#[must_use]
pub fn format_record(append_suffix: bool, suffix: &str, values: &[LogValue]) -> String {
    format_record_at(&Local::now(), append_suffix, suffix, values)
}

/// Format a record stamped with `now`.
#[must_use]
pub fn format_record_at(
    now: &DateTime<Local>,
    append_suffix: bool,
    suffix: &str,
    values: &[LogValue],
) -> String {
    let mut line = now.format(RECORD_TIMESTAMP_FORMAT).to_string();
    for value in values {
        line.push('|');
        value.render_into(&mut line);
    }
    if append_suffix {
        line.push('|');
        line.push_str(suffix);
    }
    line.push('\n');
    line
}
