//! Logging macros that capture the calling site.
//!
//! Each argument after the logger becomes one pipe-separated field through
//! [`LogValue::from`](crate::LogValue). Types without a `From` impl can be
//! passed as `LogValue::display(x)`.
//!
//! # Examples
//!
//! ```no_run
//! use rust_stream_logger::prelude::*;
//! use rust_stream_logger::{debug, error, write_stream};
//!
//! let logger = Logger::new("log/app", "node-1", "log/backup").unwrap();
//!
//! // 2024-03-05 10:04:09.007|src/main.rs,9:app|user|42|node-1
//! debug!(logger, "user", 42);
//!
//! // 2024-03-05 10:04:09.007|timeout|3000|node-1
//! error!(logger, "timeout", 3000u64);
//!
//! // Custom stream, no suffix: 2024-03-05 10:04:09.007|payment|ok
//! write_stream!(logger, "log/payments.log", false, "payment", "ok");
//! ```

/// The current file, line and module as a [`CallSite`](crate::CallSite).
#[macro_export]
macro_rules! call_site {
    () => {
        $crate::CallSite::new(file!(), line!(), module_path!())
    };
}

/// Build a `Vec<LogValue>` from heterogeneous values.
///
/// ```
/// use rust_stream_logger::{log_values, LogValue};
///
/// let values = log_values![1, "a\n", 9i64];
/// assert_eq!(
///     values,
///     vec![LogValue::Integer(1), LogValue::Text("a\n".into()), LogValue::Integer(9)]
/// );
/// ```
#[macro_export]
macro_rules! log_values {
    ($($value:expr),* $(,)?) => {
        vec![$($crate::LogValue::from($value)),*]
    };
}

/// Log at an explicit level, recording the calling site.
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr $(, $value:expr)* $(,)?) => {
        $logger.log_at($level, $crate::call_site!(), &[$($crate::LogValue::from($value)),*])
    };
}

/// Log to the debug stream.
#[macro_export]
macro_rules! debug {
    ($logger:expr $(, $value:expr)* $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Debug $(, $value)*)
    };
}

/// Log to the trace stream.
#[macro_export]
macro_rules! trace {
    ($logger:expr $(, $value:expr)* $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Trace $(, $value)*)
    };
}

/// Log to the warn stream.
#[macro_export]
macro_rules! warn {
    ($logger:expr $(, $value:expr)* $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Warn $(, $value)*)
    };
}

/// Log to the error stream.
#[macro_export]
macro_rules! error {
    ($logger:expr $(, $value:expr)* $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Error $(, $value)*)
    };
}

/// Write to a custom stream, bypassing the severity threshold.
#[macro_export]
macro_rules! write_stream {
    ($logger:expr, $name:expr, $append_suffix:expr $(, $value:expr)* $(,)?) => {
        $logger.write($name, $append_suffix, &[$($crate::LogValue::from($value)),*])
    };
}
