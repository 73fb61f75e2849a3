//! Core logger types: levels, values, formatting, buffering and the router

pub mod clock;
pub mod config;
pub mod error;
pub mod formatter;
pub mod log_level;
pub mod log_value;
pub mod logger;
pub mod metrics;
pub mod swap_buffer;

pub use clock::{Clock, SystemClock, DATE_FORMAT, HOUR_FORMAT};
pub use config::LoggerConfig;
pub use error::{LoggerError, Result};
pub use formatter::{format_record, format_record_at, RECORD_TIMESTAMP_FORMAT};
pub use log_level::LogLevel;
pub use log_value::LogValue;
pub use logger::{CallSite, Logger, LoggerBuilder};
pub use metrics::StreamMetrics;
pub use swap_buffer::SwapBuffer;
