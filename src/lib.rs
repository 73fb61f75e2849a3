//! # Rust Stream Logger
//!
//! A process-local, multi-level file logger that keeps disk I/O off the
//! caller's thread and rotates its files by hour and by size.
//!
//! ## Features
//!
//! - **Non-blocking writes**: records accumulate in a swap buffer that a
//!   background task promotes to a bounded queue once per interval
//! - **One file per stream**: `debug`, `trace`, `warn`, `error`, plus custom
//!   named streams created on first use
//! - **Rotation**: hourly (`<file>.<YYYYMMDDHH>`) and by size within the hour
//!   (`<file>.<YYYYMMDDHH>.<n>`, cycling through a fixed number of slots)
//! - **Archival**: finished hours move to `<backup>/<YYYY-MM-DD>/`
//! - **Fail-open**: disk errors are reported to stderr, never to the caller
//!
//! ```no_run
//! use rust_stream_logger::prelude::*;
//! use rust_stream_logger::warn;
//!
//! let logger = Logger::new("log/saver", "10.0.0.7", "log/backup")?;
//! warn!(logger, "slow request", 1830);
//! logger.close();
//! # Ok::<(), LoggerError>(())
//! ```

pub mod core;
pub mod macros;
pub mod process;
pub mod stream;

pub mod prelude {
    pub use crate::core::{
        CallSite, Clock, LogLevel, LogValue, Logger, LoggerBuilder, LoggerConfig, LoggerError,
        Result, StreamMetrics, SystemClock,
    };
    pub use crate::stream::RotationPolicy;
}

pub use crate::core::{
    format_record, format_record_at, CallSite, Clock, LogLevel, LogValue, Logger, LoggerBuilder,
    LoggerConfig, LoggerError, Result, StreamMetrics, SwapBuffer, SystemClock,
};
pub use crate::stream::{RotationDecision, RotationPolicy, Stream, StreamOptions, StreamRotator};
