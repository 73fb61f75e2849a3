//! Error types for the logger system
//!
//! Only construction and configuration paths return these. Failures inside
//! the background write path are reported to stderr and counted in
//! [`StreamMetrics`](super::metrics::StreamMetrics) instead.

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be parsed
    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Archival of a rotated file failed
    #[error("Archive failed for '{path}': {message}")]
    Archive { path: String, message: String },

    /// The executable's location could not be resolved
    #[error("Cannot resolve process path: {0}")]
    ProcessPath(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create an archive error
    pub fn archive(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::Archive {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn process_path<S: Into<String>>(msg: S) -> Self {
        LoggerError::ProcessPath(msg.into())
    }
}
