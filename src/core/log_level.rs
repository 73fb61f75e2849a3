//! Log level definitions
//!
//! The four standard streams, in threshold-index order. A threshold of `n`
//! enables every level whose index is `>= n`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug = 0,
    Trace = 1,
    Warn = 2,
    Error = 3,
}

impl LogLevel {
    /// All standard levels, ordered by threshold index
    pub const ALL: [LogLevel; 4] = [
        LogLevel::Debug,
        LogLevel::Trace,
        LogLevel::Warn,
        LogLevel::Error,
    ];

    /// Number of standard levels; a threshold at this value disables all of them
    pub const COUNT: usize = 4;

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Position of this level in the threshold ordering
    #[inline]
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}
