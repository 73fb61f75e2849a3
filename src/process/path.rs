//! Binary and project directories
//!
//! Deployments are laid out as
//!
//! ```text
//! root
//!   |___bin   binaries
//!   |___log   log files
//!   |___data  local data
//!   |___tmp   temporary files
//! ```
//!
//! so the project root is the parent of the binary's directory.

use crate::core::error::{LoggerError, Result};
use std::path::PathBuf;

/// Absolute directory containing the running executable
pub fn resolve_binary_directory() -> Result<PathBuf> {
    let exe = std::env::current_exe().map_err(|e| {
        LoggerError::io_operation(
            "resolve binary directory",
            "Cannot locate current executable",
            e,
        )
    })?;
    exe.parent().map(PathBuf::from).ok_or_else(|| {
        LoggerError::process_path(format!("'{}' has no parent directory", exe.display()))
    })
}

/// `<binary directory>/..`
pub fn try_resolve_project_root() -> Result<PathBuf> {
    Ok(resolve_binary_directory()?.join(".."))
}

/// `<binary directory>/..`
///
/// # Panics
///
/// Panics if the binary directory cannot be resolved
#[must_use]
pub fn resolve_project_root() -> PathBuf {
    match try_resolve_project_root() {
        Ok(root) => root,
        Err(e) => panic!("Cannot resolve project root: {}", e),
    }
}
