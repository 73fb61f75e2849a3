//! Pid file writer

use crate::core::error::{LoggerError, Result};
use std::fs;
use std::path::Path;

/// Write the current process id as decimal text to `path`, creating parent
/// directories as needed. An existing file is overwritten.
pub fn save_pid(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            LoggerError::io_operation(
                "create pid directory",
                format!("Failed to create directory '{}'", parent.display()),
                e,
            )
        })?;
    }

    fs::write(path, std::process::id().to_string()).map_err(|e| {
        LoggerError::io_operation(
            "write pid file",
            format!("Failed to write '{}'", path.display()),
            e,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_pid_creates_directories() {
        let dir = tempdir().unwrap();
        let pid_file = dir.path().join("run").join("nested").join("server.pid");

        save_pid(&pid_file).unwrap();

        let content = fs::read_to_string(&pid_file).unwrap();
        assert_eq!(content, std::process::id().to_string());
    }

    #[test]
    fn test_save_pid_overwrites() {
        let dir = tempdir().unwrap();
        let pid_file = dir.path().join("server.pid");
        fs::write(&pid_file, "999999999999").unwrap();

        save_pid(&pid_file).unwrap();
        assert_eq!(fs::read_to_string(&pid_file).unwrap(), std::process::id().to_string());
    }
}
