//! Process helpers used to place log files: locating the running binary
//! and recording the process id

pub mod path;
pub mod pid;

pub use path::{resolve_binary_directory, resolve_project_root, try_resolve_project_root};
pub use pid::save_pid;
