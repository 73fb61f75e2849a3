//! Stream files: rotation policy, rotation engine, archival and the
//! background tasks that drive them

pub mod archive;
pub mod policy;
pub mod rotator;
pub mod task;

pub use archive::ArchiveJob;
pub use policy::{
    generation_file_path, hour_file_path, RotationPolicy, DEFAULT_MAX_FILE_SIZE,
    DEFAULT_MAX_GENERATIONS,
};
pub use rotator::{RotationDecision, StreamRotator};
pub use task::{Stream, StreamOptions, DEFAULT_PROMOTE_INTERVAL, DEFAULT_QUEUE_CAPACITY};
