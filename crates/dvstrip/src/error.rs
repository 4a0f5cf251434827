use std::path::PathBuf;

use av1::Av1Error;
use thiserror::Error;

/// Fatal conditions that stop a scan.
///
/// Every variant that can be caused by an undersized window or a damaged
/// stream carries the offsets and sizes needed to tell the two apart.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("could not allocate a {capacity} byte window")]
    Allocation { capacity: usize },

    #[error("short read: requested {requested} bytes, got {actual}")]
    ShortRead { requested: usize, actual: usize },

    #[error("short write: requested {requested} bytes, wrote {actual}")]
    ShortWrite { requested: usize, actual: usize },

    #[error("OBU needs {required} bytes but the chunk size is {capacity} bytes")]
    ChunkTooSmall { required: usize, capacity: usize },

    #[error(
        "stream truncated at offset {offset}: OBU needs {required} bytes, only {available} remain"
    )]
    Truncated {
        offset: u64,
        required: usize,
        available: u64,
    },

    #[error("malformed OBU at offset {offset} (window cursor {cursor}, {occupied} bytes buffered): {source}")]
    Parse {
        offset: u64,
        cursor: usize,
        occupied: usize,
        #[source]
        source: Av1Error,
    },

    #[error("failed to decode metadata OBU at offset {offset}: {source}")]
    Decode {
        offset: u64,
        #[source]
        source: Av1Error,
    },
}

impl ScanError {
    /// Returns `true` when a larger chunk size could let the scan succeed.
    pub fn is_chunk_size_related(&self) -> bool {
        matches!(self, ScanError::ChunkTooSmall { .. })
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
