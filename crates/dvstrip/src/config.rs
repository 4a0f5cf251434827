use std::time::Duration;

use crate::error::{Result, ScanError};

/// Default window size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 500 * 1000;

/// How often the scanner reports progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressConfig {
    /// Report after at least this many bytes were consumed since the last report.
    pub bytes_interval: u64,
    /// Report after at least this much time passed since the last report.
    pub time_interval: Duration,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            bytes_interval: 1024 * 1024,
            time_interval: Duration::from_millis(250),
        }
    }
}

/// Configuration for a single scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Capacity of the sliding window, which bounds the largest OBU that
    /// can be scanned.
    pub chunk_size: usize,

    /// Progress reporting intervals.
    pub progress: ProgressConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            progress: ProgressConfig::default(),
        }
    }
}

impl ScanConfig {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_progress(mut self, progress: ProgressConfig) -> Self {
        self.progress = progress;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(ScanError::InvalidConfig(
                "chunk size must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
