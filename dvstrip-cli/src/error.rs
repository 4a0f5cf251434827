use dvstrip_engine::ScanError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

impl AppError {
    /// Extra guidance printed after the error message.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            AppError::Scan(ScanError::ChunkTooSmall { .. }) => {
                Some("try increasing the chunk size with -c or DVSTRIP_CHUNK_SIZE")
            }
            AppError::Scan(ScanError::Truncated { .. }) => {
                Some("the input ends inside an OBU; it is likely damaged or incomplete")
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
