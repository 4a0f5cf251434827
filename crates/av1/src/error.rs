//! Error types for AV1 bitstream operations.

use thiserror::Error;

/// Errors that can occur while locating or decoding AV1 OBUs.
#[derive(Error, Debug)]
pub enum Av1Error {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid OBU data.
    #[error("invalid OBU: {0}")]
    InvalidObu(String),

    /// LEB128 value overflow.
    #[error("LEB128 overflow: value exceeds maximum")]
    Leb128Overflow,

    /// The buffer ends before the OBU does.
    ///
    /// `required` is the number of bytes, counted from the start of the
    /// buffer being scanned, that must be available before locating can make
    /// progress. When the OBU header is complete this is the full OBU size.
    #[error("need more data: {required} bytes required, {available} available")]
    NeedMoreData {
        /// Bytes required from the start of the buffer.
        required: usize,
        /// Bytes that were available.
        available: usize,
    },

    /// Invalid metadata OBU payload.
    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),
}

/// Result type alias for AV1 bitstream operations.
pub type Result<T> = std::result::Result<T, Av1Error>;
