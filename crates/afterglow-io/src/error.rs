//! Error types for image I/O.

use std::io;
use thiserror::Error;

/// I/O operation error.
#[derive(Debug, Error)]
pub enum IoError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Neither the file header nor its extension names a supported format.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Decoding error.
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Encoding error.
    #[error("encode error: {0}")]
    EncodeError(String),

    /// Colour type or bit depth the decoder cannot convert to RGB.
    #[error("unsupported bit depth: {0}")]
    UnsupportedBitDepth(String),

    /// Decoded samples did not form a valid buffer.
    #[error(transparent)]
    Buffer(#[from] afterglow_core::Error),
}

/// Result type for I/O operations.
pub type IoResult<T> = Result<T, IoError>;
