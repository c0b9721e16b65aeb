//! Error types for afterglow-core.
//!
//! Buffer construction is the only fallible part of this crate: every
//! constructor that accepts caller-provided data checks that the data
//! length matches the declared dimensions.
//!
//! # Usage
//!
//! ```rust
//! use afterglow_core::{Error, PixelBuffer};
//!
//! let err = PixelBuffer::from_data(4, 4, vec![0.0; 10]).unwrap_err();
//! assert!(matches!(err, Error::DataLength { .. }));
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or combining buffers.
#[derive(Debug, Error)]
pub enum Error {
    /// Data length does not match `width * height * channels`.
    #[error("data length mismatch: expected {expected} samples, got {got}")]
    DataLength {
        /// Expected sample count
        expected: usize,
        /// Provided sample count
        got: usize,
    },

    /// Invalid buffer dimensions.
    ///
    /// Returned when width or height is zero, or the sample count would
    /// overflow `usize`.
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: usize,
        /// Requested height
        height: usize,
        /// Reason why dimensions are invalid
        reason: String,
    },

    /// Two grids that must share a shape do not.
    #[error("dimension mismatch: {a_width}x{a_height} vs {b_width}x{b_height}")]
    DimensionMismatch {
        /// First grid width
        a_width: usize,
        /// First grid height
        a_height: usize,
        /// Second grid width
        b_width: usize,
        /// Second grid height
        b_height: usize,
    },
}

impl Error {
    /// Creates an [`Error::DataLength`] error.
    #[inline]
    pub fn data_length(expected: usize, got: usize) -> Self {
        Self::DataLength { expected, got }
    }

    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: usize, height: usize, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::DimensionMismatch`] error.
    #[inline]
    pub fn dimension_mismatch(a: (usize, usize), b: (usize, usize)) -> Self {
        Self::DimensionMismatch {
            a_width: a.0,
            a_height: a.1,
            b_width: b.0,
            b_height: b.1,
        }
    }
}

/// Computes `width * height * channels`, rejecting empty or overflowing shapes.
pub(crate) fn checked_len(width: usize, height: usize, channels: usize) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(Error::invalid_dimensions(width, height, "width and height must be > 0"));
    }
    width
        .checked_mul(height)
        .and_then(|v| v.checked_mul(channels))
        .ok_or_else(|| Error::invalid_dimensions(width, height, "sample count overflows usize"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_length_message() {
        let err = Error::data_length(48, 12);
        let msg = err.to_string();
        assert!(msg.contains("48"));
        assert!(msg.contains("12"));
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = Error::dimension_mismatch((100, 100), (200, 50));
        let msg = err.to_string();
        assert!(msg.contains("100x100"));
        assert!(msg.contains("200x50"));
    }

    #[test]
    fn test_checked_len_rejects_zero() {
        assert!(checked_len(0, 4, 3).is_err());
        assert!(checked_len(4, 0, 3).is_err());
        assert_eq!(checked_len(4, 2, 3).unwrap(), 24);
    }

    #[test]
    fn test_checked_len_overflow() {
        assert!(checked_len(usize::MAX, 2, 3).is_err());
    }
}
