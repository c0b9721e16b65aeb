//! Error types for effects and the filter registry.

use thiserror::Error;

/// Error type for effects and filter dispatch.
#[derive(Error, Debug)]
pub enum OpsError {
    /// A parameter value is outside its allowed range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The input image cannot be processed at its size.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// A filter name that is neither canonical nor an alias.
    #[error("unknown filter `{name}` (expected one of: {expected})")]
    UnknownFilter {
        /// Name as given.
        name: String,
        /// Comma-separated canonical names.
        expected: String,
    },

    /// A key the filter's schema does not declare.
    #[error("unknown parameter `{param}` for `{filter}` (expected one of: {expected})")]
    UnknownParameter {
        /// Canonical filter name.
        filter: &'static str,
        /// Key as given.
        param: String,
        /// Comma-separated declared keys.
        expected: String,
    },

    /// A value that does not parse as the declared type.
    #[error("malformed value `{value}` for `{filter}.{param}`: expected {expected}")]
    MalformedValue {
        /// Canonical filter name.
        filter: &'static str,
        /// Parameter name.
        param: String,
        /// Raw value text.
        value: String,
        /// Expected type description.
        expected: String,
    },

    /// An iterative effect observed its cancel token.
    #[error("cancelled after {completed} iterations")]
    Cancelled {
        /// Iterations fully applied before stopping.
        completed: usize,
    },

    /// Buffer construction failed.
    #[error(transparent)]
    Core(#[from] afterglow_core::Error),
}

impl OpsError {
    /// Creates an [`OpsError::InvalidParameter`].
    pub fn invalid_param(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for effects.
pub type OpsResult<T> = Result<T, OpsError>;
