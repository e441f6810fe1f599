//! Error type shared by every pixel transform.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// A documented precondition failed. The message names the offending value(s).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl TransformError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Result type for pixel transforms.
pub type Result<T> = std::result::Result<T, TransformError>;
