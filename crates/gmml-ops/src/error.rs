//! Error types for tensor operations.

use thiserror::Error;

/// Error type for tensor operations.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Invalid dimensions specified.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Operation not supported for this channel layout.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Shape or bounds error from the tensor itself.
    #[error(transparent)]
    Core(#[from] gmml_core::Error),
}

/// Result type for tensor operations.
pub type OpsResult<T> = Result<T, OpsError>;
