//! Error types for augmentation.
//!
//! Failures propagate to the caller (typically a dataset loader), which
//! decides whether to skip or abort the sample. Nothing here retries.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for augmentation operations.
pub type AugmentResult<T> = Result<T, AugmentError>;

/// Errors that can occur while building or running augmentations.
#[derive(Debug, Error)]
pub enum AugmentError {
    /// The image is not strictly larger than the block alignment, so no
    /// aligned block offset can be sampled.
    #[error("image {height}x{width} is too small for alignment {alignment}")]
    ImageTooSmallForAlignment {
        /// Image height.
        height: usize,
        /// Image width.
        width: usize,
        /// Effective alignment.
        alignment: usize,
    },

    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A tensor doesn't have the shape the operation expects.
    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape (C, H, W).
        expected: [usize; 3],
        /// Actual shape (C, H, W).
        got: [usize; 3],
    },

    /// Batch inputs disagree in length.
    #[error("batch mismatch: {batch} samples, {corrupted} prior corruptions, {masks} prior masks")]
    BatchMismatch {
        /// Number of samples.
        batch: usize,
        /// Number of prior corrupted samples.
        corrupted: usize,
        /// Number of prior masks.
        masks: usize,
    },

    /// The block loop hit its iteration cap before reaching the coverage target.
    #[error("coverage target unreachable: {covered} of {target} pixels after {iterations} blocks")]
    CoverageUnreachable {
        /// Pixels covered when the loop stopped.
        covered: usize,
        /// Pixels the loop was trying to cover.
        target: usize,
        /// Blocks sampled.
        iterations: usize,
    },

    /// Config file not found.
    #[error("config file not found: {path}")]
    ConfigNotFound {
        /// Path that was searched.
        path: PathBuf,
    },

    /// Tensor shape or bounds error.
    #[error(transparent)]
    Core(#[from] gmml_core::Error),

    /// Error from a tensor operation.
    #[error(transparent)]
    Ops(#[from] gmml_ops::OpsError),

    /// I/O error reading config files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl AugmentError {
    /// Creates an [`AugmentError::InvalidConfig`] error.
    #[inline]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
