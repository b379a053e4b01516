//! Error types for gmml-core operations.
//!
//! This module provides the error type shared by the tensor, mask and
//! rectangle primitives.
//!
//! # Overview
//!
//! The [`Error`] enum covers the failure modes of buffer construction and
//! region access:
//! - Buffer/shape mismatches when wrapping existing data
//! - Regions that leave the tensor bounds
//! - Tensors whose shapes must agree but don't
//!
//! # Usage
//!
//! ```rust
//! use gmml_core::{Error, Rect, Result};
//!
//! fn check(rect: Rect, height: usize, width: usize) -> Result<()> {
//!     if rect.bottom() > height || rect.right() > width {
//!         return Err(Error::invalid_region(rect, height, width));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Dependencies
//!
//! - [`thiserror`] - For derive macro error implementation

use crate::Rect;
use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tensor and mask operations.
///
/// # Categories
///
/// - **Bounds errors**: [`OutOfBounds`](Error::OutOfBounds), [`InvalidRegion`](Error::InvalidRegion)
/// - **Shape errors**: [`InvalidShape`](Error::InvalidShape), [`ShapeMismatch`](Error::ShapeMismatch)
#[derive(Debug, Error)]
pub enum Error {
    /// Element coordinates are outside tensor bounds.
    #[error("element ({channel}, {row}, {col}) out of bounds for tensor {shape:?}")]
    OutOfBounds {
        /// Channel index
        channel: usize,
        /// Row index
        row: usize,
        /// Column index
        col: usize,
        /// Tensor shape (C, H, W)
        shape: [usize; 3],
    },

    /// Region extends beyond tensor bounds.
    ///
    /// Returned when a [`crate::rect::Rect`] doesn't fit within the spatial
    /// dimensions of a tensor.
    #[error("region {rect} exceeds tensor bounds {height}x{width}")]
    InvalidRegion {
        /// Offending region
        rect: Rect,
        /// Tensor height
        height: usize,
        /// Tensor width
        width: usize,
    },

    /// Invalid tensor shape.
    ///
    /// Returned when a dimension is zero or the backing buffer length
    /// doesn't match `C * H * W`.
    #[error("invalid shape {shape:?} ({reason})")]
    InvalidShape {
        /// Requested shape (C, H, W)
        shape: [usize; 3],
        /// Reason the shape was rejected
        reason: String,
    },

    /// Two tensors that must share a shape don't.
    #[error("shape mismatch: {a:?} vs {b:?}")]
    ShapeMismatch {
        /// First shape (C, H, W)
        a: [usize; 3],
        /// Second shape (C, H, W)
        b: [usize; 3],
    },
}

impl Error {
    /// Creates an [`Error::OutOfBounds`] error.
    #[inline]
    pub fn out_of_bounds(channel: usize, row: usize, col: usize, shape: [usize; 3]) -> Self {
        Self::OutOfBounds {
            channel,
            row,
            col,
            shape,
        }
    }

    /// Creates an [`Error::InvalidRegion`] error.
    #[inline]
    pub fn invalid_region(rect: Rect, height: usize, width: usize) -> Self {
        Self::InvalidRegion {
            rect,
            height,
            width,
        }
    }

    /// Creates an [`Error::InvalidShape`] error.
    #[inline]
    pub fn invalid_shape(shape: [usize; 3], reason: impl Into<String>) -> Self {
        Self::InvalidShape {
            shape,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::ShapeMismatch`] error.
    #[inline]
    pub fn shape_mismatch(a: [usize; 3], b: [usize; 3]) -> Self {
        Self::ShapeMismatch { a, b }
    }

    /// Returns `true` if this is a bounds-related error.
    #[inline]
    pub fn is_bounds_error(&self) -> bool {
        matches!(self, Self::OutOfBounds { .. } | Self::InvalidRegion { .. })
    }
}
