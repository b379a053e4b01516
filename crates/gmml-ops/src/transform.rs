//! Geometric transformation operations.
//!
//! - [`crop`] - Extract a region
//! - [`flip_h`] - Horizontal flip (mirror)
//! - [`resized_crop`] - Crop then resample to a fixed size
//!
//! # Example
//!
//! ```rust
//! use gmml_core::{Rect, Tensor};
//! use gmml_ops::transform::{crop, flip_h};
//!
//! let src = Tensor::filled(3, 64, 64, 0.5);
//! let flipped = flip_h(&src);
//! let cropped = crop(&src, Rect::new(16, 16, 32, 32)).unwrap();
//! assert_eq!(cropped.shape(), [3, 32, 32]);
//! # let _ = flipped;
//! ```

use crate::resize::{resize, Filter};
use crate::{OpsError, OpsResult};
use gmml_core::{Rect, Tensor};

/// Crops `rect` out of `src`.
///
/// # Example
///
/// ```rust
/// use gmml_core::{Rect, Tensor};
/// use gmml_ops::transform::crop;
///
/// let src = Tensor::new(3, 64, 64);
/// assert!(crop(&src, Rect::new(60, 0, 8, 8)).is_err());
/// ```
pub fn crop(src: &Tensor, rect: Rect) -> OpsResult<Tensor> {
    if rect.is_empty() {
        return Err(OpsError::InvalidDimensions(format!(
            "crop region {} is empty",
            rect
        )));
    }
    Ok(src.crop(rect)?)
}

/// Flips every channel left-right.
///
/// # Example
///
/// ```rust
/// use gmml_core::Tensor;
/// use gmml_ops::transform::flip_h;
///
/// let src = Tensor::from_data(1, 1, 2, vec![1.0, 0.0]).unwrap();
/// assert_eq!(flip_h(&src).data(), &[0.0, 1.0]);
/// ```
pub fn flip_h(src: &Tensor) -> Tensor {
    let width = src.width();
    let mut dst = src.clone();
    if width == 0 {
        return dst;
    }
    for row in dst.data_mut().chunks_exact_mut(width) {
        row.reverse();
    }
    dst
}

/// Crops `rect` and resamples it to `out_h` x `out_w`.
///
/// This is the primitive behind random resized crops: the same `rect`
/// applied here reproduces the crop transform's output.
pub fn resized_crop(
    src: &Tensor,
    rect: Rect,
    out_h: usize,
    out_w: usize,
    filter: Filter,
) -> OpsResult<Tensor> {
    let cropped = crop(src, rect)?;
    if cropped.height() == out_h && cropped.width() == out_w {
        return Ok(cropped);
    }
    resize(&cropped, out_h, out_w, filter)
}
