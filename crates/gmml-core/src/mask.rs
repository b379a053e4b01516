//! Binary coverage masks.
//!
//! A [`Mask`] has the shape of the tensor it describes and holds `1.0` where
//! a spatial location was replaced, `0.0` elsewhere. Marking always writes
//! every channel, so a mask is constant across the channel dimension.
//!
//! ```rust
//! use gmml_core::{Mask, Rect};
//!
//! let mut mask = Mask::new(3, 16, 16);
//! mask.mark(Rect::new(0, 0, 8, 4)).unwrap();
//! assert_eq!(mask.covered_pixels(), 32);
//! assert!(mask.is_channel_consistent());
//! ```

use crate::{Error, Rect, Result, Tensor};

/// Channel-consistent binary mask over a (C, H, W) grid.
#[derive(Clone, PartialEq)]
pub struct Mask {
    tensor: Tensor,
    covered: usize,
}

impl Mask {
    /// Creates an empty (all-zero) mask.
    pub fn new(channels: usize, height: usize, width: usize) -> Self {
        Self {
            tensor: Tensor::new(channels, height, width),
            covered: 0,
        }
    }

    /// Creates an empty mask shaped like `tensor`.
    pub fn like(tensor: &Tensor) -> Self {
        let [c, h, w] = tensor.shape();
        Self::new(c, h, w)
    }

    /// Creates a mask with every location marked.
    pub fn full(channels: usize, height: usize, width: usize) -> Self {
        Self {
            tensor: Tensor::filled(channels, height, width, 1.0),
            covered: height * width,
        }
    }

    /// Wraps an existing tensor, treating any non-zero value on channel 0 as covered.
    ///
    /// Values are binarized on every channel from channel 0.
    pub fn from_tensor(mut tensor: Tensor) -> Self {
        let channels = tensor.channels();
        let n = tensor.pixel_count();
        let mut covered = 0;
        if channels > 0 {
            let flags: Vec<bool> = tensor.plane(0).iter().map(|&v| v != 0.0).collect();
            covered = flags.iter().filter(|&&f| f).count();
            for plane in tensor.planes_mut() {
                for (v, &f) in plane.iter_mut().zip(&flags) {
                    *v = if f { 1.0 } else { 0.0 };
                }
            }
        }
        debug_assert!(covered <= n);
        Self { tensor, covered }
    }

    /// Returns the shape as `[channels, height, width]`.
    #[inline]
    pub fn shape(&self) -> [usize; 3] {
        self.tensor.shape()
    }

    /// Marks every channel inside `rect` as replaced.
    ///
    /// Returns the number of spatial locations that were newly covered.
    pub fn mark(&mut self, rect: Rect) -> Result<usize> {
        let fresh = self.uncovered_in(rect)?;
        self.tensor.fill_rect(rect, 1.0)?;
        self.covered += fresh;
        Ok(fresh)
    }

    /// Counts the locations inside `rect` that are not yet covered.
    pub fn uncovered_in(&self, rect: Rect) -> Result<usize> {
        let [channels, h, w] = self.tensor.shape();
        if !rect.fits_in(h, w) {
            return Err(Error::invalid_region(rect, h, w));
        }
        if channels == 0 {
            return Ok(0);
        }
        let plane = self.tensor.plane(0);
        let count = (rect.y..rect.bottom())
            .map(|row| {
                plane[row * w + rect.x..row * w + rect.right()]
                    .iter()
                    .filter(|&&v| v == 0.0)
                    .count()
            })
            .sum();
        Ok(count)
    }

    /// Returns `true` if the location (`row`, `col`) is covered.
    #[inline]
    pub fn is_covered(&self, row: usize, col: usize) -> bool {
        self.tensor.get(0, row, col) != 0.0
    }

    /// Number of covered spatial locations (channel 0).
    #[inline]
    pub fn covered_pixels(&self) -> usize {
        self.covered
    }

    /// Covered fraction of the spatial grid, in `[0, 1]`.
    pub fn coverage(&self) -> f64 {
        let n = self.tensor.pixel_count();
        if n == 0 {
            0.0
        } else {
            self.covered as f64 / n as f64
        }
    }

    /// Returns `true` if every channel equals channel 0 at every location.
    pub fn is_channel_consistent(&self) -> bool {
        let channels = self.tensor.channels();
        if channels == 0 {
            return true;
        }
        let first = self.tensor.plane(0);
        (1..channels).all(|c| self.tensor.plane(c) == first)
    }

    /// Borrows the mask as a tensor.
    #[inline]
    pub fn as_tensor(&self) -> &Tensor {
        &self.tensor
    }

    /// Consumes the mask, returning the underlying tensor.
    #[inline]
    pub fn into_tensor(self) -> Tensor {
        self.tensor
    }
}

impl std::fmt::Debug for Mask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mask")
            .field("shape", &self.shape())
            .field("covered", &self.covered)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mark_counts_only_new_locations() {
        let mut mask = Mask::new(3, 10, 10);
        assert_eq!(mask.mark(Rect::new(0, 0, 4, 4)).unwrap(), 16);
        assert_eq!(mask.mark(Rect::new(2, 2, 4, 4)).unwrap(), 12);
        assert_eq!(mask.covered_pixels(), 28);
        assert_relative_eq!(mask.coverage(), 0.28);
        assert_eq!(mask.as_tensor().sum(), 3.0 * 28.0);
    }

    #[test]
    fn test_mark_out_of_bounds() {
        let mut mask = Mask::new(1, 8, 8);
        assert!(mask.mark(Rect::new(6, 0, 4, 4)).is_err());
        assert_eq!(mask.covered_pixels(), 0);
    }

    #[test]
    fn test_channel_consistency() {
        let mut mask = Mask::new(3, 8, 8);
        mask.mark(Rect::new(1, 1, 3, 3)).unwrap();
        assert!(mask.is_channel_consistent());

        let mut t = mask.clone().into_tensor();
        t.set(2, 0, 0, 1.0);
        // from_tensor re-derives all channels from channel 0
        let rebuilt = Mask::from_tensor(t);
        assert!(rebuilt.is_channel_consistent());
        assert_eq!(rebuilt.covered_pixels(), 9);
    }

    #[test]
    fn test_full_mask() {
        let mask = Mask::full(3, 4, 5);
        assert_eq!(mask.covered_pixels(), 20);
        assert_relative_eq!(mask.coverage(), 1.0);
        assert!(mask.is_covered(3, 4));
    }
}
