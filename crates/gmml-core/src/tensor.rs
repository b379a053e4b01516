//! Planar image tensor.
//!
//! This module provides [`Tensor`], the owned image container every
//! augmentation step consumes and produces.
//!
//! # Memory Layout
//!
//! Tensors store `f32` values in **planar** (C, H, W) order: each channel is a
//! contiguous row-major plane, planes follow each other.
//!
//! ```text
//! Memory: [R R R ... R]  ← channel 0, rows top-to-bottom
//!         [G G G ... G]  ← channel 1
//!         [B B B ... B]  ← channel 2
//! ```
//!
//! Values are either raw intensities in `[0, 1]` (after [`Tensor::from_rgb8`])
//! or already normalized; the tensor itself doesn't care.
//!
//! # Usage
//!
//! ```rust
//! use gmml_core::{Rect, Tensor};
//!
//! let mut t = Tensor::new(3, 32, 32);
//! t.fill_rect(Rect::new(8, 8, 16, 16), 1.0).unwrap();
//! assert_eq!(t.get(0, 8, 8), 1.0);
//! assert_eq!(t.get(2, 0, 0), 0.0);
//! ```
//!
//! # Ownership
//!
//! Region writes mutate in place. Operations that must not touch the
//! caller's data take the tensor by value, so callers that need the original
//! afterwards clone it explicitly.

use crate::{Error, Rect, Result};

/// Owned (C, H, W) tensor of `f32` values.
///
/// # Example
///
/// ```rust
/// use gmml_core::Tensor;
///
/// let t = Tensor::filled(3, 4, 5, 0.5);
/// assert_eq!(t.shape(), [3, 4, 5]);
/// assert_eq!(t.plane(1).len(), 20);
/// ```
#[derive(Clone, PartialEq)]
pub struct Tensor {
    data: Vec<f32>,
    channels: usize,
    height: usize,
    width: usize,
}

impl Tensor {
    /// Creates a tensor filled with zeros.
    pub fn new(channels: usize, height: usize, width: usize) -> Self {
        Self::filled(channels, height, width, 0.0)
    }

    /// Creates a tensor filled with `value`.
    pub fn filled(channels: usize, height: usize, width: usize, value: f32) -> Self {
        Self {
            data: vec![value; channels * height * width],
            channels,
            height,
            width,
        }
    }

    /// Creates a tensor from existing planar data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidShape`] if `data.len() != channels * height * width`.
    ///
    /// ```rust
    /// use gmml_core::Tensor;
    ///
    /// assert!(Tensor::from_data(3, 2, 2, vec![0.0; 12]).is_ok());
    /// assert!(Tensor::from_data(3, 2, 2, vec![0.0; 11]).is_err());
    /// ```
    pub fn from_data(channels: usize, height: usize, width: usize, data: Vec<f32>) -> Result<Self> {
        let expected = channels * height * width;
        if data.len() != expected {
            return Err(Error::invalid_shape(
                [channels, height, width],
                format!("expected {} elements, got {}", expected, data.len()),
            ));
        }
        Ok(Self {
            data,
            channels,
            height,
            width,
        })
    }

    /// Converts interleaved 8-bit pixels into a planar tensor in `[0, 1]`.
    ///
    /// `pixels` holds `width * height * channels` bytes in row-major,
    /// channel-interleaved order (the layout decoders hand out).
    pub fn from_rgb8(width: usize, height: usize, channels: usize, pixels: &[u8]) -> Result<Self> {
        let expected = width * height * channels;
        if pixels.len() != expected {
            return Err(Error::invalid_shape(
                [channels, height, width],
                format!("expected {} bytes, got {}", expected, pixels.len()),
            ));
        }

        let plane = width * height;
        let mut data = vec![0.0f32; expected];
        for (i, px) in pixels.chunks_exact(channels.max(1)).enumerate() {
            for (c, &v) in px.iter().enumerate() {
                data[c * plane + i] = v as f32 / 255.0;
            }
        }

        Self::from_data(channels, height, width, data)
    }

    /// Converts to interleaved 8-bit pixels, clamping to `[0, 1]` first.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let plane = self.pixel_count();
        let mut out = Vec::with_capacity(self.data.len());
        for i in 0..plane {
            for c in 0..self.channels {
                let v = self.data[c * plane + i].clamp(0.0, 1.0);
                out.push((v * 255.0).round() as u8);
            }
        }
        out
    }

    /// Returns the shape as `[channels, height, width]`.
    #[inline]
    pub fn shape(&self) -> [usize; 3] {
        [self.channels, self.height, self.width]
    }

    /// Returns the number of channels.
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns the height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of spatial locations (`height * width`).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.height * self.width
    }

    /// Returns a rectangle covering the whole spatial extent.
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// Returns `true` if any dimension is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the raw planar data.
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Returns the raw planar data mutably.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consumes the tensor, returning its planar data.
    #[inline]
    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// Returns one channel plane.
    ///
    /// # Panics
    ///
    /// Panics if `channel >= channels`.
    #[inline]
    pub fn plane(&self, channel: usize) -> &[f32] {
        let n = self.pixel_count();
        &self.data[channel * n..(channel + 1) * n]
    }

    /// Returns one channel plane mutably.
    ///
    /// # Panics
    ///
    /// Panics if `channel >= channels`.
    #[inline]
    pub fn plane_mut(&mut self, channel: usize) -> &mut [f32] {
        let n = self.pixel_count();
        &mut self.data[channel * n..(channel + 1) * n]
    }

    /// Iterates channel planes mutably.
    pub fn planes_mut(&mut self) -> std::slice::ChunksExactMut<'_, f32> {
        let n = self.pixel_count().max(1);
        self.data.chunks_exact_mut(n)
    }

    #[inline]
    fn offset(&self, channel: usize, row: usize, col: usize) -> usize {
        (channel * self.height + row) * self.width + col
    }

    /// Returns the value at (`channel`, `row`, `col`).
    ///
    /// Out-of-bounds access panics (debug-checked).
    #[inline]
    pub fn get(&self, channel: usize, row: usize, col: usize) -> f32 {
        debug_assert!(
            channel < self.channels && row < self.height && col < self.width,
            "tensor index out of bounds"
        );
        self.data[self.offset(channel, row, col)]
    }

    /// Returns the value at (`channel`, `row`, `col`), or an error if out of bounds.
    pub fn try_get(&self, channel: usize, row: usize, col: usize) -> Result<f32> {
        if channel < self.channels && row < self.height && col < self.width {
            Ok(self.get(channel, row, col))
        } else {
            Err(Error::out_of_bounds(channel, row, col, self.shape()))
        }
    }

    /// Sets the value at (`channel`, `row`, `col`).
    #[inline]
    pub fn set(&mut self, channel: usize, row: usize, col: usize, value: f32) {
        debug_assert!(
            channel < self.channels && row < self.height && col < self.width,
            "tensor index out of bounds"
        );
        let offset = self.offset(channel, row, col);
        self.data[offset] = value;
    }

    /// Fills the whole tensor with `value`.
    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    /// Applies `f` to every value in place.
    pub fn map_values<F>(&mut self, f: F)
    where
        F: Fn(f32) -> f32,
    {
        for v in &mut self.data {
            *v = f(*v);
        }
    }

    /// Returns the sum of all values.
    pub fn sum(&self) -> f64 {
        self.data.iter().map(|&v| v as f64).sum()
    }

    /// Checks that `self` and `other` have the same shape.
    pub fn ensure_same_shape(&self, other: &Tensor) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(Error::shape_mismatch(self.shape(), other.shape()));
        }
        Ok(())
    }

    fn ensure_region(&self, rect: Rect) -> Result<()> {
        if !rect.fits_in(self.height, self.width) {
            return Err(Error::invalid_region(rect, self.height, self.width));
        }
        Ok(())
    }

    /// Sets every channel inside `rect` to `value`.
    pub fn fill_rect(&mut self, rect: Rect, value: f32) -> Result<()> {
        self.fill_rect_with(rect, || value)
    }

    /// Sets every channel inside `rect` to successive values drawn from `next`.
    ///
    /// Values are drawn channel by channel, row by row.
    pub fn fill_rect_with<F>(&mut self, rect: Rect, mut next: F) -> Result<()>
    where
        F: FnMut() -> f32,
    {
        self.ensure_region(rect)?;
        for c in 0..self.channels {
            for row in rect.y..rect.bottom() {
                let start = self.offset(c, row, rect.x);
                for v in &mut self.data[start..start + rect.width] {
                    *v = next();
                }
            }
        }
        Ok(())
    }

    /// Copies `rect` from `src` into the same coordinates of `self`.
    ///
    /// # Errors
    ///
    /// Fails if the shapes differ or `rect` leaves the bounds.
    pub fn copy_rect_from(&mut self, src: &Tensor, rect: Rect) -> Result<()> {
        self.ensure_same_shape(src)?;
        self.ensure_region(rect)?;
        for c in 0..self.channels {
            for row in rect.y..rect.bottom() {
                let start = self.offset(c, row, rect.x);
                let end = start + rect.width;
                self.data[start..end].copy_from_slice(&src.data[start..end]);
            }
        }
        Ok(())
    }

    /// Copies the region `src` of this tensor to the same-sized region at `dst`.
    ///
    /// The source is snapshotted first, so overlapping regions copy the
    /// original content.
    pub fn copy_rect_within(&mut self, src: Rect, dst_x: usize, dst_y: usize) -> Result<()> {
        let dst = src.with_origin(dst_x, dst_y);
        self.ensure_region(dst)?;
        let patch = self.crop(src)?;
        for c in 0..self.channels {
            for r in 0..src.height {
                let from = (c * src.height + r) * src.width;
                let start = self.offset(c, dst.y + r, dst.x);
                self.data[start..start + src.width]
                    .copy_from_slice(&patch.data[from..from + src.width]);
            }
        }
        Ok(())
    }

    /// Returns a new tensor holding the region `rect`.
    ///
    /// ```rust
    /// use gmml_core::{Rect, Tensor};
    ///
    /// let t = Tensor::filled(3, 64, 64, 0.5);
    /// let c = t.crop(Rect::new(10, 10, 20, 30)).unwrap();
    /// assert_eq!(c.shape(), [3, 30, 20]);
    /// ```
    pub fn crop(&self, rect: Rect) -> Result<Tensor> {
        self.ensure_region(rect)?;
        let mut data = Vec::with_capacity(self.channels * rect.area());
        for c in 0..self.channels {
            for row in rect.y..rect.bottom() {
                let start = self.offset(c, row, rect.x);
                data.extend_from_slice(&self.data[start..start + rect.width]);
            }
        }
        Tensor::from_data(self.channels, rect.height, rect.width, data)
    }
}

impl std::fmt::Debug for Tensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tensor")
            .field("channels", &self.channels)
            .field("height", &self.height)
            .field("width", &self.width)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ramp(channels: usize, height: usize, width: usize) -> Tensor {
        let data = (0..channels * height * width).map(|i| i as f32).collect();
        Tensor::from_data(channels, height, width, data).unwrap()
    }

    #[test]
    fn test_tensor_new() {
        let t = Tensor::new(3, 10, 20);
        assert_eq!(t.shape(), [3, 10, 20]);
        assert_eq!(t.pixel_count(), 200);
        assert_eq!(t.data().len(), 600);
        assert_eq!(t.sum(), 0.0);
    }

    #[test]
    fn test_tensor_from_data_wrong_size() {
        let result = Tensor::from_data(3, 10, 10, vec![0.0; 10]);
        assert!(result.is_err());
    }

    #[test]
    fn test_tensor_layout_is_planar() {
        let t = ramp(2, 2, 3);
        assert_eq!(t.get(0, 0, 0), 0.0);
        assert_eq!(t.get(0, 1, 2), 5.0);
        assert_eq!(t.get(1, 0, 0), 6.0);
        assert_eq!(t.plane(1), &[6.0, 7.0, 8.0, 9.0, 10.0, 11.0]);
        assert!(t.try_get(2, 0, 0).is_err());
    }

    #[test]
    fn test_rgb8_roundtrip() {
        // 2x1 image: red, blue
        let pixels = [255u8, 0, 0, 0, 0, 255];
        let t = Tensor::from_rgb8(2, 1, 3, &pixels).unwrap();
        assert_eq!(t.shape(), [3, 1, 2]);
        assert_relative_eq!(t.get(0, 0, 0), 1.0);
        assert_relative_eq!(t.get(2, 0, 1), 1.0);
        assert_relative_eq!(t.get(0, 0, 1), 0.0);
        assert_eq!(t.to_rgb8(), pixels.to_vec());
    }

    #[test]
    fn test_fill_rect() {
        let mut t = Tensor::new(3, 8, 8);
        t.fill_rect(Rect::new(2, 4, 3, 2), 1.0).unwrap();
        assert_eq!(t.sum(), 3.0 * 6.0);
        assert_eq!(t.get(1, 4, 2), 1.0);
        assert_eq!(t.get(1, 3, 2), 0.0);
        assert!(t.fill_rect(Rect::new(6, 6, 4, 4), 1.0).is_err());
    }

    #[test]
    fn test_copy_rect_from() {
        let src = ramp(3, 6, 6);
        let mut dst = Tensor::new(3, 6, 6);
        let rect = Rect::new(1, 2, 3, 2);
        dst.copy_rect_from(&src, rect).unwrap();
        for (col, row) in rect.iter_coords() {
            for c in 0..3 {
                assert_eq!(dst.get(c, row, col), src.get(c, row, col));
            }
        }
        assert_eq!(dst.get(0, 0, 0), 0.0);
        assert!(dst.copy_rect_from(&Tensor::new(3, 5, 6), rect).is_err());
    }

    #[test]
    fn test_copy_rect_within_overlapping() {
        let mut t = ramp(1, 1, 6);
        // copy [0, 1, 2] onto columns 1..4
        t.copy_rect_within(Rect::new(0, 0, 3, 1), 1, 0).unwrap();
        assert_eq!(t.data(), &[0.0, 0.0, 1.0, 2.0, 4.0, 5.0]);
    }

    #[test]
    fn test_crop() {
        let t = ramp(2, 4, 4);
        let c = t.crop(Rect::new(1, 1, 2, 2)).unwrap();
        assert_eq!(c.shape(), [2, 2, 2]);
        assert_eq!(c.get(0, 0, 0), t.get(0, 1, 1));
        assert_eq!(c.get(1, 1, 1), t.get(1, 2, 2));
        assert!(t.crop(Rect::new(3, 3, 2, 2)).is_err());
    }

    #[test]
    fn test_clone_is_independent() {
        let a = Tensor::filled(3, 4, 4, 1.0);
        let mut b = a.clone();
        b.set(0, 0, 0, 0.0);
        assert_eq!(a.get(0, 0, 0), 1.0);
        assert_eq!(b.get(0, 0, 0), 0.0);
    }
}
