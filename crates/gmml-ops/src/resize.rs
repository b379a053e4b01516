//! Tensor resize and resampling operations.
//!
//! Separable two-pass resampling (horizontal then vertical) applied to each
//! channel plane. Downscaling widens the filter support by the scale factor,
//! which antialiases the result.
//!
//! # Filters
//!
//! - [`Filter::Nearest`] - Fastest, no interpolation (blocky)
//! - [`Filter::Bilinear`] - Linear interpolation (smooth but blurry)
//! - [`Filter::Bicubic`] - Keys cubic with `a = -0.5`, the crop default
//! - [`Filter::Lanczos3`] - High-quality sinc-based
//!
//! # Example
//!
//! ```rust
//! use gmml_core::Tensor;
//! use gmml_ops::resize::{resize, Filter};
//!
//! let src = Tensor::filled(3, 64, 64, 0.5);
//! let dst = resize(&src, 224, 224, Filter::Bicubic).unwrap();
//! assert_eq!(dst.shape(), [3, 224, 224]);
//! ```

use crate::planes::map_planes;
use crate::{OpsError, OpsResult};
use gmml_core::Tensor;
use tracing::trace;

/// Resampling filter for resize operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    /// Nearest-neighbor (fastest, no interpolation).
    Nearest,
    /// Bilinear interpolation (smooth, fast).
    Bilinear,
    /// Bicubic interpolation (sharper than bilinear).
    #[default]
    Bicubic,
    /// Lanczos-3 (high quality, best for downscaling).
    Lanczos3,
}

impl Filter {
    /// Returns the support radius for this filter.
    #[inline]
    pub fn support(&self) -> f32 {
        match self {
            Filter::Nearest => 0.5,
            Filter::Bilinear => 1.0,
            Filter::Bicubic => 2.0,
            Filter::Lanczos3 => 3.0,
        }
    }

    /// Evaluates the filter kernel at position x.
    #[inline]
    pub fn weight(&self, x: f32) -> f32 {
        match self {
            Filter::Nearest => nearest_weight(x),
            Filter::Bilinear => bilinear_weight(x),
            Filter::Bicubic => bicubic_weight(x),
            Filter::Lanczos3 => lanczos_weight(x, 3.0),
        }
    }
}

#[inline]
fn nearest_weight(x: f32) -> f32 {
    if (-0.5..0.5).contains(&x) { 1.0 } else { 0.0 }
}

#[inline]
fn bilinear_weight(x: f32) -> f32 {
    let ax = x.abs();
    if ax < 1.0 { 1.0 - ax } else { 0.0 }
}

/// Keys cubic convolution, `a = -0.5`.
#[inline]
fn bicubic_weight(x: f32) -> f32 {
    const A: f32 = -0.5;

    let ax = x.abs();
    if ax < 1.0 {
        ((A + 2.0) * ax - (A + 3.0)) * ax * ax + 1.0
    } else if ax < 2.0 {
        ((A * ax - 5.0 * A) * ax + 8.0 * A) * ax - 4.0 * A
    } else {
        0.0
    }
}

#[inline]
fn lanczos_weight(x: f32, a: f32) -> f32 {
    let ax = x.abs();
    if ax < 1e-8 {
        1.0
    } else if ax < a {
        let pi_x = std::f32::consts::PI * ax;
        let pi_x_a = pi_x / a;
        (pi_x.sin() / pi_x) * (pi_x_a.sin() / pi_x_a)
    } else {
        0.0
    }
}

/// Resizes every channel of `src` to `dst_h` x `dst_w`.
///
/// # Errors
///
/// Returns [`OpsError::InvalidDimensions`] if the source is empty or the
/// destination size is zero.
pub fn resize(src: &Tensor, dst_h: usize, dst_w: usize, filter: Filter) -> OpsResult<Tensor> {
    let [channels, src_h, src_w] = src.shape();
    trace!(channels, src_h, src_w, dst_h, dst_w, ?filter, "resize");

    if src_w == 0 || src_h == 0 {
        return Err(OpsError::InvalidDimensions(
            "source size must be > 0".into(),
        ));
    }
    if dst_w == 0 || dst_h == 0 {
        return Err(OpsError::InvalidDimensions(
            "destination size must be > 0".into(),
        ));
    }

    map_planes(src, dst_h, dst_w, |plane| {
        let temp = resize_horizontal(plane, src_w, src_h, dst_w, filter);
        resize_vertical(&temp, dst_w, src_h, dst_h, filter)
    })
}

/// Horizontal resize pass over one plane.
fn resize_horizontal(src: &[f32], src_w: usize, src_h: usize, dst_w: usize, filter: Filter) -> Vec<f32> {
    let mut dst = vec![0.0f32; dst_w * src_h];
    let scale = src_w as f32 / dst_w as f32;
    let support = filter.support() * scale.max(1.0);

    for y in 0..src_h {
        let row = &src[y * src_w..(y + 1) * src_w];
        for x in 0..dst_w {
            // Map destination x to source x
            let center = (x as f32 + 0.5) * scale - 0.5;
            let left = ((center - support).floor() as isize).max(0) as usize;
            let right = ((center + support).ceil().max(0.0) as usize).min(src_w - 1);

            let mut sum = 0.0f32;
            let mut weight_sum = 0.0f32;
            for (sx, &v) in row.iter().enumerate().take(right + 1).skip(left) {
                let w = filter.weight((sx as f32 - center) / scale.max(1.0));
                weight_sum += w;
                sum += v * w;
            }

            if weight_sum != 0.0 {
                dst[y * dst_w + x] = sum / weight_sum;
            }
        }
    }

    dst
}

/// Vertical resize pass over one plane.
fn resize_vertical(src: &[f32], src_w: usize, src_h: usize, dst_h: usize, filter: Filter) -> Vec<f32> {
    let mut dst = vec![0.0f32; src_w * dst_h];
    let scale = src_h as f32 / dst_h as f32;
    let support = filter.support() * scale.max(1.0);

    for y in 0..dst_h {
        // Map destination y to source y
        let center = (y as f32 + 0.5) * scale - 0.5;
        let top = ((center - support).floor() as isize).max(0) as usize;
        let bottom = ((center + support).ceil().max(0.0) as usize).min(src_h - 1);

        let weights: Vec<f32> = (top..=bottom)
            .map(|sy| filter.weight((sy as f32 - center) / scale.max(1.0)))
            .collect();
        let weight_sum: f32 = weights.iter().sum();
        if weight_sum == 0.0 {
            continue;
        }

        for x in 0..src_w {
            let sum: f32 = (top..=bottom)
                .zip(&weights)
                .map(|(sy, &w)| src[sy * src_w + x] * w)
                .sum();
            dst[y * src_w + x] = sum / weight_sum;
        }
    }

    dst
}
