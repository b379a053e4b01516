//! Gaussian filtering.
//!
//! Blur is separable: a normalized 1D [`Kernel`] is run horizontally, then
//! vertically, over every channel plane with clamp-to-edge sampling.
//!
//! # Example
//!
//! ```rust
//! use gmml_core::Tensor;
//! use gmml_ops::filter::gaussian_blur;
//!
//! let src = Tensor::filled(3, 16, 16, 0.5);
//! let blurred = gaussian_blur(&src, 1.5).unwrap();
//! assert_eq!(blurred.shape(), src.shape());
//! ```

use crate::planes::map_planes;
use crate::{OpsError, OpsResult};
use gmml_core::Tensor;
use tracing::trace;

/// One-dimensional convolution kernel.
#[derive(Debug, Clone)]
pub struct Kernel {
    /// Kernel weights.
    pub data: Vec<f32>,
}

impl Kernel {
    /// Creates a kernel from weights. The length must be odd.
    pub fn new(data: Vec<f32>) -> OpsResult<Self> {
        if data.len() % 2 == 0 {
            return Err(OpsError::InvalidParameter(
                "kernel length must be odd".into(),
            ));
        }
        Ok(Self { data })
    }

    /// Creates a normalized Gaussian kernel spanning three sigmas each side.
    ///
    /// ```rust
    /// use gmml_ops::filter::Kernel;
    ///
    /// let k = Kernel::gaussian(1.0);
    /// assert_eq!(k.data.len(), 7);
    /// assert!((k.data.iter().sum::<f32>() - 1.0).abs() < 1e-6);
    /// ```
    pub fn gaussian(sigma: f32) -> Self {
        let radius = (3.0 * sigma).ceil().max(1.0) as i32;
        let sigma2 = 2.0 * sigma * sigma;

        let mut data: Vec<f32> = (-radius..=radius)
            .map(|x| (-((x * x) as f32) / sigma2).exp())
            .collect();

        let sum: f32 = data.iter().sum();
        for w in &mut data {
            *w /= sum;
        }

        Self { data }
    }

    /// Returns the kernel radius (half-size).
    #[inline]
    pub fn radius(&self) -> usize {
        self.data.len() / 2
    }
}

/// Blurs every channel with a Gaussian of standard deviation `sigma`.
///
/// # Errors
///
/// Returns [`OpsError::InvalidParameter`] if `sigma` is not positive and finite.
pub fn gaussian_blur(src: &Tensor, sigma: f32) -> OpsResult<Tensor> {
    let [channels, height, width] = src.shape();
    trace!(channels, height, width, sigma, "gaussian_blur");

    if !(sigma.is_finite() && sigma > 0.0) {
        return Err(OpsError::InvalidParameter(format!(
            "blur sigma must be positive, got {}",
            sigma
        )));
    }
    if src.is_empty() {
        return Ok(src.clone());
    }

    let kernel = Kernel::gaussian(sigma);
    map_planes(src, height, width, |plane| {
        let temp = convolve_rows(plane, width, height, &kernel);
        convolve_cols(&temp, width, height, &kernel)
    })
}

fn convolve_rows(src: &[f32], width: usize, height: usize, kernel: &Kernel) -> Vec<f32> {
    let r = kernel.radius() as isize;
    let mut dst = vec![0.0f32; src.len()];
    for y in 0..height {
        let row = &src[y * width..(y + 1) * width];
        for x in 0..width {
            let mut sum = 0.0f32;
            for (k, &w) in kernel.data.iter().enumerate() {
                let sx = (x as isize + k as isize - r).clamp(0, width as isize - 1) as usize;
                sum += row[sx] * w;
            }
            dst[y * width + x] = sum;
        }
    }
    dst
}

fn convolve_cols(src: &[f32], width: usize, height: usize, kernel: &Kernel) -> Vec<f32> {
    let r = kernel.radius() as isize;
    let mut dst = vec![0.0f32; src.len()];
    for y in 0..height {
        for (k, &w) in kernel.data.iter().enumerate() {
            let sy = (y as isize + k as isize - r).clamp(0, height as isize - 1) as usize;
            let src_row = &src[sy * width..(sy + 1) * width];
            let dst_row = &mut dst[y * width..(y + 1) * width];
            for (d, &s) in dst_row.iter_mut().zip(src_row) {
                *d += s * w;
            }
        }
    }
    dst
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_kernel_is_normalized_and_symmetric() {
        let k = Kernel::gaussian(2.0);
        assert_eq!(k.radius(), 6);
        assert_relative_eq!(k.data.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(k.data[0], k.data[12]);
        assert!(Kernel::new(vec![0.5, 0.5]).is_err());
    }

    #[test]
    fn test_blur_preserves_constant() {
        let src = Tensor::filled(3, 12, 9, 0.7);
        let dst = gaussian_blur(&src, 1.3).unwrap();
        for &v in dst.data() {
            assert_relative_eq!(v, 0.7, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_blur_spreads_impulse() {
        let mut src = Tensor::new(1, 11, 11);
        src.set(0, 5, 5, 1.0);
        let dst = gaussian_blur(&src, 1.0).unwrap();
        assert!(dst.get(0, 5, 5) < 1.0);
        assert!(dst.get(0, 5, 6) > 0.0);
        assert_relative_eq!(dst.get(0, 4, 5), dst.get(0, 6, 5), epsilon = 1e-6);
        assert_relative_eq!(dst.sum(), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_blur_rejects_bad_sigma() {
        let src = Tensor::new(3, 4, 4);
        assert!(gaussian_blur(&src, 0.0).is_err());
        assert!(gaussian_blur(&src, f32::NAN).is_err());
    }
}
