//! Crop and flip transforms that report the parameters they applied.
//!
//! Both wrap the deterministic primitives in `gmml_ops::transform`, so the
//! reported [`Rect`] or flag reproduces the output when applied by hand.

use crate::AugmentResult;
use gmml_core::{Rect, Tensor};
use gmml_ops::transform::{flip_h, resized_crop};
use gmml_ops::Filter;
use rand::Rng;
use tracing::trace;

/// Default area scale range for a random resized crop.
pub const DEFAULT_SCALE: (f64, f64) = (0.08, 1.0);
/// Default aspect ratio range for a random resized crop.
pub const DEFAULT_RATIO: (f64, f64) = (3.0 / 4.0, 4.0 / 3.0);

const CROP_ATTEMPTS: usize = 10;

/// Random resized crop that returns the crop rectangle with the image.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomResizedCropWithParams {
    /// Output side length.
    pub size: usize,
    /// Range of the crop area as a fraction of the image area.
    pub scale: (f64, f64),
    /// Range of the crop aspect ratio (width / height).
    pub ratio: (f64, f64),
    /// Resampling filter.
    pub filter: Filter,
}

impl Default for RandomResizedCropWithParams {
    fn default() -> Self {
        Self::new(224, DEFAULT_SCALE)
    }
}

impl RandomResizedCropWithParams {
    /// Square crop of `size` with the given area scale and default ratio.
    pub fn new(size: usize, scale: (f64, f64)) -> Self {
        Self {
            size,
            scale,
            ratio: DEFAULT_RATIO,
            filter: Filter::Bicubic,
        }
    }

    /// Sets the aspect ratio range.
    pub fn with_ratio(mut self, ratio: (f64, f64)) -> Self {
        self.ratio = ratio;
        self
    }

    /// Sets the resampling filter.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    /// Samples a crop rectangle for an image of `height` x `width`.
    ///
    /// Tries ten times to find a rectangle with a random area and
    /// log-uniform aspect ratio that fits; otherwise falls back to the
    /// largest centered crop whose ratio is within range.
    pub fn get_params<R: Rng + ?Sized>(&self, height: usize, width: usize, rng: &mut R) -> Rect {
        let area = (height * width) as f64;
        let (log_lo, log_hi) = (self.ratio.0.ln(), self.ratio.1.ln());

        for _ in 0..CROP_ATTEMPTS {
            let target_area = area * uniform(rng, self.scale.0, self.scale.1);
            let aspect = uniform(rng, log_lo, log_hi).exp();

            let w = (target_area * aspect).sqrt().round() as usize;
            let h = (target_area / aspect).sqrt().round() as usize;
            if w > 0 && h > 0 && w <= width && h <= height {
                let y = rng.gen_range(0..=height - h);
                let x = rng.gen_range(0..=width - w);
                return Rect::new(x, y, w, h);
            }
        }

        // Central crop
        let in_ratio = width as f64 / height as f64;
        let (w, h) = if in_ratio < self.ratio.0 {
            (width, (width as f64 / self.ratio.0).round() as usize)
        } else if in_ratio > self.ratio.1 {
            ((height as f64 * self.ratio.1).round() as usize, height)
        } else {
            (width, height)
        };
        let (w, h) = (w.clamp(1, width.max(1)), h.clamp(1, height.max(1)));
        Rect::new(centered(width, w), centered(height, h), w, h)
    }

    /// Crops and resizes `image`, returning the output and the crop rectangle.
    ///
    /// The output is clamped to `[0, 1]`, since bicubic resampling overshoots
    /// around sharp edges.
    pub fn apply<R: Rng + ?Sized>(&self, image: &Tensor, rng: &mut R) -> AugmentResult<(Tensor, Rect)> {
        let rect = self.get_params(image.height(), image.width(), rng);
        trace!(%rect, size = self.size, "random resized crop");
        let mut out = resized_crop(image, rect, self.size, self.size, self.filter)?;
        out.map_values(|v| v.clamp(0.0, 1.0));
        Ok((out, rect))
    }
}

/// Horizontal flip that reports whether it flipped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomHorizontalFlipWithFlag {
    /// Flip probability.
    pub p: f64,
}

impl Default for RandomHorizontalFlipWithFlag {
    fn default() -> Self {
        Self { p: 0.5 }
    }
}

impl RandomHorizontalFlipWithFlag {
    /// Flip with probability `p`.
    pub fn new(p: f64) -> Self {
        Self { p }
    }

    /// Returns the possibly flipped image and whether it was flipped.
    pub fn apply<R: Rng + ?Sized>(&self, image: Tensor, rng: &mut R) -> (Tensor, bool) {
        let flipped = rng.r#gen::<f64>() < self.p;
        if flipped {
            (flip_h(&image), true)
        } else {
            (image, false)
        }
    }
}

/// Offset that centers `inner` in `outer`, halves rounded to even.
fn centered(outer: usize, inner: usize) -> usize {
    ((outer - inner) as f64 / 2.0).round_ties_even() as usize
}

fn uniform<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    if hi > lo { rng.gen_range(lo..hi) } else { lo }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_params_fit_image() {
        let crop = RandomResizedCropWithParams::new(224, (0.4, 1.0));
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..500 {
            let r = crop.get_params(300, 500, &mut rng);
            assert!(r.fits_in(300, 500), "{}", r);
            assert!(!r.is_empty());
        }
    }

    #[test]
    fn test_central_fallback() {
        // Scale above 1 never fits; the fallback clamps to the ratio range
        let crop = RandomResizedCropWithParams::new(32, (2.0, 3.0));
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(crop.get_params(100, 100, &mut rng), Rect::new(0, 0, 100, 100));
        // 267 / 2 = 133.5 rounds up to 134, 265 / 2 = 132.5 rounds down to 132
        assert_eq!(crop.get_params(100, 400, &mut rng), Rect::new(134, 0, 133, 100));
        assert_eq!(crop.get_params(100, 398, &mut rng), Rect::new(132, 0, 133, 100));
        assert_eq!(crop.get_params(400, 100, &mut rng), Rect::new(0, 134, 100, 133));
    }

    #[test]
    fn test_apply_shape() {
        let crop = RandomResizedCropWithParams::new(24, (0.05, 0.4));
        let mut rng = StdRng::seed_from_u64(4);
        let (out, rect) = crop.apply(&Tensor::filled(3, 80, 60, 0.3), &mut rng).unwrap();
        assert_eq!(out.shape(), [3, 24, 24]);
        assert!(rect.fits_in(80, 60));
    }

    #[test]
    fn test_upscaled_edge_stays_in_range() {
        // Hard 0/1 step; bicubic rings past both levels before clamping
        let (h, w) = (8, 8);
        let data = (0..h * w).map(|i| if i % w < w / 2 { 0.0 } else { 1.0 }).collect();
        let src = Tensor::from_data(1, h, w, data).unwrap();
        let crop = RandomResizedCropWithParams::new(40, (1.0, 1.0)).with_ratio((1.0, 1.0));
        let mut rng = StdRng::seed_from_u64(2);
        let (out, rect) = crop.apply(&src, &mut rng).unwrap();
        assert_eq!(rect, Rect::new(0, 0, 8, 8));
        assert!(out.data().iter().all(|v| (0.0..=1.0).contains(v)));
        assert!(out.data().iter().any(|&v| v == 0.0));
        assert!(out.data().iter().any(|&v| v == 1.0));
    }

    #[test]
    fn test_flip_flag() {
        let src = Tensor::from_data(1, 1, 3, vec![1.0, 2.0, 3.0]).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let (out, flipped) = RandomHorizontalFlipWithFlag::new(1.0).apply(src.clone(), &mut rng);
        assert!(flipped);
        assert_eq!(out.data(), &[3.0, 2.0, 1.0]);
        let (out, flipped) = RandomHorizontalFlipWithFlag::new(0.0).apply(src.clone(), &mut rng);
        assert!(!flipped);
        assert_eq!(out, src);
    }
}
