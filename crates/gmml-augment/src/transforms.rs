//! Random view transforms and their composition.
//!
//! Every transform implements [`ViewTransform`]: it consumes a tensor,
//! draws whatever it needs from the caller's generator and returns the
//! new tensor. [`Compose`] chains them in order.
//!
//! ```rust
//! use gmml_augment::transforms::{Compose, GaussianBlur, RandomHorizontalFlip, ViewTransform};
//! use gmml_core::Tensor;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let chain = Compose::new()
//!     .then(RandomHorizontalFlip::new(0.5))
//!     .then(GaussianBlur::new(1.0));
//! let mut rng = StdRng::seed_from_u64(0);
//! let out = chain.apply(Tensor::filled(3, 32, 32, 0.5), &mut rng).unwrap();
//! assert_eq!(out.shape(), [3, 32, 32]);
//! ```

use crate::params::{RandomHorizontalFlipWithFlag, RandomResizedCropWithParams};
use crate::AugmentResult;
use gmml_core::Tensor;
use gmml_ops::color::{self, IMAGENET_MEAN, IMAGENET_STD};
use gmml_ops::filter::gaussian_blur;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use std::fmt;
use tracing::trace;

/// A random tensor-to-tensor transform.
pub trait ViewTransform: Send + Sync {
    /// Applies the transform.
    fn apply(&self, image: Tensor, rng: &mut dyn RngCore) -> AugmentResult<Tensor>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Transforms applied in sequence.
#[derive(Default)]
pub struct Compose {
    steps: Vec<Box<dyn ViewTransform>>,
}

impl Compose {
    /// Empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a transform.
    pub fn then<T: ViewTransform + 'static>(mut self, step: T) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Appends every step of `other`.
    pub fn extend(mut self, other: Compose) -> Self {
        self.steps.extend(other.steps);
        self
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` if the chain has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step names in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }
}

impl fmt::Debug for Compose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl ViewTransform for Compose {
    fn apply(&self, image: Tensor, rng: &mut dyn RngCore) -> AugmentResult<Tensor> {
        self.steps.iter().try_fold(image, |t, step| step.apply(t, rng))
    }

    fn name(&self) -> &'static str {
        "compose"
    }
}

/// Random resized crop to a square output.
#[derive(Debug, Clone)]
pub struct RandomResizedCrop(pub RandomResizedCropWithParams);

impl RandomResizedCrop {
    /// Crop of `size` with area `scale`.
    pub fn new(size: usize, scale: (f64, f64)) -> Self {
        Self(RandomResizedCropWithParams::new(size, scale))
    }
}

impl ViewTransform for RandomResizedCrop {
    fn apply(&self, image: Tensor, rng: &mut dyn RngCore) -> AugmentResult<Tensor> {
        let (out, _) = self.0.apply(&image, rng)?;
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "random_resized_crop"
    }
}

/// Horizontal flip with probability `p`.
#[derive(Debug, Clone, Copy)]
pub struct RandomHorizontalFlip(pub RandomHorizontalFlipWithFlag);

impl RandomHorizontalFlip {
    /// Flip with probability `p`.
    pub fn new(p: f64) -> Self {
        Self(RandomHorizontalFlipWithFlag::new(p))
    }
}

impl ViewTransform for RandomHorizontalFlip {
    fn apply(&self, image: Tensor, rng: &mut dyn RngCore) -> AugmentResult<Tensor> {
        Ok(self.0.apply(image, rng).0)
    }

    fn name(&self) -> &'static str {
        "random_horizontal_flip"
    }
}

/// Applies the wrapped transform with probability `p`.
pub struct RandomApply {
    inner: Box<dyn ViewTransform>,
    p: f64,
}

impl RandomApply {
    /// Wraps `inner`.
    pub fn new<T: ViewTransform + 'static>(inner: T, p: f64) -> Self {
        Self {
            inner: Box::new(inner),
            p,
        }
    }
}

impl ViewTransform for RandomApply {
    fn apply(&self, image: Tensor, rng: &mut dyn RngCore) -> AugmentResult<Tensor> {
        if rng.r#gen::<f64>() < self.p {
            self.inner.apply(image, rng)
        } else {
            Ok(image)
        }
    }

    fn name(&self) -> &'static str {
        "random_apply"
    }
}

/// Random brightness, contrast, saturation and hue, applied in random order.
///
/// Factors are drawn from `[max(0, 1 - x), 1 + x]`; the hue shift from
/// `[-hue, hue]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorJitter {
    /// Brightness jitter.
    pub brightness: f32,
    /// Contrast jitter.
    pub contrast: f32,
    /// Saturation jitter.
    pub saturation: f32,
    /// Hue jitter, at most 0.5.
    pub hue: f32,
}

impl ColorJitter {
    /// Creates a jitter.
    pub fn new(brightness: f32, contrast: f32, saturation: f32, hue: f32) -> Self {
        Self {
            brightness,
            contrast,
            saturation,
            hue: hue.clamp(0.0, 0.5),
        }
    }
}

#[derive(Clone, Copy)]
enum Jitter {
    Brightness,
    Contrast,
    Saturation,
    Hue,
}

fn factor(rng: &mut dyn RngCore, amount: f32) -> f32 {
    let lo = (1.0 - amount).max(0.0);
    let hi = 1.0 + amount;
    if hi > lo { rng.gen_range(lo..=hi) } else { 1.0 }
}

impl ViewTransform for ColorJitter {
    fn apply(&self, image: Tensor, rng: &mut dyn RngCore) -> AugmentResult<Tensor> {
        let mut order = [Jitter::Brightness, Jitter::Contrast, Jitter::Saturation, Jitter::Hue];
        order.shuffle(rng);
        let mut t = image;
        for step in order {
            t = match step {
                Jitter::Brightness if self.brightness > 0.0 => {
                    color::adjust_brightness(t, factor(rng, self.brightness))?
                }
                Jitter::Contrast if self.contrast > 0.0 => {
                    color::adjust_contrast(t, factor(rng, self.contrast))?
                }
                Jitter::Saturation if self.saturation > 0.0 => {
                    color::adjust_saturation(t, factor(rng, self.saturation))?
                }
                Jitter::Hue if self.hue > 0.0 => {
                    color::adjust_hue(t, rng.gen_range(-self.hue..=self.hue))?
                }
                _ => t,
            };
        }
        Ok(t)
    }

    fn name(&self) -> &'static str {
        "color_jitter"
    }
}

/// Converts to grayscale with probability `p`, keeping the channel count.
#[derive(Debug, Clone, Copy)]
pub struct RandomGrayscale {
    /// Probability.
    pub p: f64,
}

impl RandomGrayscale {
    /// Grayscale with probability `p`.
    pub fn new(p: f64) -> Self {
        Self { p }
    }
}

impl ViewTransform for RandomGrayscale {
    fn apply(&self, image: Tensor, rng: &mut dyn RngCore) -> AugmentResult<Tensor> {
        if rng.r#gen::<f64>() < self.p && image.channels() == 3 {
            Ok(color::to_grayscale(image, 3)?)
        } else {
            Ok(image)
        }
    }

    fn name(&self) -> &'static str {
        "random_grayscale"
    }
}

/// Gaussian blur with a random sigma, applied with probability `p`.
#[derive(Debug, Clone, Copy)]
pub struct GaussianBlur {
    /// Probability.
    pub p: f64,
    /// Smallest sigma.
    pub radius_min: f32,
    /// Largest sigma.
    pub radius_max: f32,
}

impl GaussianBlur {
    /// Blur with probability `p` and sigma in `[0.1, 2.0]`.
    pub fn new(p: f64) -> Self {
        Self {
            p,
            radius_min: 0.1,
            radius_max: 2.0,
        }
    }
}

impl ViewTransform for GaussianBlur {
    fn apply(&self, image: Tensor, rng: &mut dyn RngCore) -> AugmentResult<Tensor> {
        if rng.r#gen::<f64>() > self.p {
            return Ok(image);
        }
        let sigma = if self.radius_max > self.radius_min {
            rng.gen_range(self.radius_min..=self.radius_max)
        } else {
            self.radius_min
        };
        trace!(sigma, "gaussian blur");
        Ok(gaussian_blur(&image, sigma)?)
    }

    fn name(&self) -> &'static str {
        "gaussian_blur"
    }
}

/// Solarization with probability `p`.
#[derive(Debug, Clone, Copy)]
pub struct Solarization {
    /// Probability.
    pub p: f64,
    /// Values at or above this are inverted.
    pub threshold: f32,
}

impl Solarization {
    /// Solarize at mid-level with probability `p`.
    pub fn new(p: f64) -> Self {
        Self { p, threshold: 0.5 }
    }
}

impl ViewTransform for Solarization {
    fn apply(&self, image: Tensor, rng: &mut dyn RngCore) -> AugmentResult<Tensor> {
        if rng.r#gen::<f64>() < self.p {
            Ok(color::solarize(image, self.threshold))
        } else {
            Ok(image)
        }
    }

    fn name(&self) -> &'static str {
        "solarization"
    }
}

/// Per-channel normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalize {
    /// Channel means.
    pub mean: Vec<f32>,
    /// Channel standard deviations.
    pub std: Vec<f32>,
}

impl Normalize {
    /// ImageNet statistics.
    pub fn imagenet() -> Self {
        Self {
            mean: IMAGENET_MEAN.to_vec(),
            std: IMAGENET_STD.to_vec(),
        }
    }
}

impl ViewTransform for Normalize {
    fn apply(&self, image: Tensor, _rng: &mut dyn RngCore) -> AugmentResult<Tensor> {
        Ok(color::normalize(image, &self.mean, &self.std)?)
    }

    fn name(&self) -> &'static str {
        "normalize"
    }
}
