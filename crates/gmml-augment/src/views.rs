//! Multi-view augmentation pipeline.
//!
//! Each sample yields two global views and `local_crops_number` local
//! views. All views share the flip, color jitter and grayscale chain; the
//! views then differ in blur and solarization:
//!
//! | view     | blur p | solarize p |
//! |----------|--------|------------|
//! | global 1 | 1.0    | -          |
//! | global 2 | 0.1    | 0.2        |
//! | local    | 0.5    | -          |
//!
//! When `drop_perc > 0` the two global views are also corrupted by the
//! [`PatchDropper`]; the clean views stay untouched.

use crate::config::AugmentConfig;
use crate::dropper::PatchDropper;
use crate::transforms::{
    ColorJitter, Compose, GaussianBlur, Normalize, RandomApply, RandomGrayscale,
    RandomHorizontalFlip, RandomResizedCrop, Solarization, ViewTransform,
};
use crate::AugmentResult;
use gmml_core::{Mask, Tensor};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::debug;

/// Views produced for one sample.
///
/// All three vectors have `2 + K` entries. `corrupted` and `masks` hold
/// `Some` for the two global views when corruption is enabled and `None`
/// everywhere else.
#[derive(Debug, Clone)]
pub struct ViewBundle {
    /// Clean views, global first.
    pub clean: Vec<Tensor>,
    /// Corrupted global views.
    pub corrupted: Vec<Option<Tensor>>,
    /// Masks of the corrupted global views.
    pub masks: Vec<Option<Mask>>,
}

impl ViewBundle {
    /// Number of views.
    pub fn len(&self) -> usize {
        self.clean.len()
    }

    /// Returns `true` if there are no views.
    pub fn is_empty(&self) -> bool {
        self.clean.is_empty()
    }
}

fn flip_and_color_jitter() -> Compose {
    Compose::new()
        .then(RandomHorizontalFlip::new(0.5))
        .then(RandomApply::new(ColorJitter::new(0.4, 0.4, 0.2, 0.1), 0.8))
        .then(RandomGrayscale::new(0.2))
}

/// The multi-view pipeline.
#[derive(Debug)]
pub struct DataAugmentation {
    config: AugmentConfig,
    global1: Compose,
    global2: Compose,
    local: Compose,
    dropper: Option<PatchDropper>,
}

impl DataAugmentation {
    /// Validates `config` and builds the view chains.
    pub fn new(config: AugmentConfig) -> AugmentResult<Self> {
        config.validate()?;

        let global_crop = || RandomResizedCrop::new(config.global_crop_size, config.global_crops_scale);
        let global1 = Compose::new()
            .then(global_crop())
            .extend(flip_and_color_jitter())
            .then(GaussianBlur::new(1.0))
            .then(Normalize::imagenet());
        let global2 = Compose::new()
            .then(global_crop())
            .extend(flip_and_color_jitter())
            .then(GaussianBlur::new(0.1))
            .then(Solarization::new(0.2))
            .then(Normalize::imagenet());
        let local = Compose::new()
            .then(RandomResizedCrop::new(config.local_crop_size, config.local_crops_scale))
            .extend(flip_and_color_jitter())
            .then(GaussianBlur::new(0.5))
            .then(Normalize::imagenet());

        let dropper = if config.corruption_enabled() {
            Some(PatchDropper::new(
                config.drop_type.clone(),
                config.drop_perc,
                config.drop_align,
                config.max_block_fraction,
            )?)
        } else {
            None
        };

        debug!(
            local = config.local_crops_number,
            corrupt = dropper.is_some(),
            "built augmentation pipeline"
        );
        Ok(Self {
            config,
            global1,
            global2,
            local,
            dropper,
        })
    }

    /// The validated configuration.
    pub fn config(&self) -> &AugmentConfig {
        &self.config
    }

    /// Produces all views of `image`, a `[0, 1]` RGB tensor.
    pub fn augment(&self, image: &Tensor, rng: &mut dyn RngCore) -> AugmentResult<ViewBundle> {
        let total = self.config.total_views();
        let mut clean = Vec::with_capacity(total);
        let mut corrupted = Vec::with_capacity(total);
        let mut masks = Vec::with_capacity(total);

        for chain in [&self.global1, &self.global2] {
            let view = chain.apply(image.clone(), rng)?;
            match &self.dropper {
                Some(dropper) => {
                    let (c, m) = dropper.drop(view.clone(), None, rng)?;
                    corrupted.push(Some(c));
                    masks.push(Some(m));
                }
                None => {
                    corrupted.push(None);
                    masks.push(None);
                }
            }
            clean.push(view);
        }

        for _ in 0..self.config.local_crops_number {
            clean.push(self.local.apply(image.clone(), rng)?);
            corrupted.push(None);
            masks.push(None);
        }

        Ok(ViewBundle {
            clean,
            corrupted,
            masks,
        })
    }

    /// Like [`augment`](Self::augment) with a freshly seeded generator.
    pub fn augment_with_entropy(&self, image: &Tensor) -> AugmentResult<ViewBundle> {
        let mut rng = StdRng::from_entropy();
        self.augment(image, &mut rng)
    }
}
