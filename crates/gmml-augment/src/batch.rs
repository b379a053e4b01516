//! Batch corruption: fresh donor-based corruption or reuse of a prior one.
//!
//! For every sample `i` a donor index `j` is drawn uniformly from the
//! batch. With probability [`DropTypeSet::reuse_probability`] the prior
//! corruption and mask of `i` are returned as-is; otherwise the dropper
//! runs on sample `i` with sample `j` as donor. An empty drop-type set
//! always reuses.

use crate::drop_type::DropTypeSet;
use crate::dropper::{PatchDropper, DEFAULT_MAX_BLOCK_FRACTION};
use crate::{AugmentError, AugmentResult};
use gmml_core::{Mask, Tensor};
use rand::Rng;
use tracing::{debug, trace};

/// Which batch members may serve as donor for a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DonorPolicy {
    /// Any index, including the sample itself.
    #[default]
    AnyIndex,
    /// Any index but the sample's own. Batches of one fall back to self.
    ExcludeSelf,
}

/// Applies a [`PatchDropper`] across a batch.
#[derive(Debug, Clone)]
pub struct BatchCorruptor {
    dropper: PatchDropper,
    donor_policy: DonorPolicy,
}

impl BatchCorruptor {
    /// Creates a corruptor around `dropper`.
    pub fn new(dropper: PatchDropper) -> Self {
        Self {
            dropper,
            donor_policy: DonorPolicy::default(),
        }
    }

    /// Sets the donor policy.
    pub fn with_donor_policy(mut self, policy: DonorPolicy) -> Self {
        self.donor_policy = policy;
        self
    }

    /// The wrapped dropper.
    pub fn dropper(&self) -> &PatchDropper {
        &self.dropper
    }

    /// Corrupts every sample of `batch`.
    ///
    /// `prior_corrupted` and `prior_masks` must match `batch` in length and
    /// per-sample shape.
    pub fn corrupt<R: Rng + ?Sized>(
        &self,
        batch: &[Tensor],
        prior_corrupted: &[Tensor],
        prior_masks: &[Mask],
        rng: &mut R,
    ) -> AugmentResult<(Vec<Tensor>, Vec<Mask>)> {
        let n = batch.len();
        if prior_corrupted.len() != n || prior_masks.len() != n {
            return Err(AugmentError::BatchMismatch {
                batch: n,
                corrupted: prior_corrupted.len(),
                masks: prior_masks.len(),
            });
        }
        for ((sample, corrupted), mask) in batch.iter().zip(prior_corrupted).zip(prior_masks) {
            for got in [corrupted.shape(), mask.shape()] {
                if got != sample.shape() {
                    return Err(AugmentError::ShapeMismatch {
                        expected: sample.shape(),
                        got,
                    });
                }
            }
        }

        let reuse = self.dropper.drop_types().reuse_probability();
        debug!(batch = n, reuse, "corrupting batch");

        let mut images = Vec::with_capacity(n);
        let mut masks = Vec::with_capacity(n);
        let mut fresh = 0usize;
        for i in 0..n {
            let j = self.donor_index(i, n, rng);
            if rng.gen_bool(reuse) {
                trace!(i, "reusing prior corruption");
                images.push(prior_corrupted[i].clone());
                masks.push(prior_masks[i].clone());
            } else {
                trace!(i, donor = j, "fresh corruption");
                let (image, mask) = self.dropper.drop(batch[i].clone(), Some(&batch[j]), rng)?;
                images.push(image);
                masks.push(mask);
                fresh += 1;
            }
        }
        debug!(fresh, reused = n - fresh, "batch corrupted");
        Ok((images, masks))
    }

    fn donor_index<R: Rng + ?Sized>(&self, i: usize, n: usize, rng: &mut R) -> usize {
        match self.donor_policy {
            DonorPolicy::ExcludeSelf if n > 1 => {
                let j = rng.gen_range(0..n - 1);
                if j >= i { j + 1 } else { j }
            }
            _ => rng.gen_range(0..n),
        }
    }
}

/// Corrupts a batch with default block size and donor policy.
///
/// See [`BatchCorruptor::corrupt`].
pub fn corrupt_batch<R: Rng + ?Sized>(
    batch: &[Tensor],
    prior_corrupted: &[Tensor],
    prior_masks: &[Mask],
    drop_types: &DropTypeSet,
    max_replace: f64,
    alignment: usize,
    rng: &mut R,
) -> AugmentResult<(Vec<Tensor>, Vec<Mask>)> {
    let dropper = PatchDropper::new(
        drop_types.clone(),
        max_replace,
        alignment,
        DEFAULT_MAX_BLOCK_FRACTION,
    )?;
    BatchCorruptor::new(dropper).corrupt(batch, prior_corrupted, prior_masks, rng)
}
