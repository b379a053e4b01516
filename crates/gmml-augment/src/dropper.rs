//! Patch dropper: aligned block corruption with an exact coverage mask.
//!
//! Blocks are sampled on an alignment grid until the mask covers a random
//! target fraction of the image, drawn from
//! `[min(0.5, max_replace), max_replace]`. Each block is replaced from a
//! donor at the same coordinates when one is given, otherwise by the
//! strategy drawn once per call from the [`DropTypeSet`].
//!
//! Coverage never exceeds `max_replace` by more than one `alignment x
//! alignment` block: a block that would cross the cap is shrunk in
//! alignment steps first.
//!
//! # Example
//!
//! ```rust
//! use gmml_augment::{DropTypeSet, PatchDropper};
//! use gmml_core::Tensor;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let dropper = PatchDropper::new(DropTypeSet::parse("zeros"), 0.5, 16, 0.3).unwrap();
//! let mut rng = StdRng::seed_from_u64(1);
//! let (image, mask) = dropper.drop(Tensor::filled(3, 128, 128, 1.0), None, &mut rng).unwrap();
//! assert!(mask.coverage() >= 0.5);
//! assert_eq!(image.shape(), mask.shape());
//! ```

use crate::drop_type::{DropStrategy, DropTypeSet};
use crate::{AugmentError, AugmentResult};
use gmml_core::{Mask, Rect, Tensor};
use rand::Rng;
use rand_distr::StandardNormal;
use tracing::{debug, trace};

/// Default cap on sampled blocks per call.
pub const MAX_BLOCK_ITERATIONS: usize = 10_000;

/// Default maximum block side as a fraction of the image side.
pub const DEFAULT_MAX_BLOCK_FRACTION: f64 = 0.3;

/// Result of one dropper call, including the sampled blocks.
#[derive(Debug, Clone)]
pub struct DropOutcome {
    /// Corrupted image.
    pub image: Tensor,
    /// Binary mask of replaced locations, same shape as `image`.
    pub mask: Mask,
    /// Blocks in sampling order, after clipping and shrinking.
    pub blocks: Vec<Rect>,
    /// Strategy drawn for this call. Ignored when a donor was given.
    pub strategy: DropStrategy,
}

/// Configured patch dropper.
#[derive(Debug, Clone)]
pub struct PatchDropper {
    drop_types: DropTypeSet,
    max_replace: f64,
    alignment: usize,
    max_block_fraction: f64,
    max_iterations: usize,
}

impl PatchDropper {
    /// Creates a dropper.
    ///
    /// An alignment of 0 behaves as 1.
    ///
    /// # Errors
    ///
    /// [`AugmentError::InvalidConfig`] if `max_replace` is outside `[0, 1]`
    /// or `max_block_fraction` is outside `(0, 1]`.
    pub fn new(
        drop_types: DropTypeSet,
        max_replace: f64,
        alignment: usize,
        max_block_fraction: f64,
    ) -> AugmentResult<Self> {
        if !(0.0..=1.0).contains(&max_replace) {
            return Err(AugmentError::invalid_config(format!(
                "max_replace must be in [0, 1], got {}",
                max_replace
            )));
        }
        if !(max_block_fraction > 0.0 && max_block_fraction <= 1.0) {
            return Err(AugmentError::invalid_config(format!(
                "max_block_fraction must be in (0, 1], got {}",
                max_block_fraction
            )));
        }
        Ok(Self {
            drop_types,
            max_replace,
            alignment: alignment.max(1),
            max_block_fraction,
            max_iterations: MAX_BLOCK_ITERATIONS,
        })
    }

    /// Sets the block iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    /// Effective alignment (at least 1).
    #[inline]
    pub fn alignment(&self) -> usize {
        self.alignment
    }

    /// Maximum replacement fraction.
    #[inline]
    pub fn max_replace(&self) -> f64 {
        self.max_replace
    }

    /// Drop-type set strategies are drawn from.
    #[inline]
    pub fn drop_types(&self) -> &DropTypeSet {
        &self.drop_types
    }

    /// Corrupts `image` and returns it with its mask.
    ///
    /// `donor`, when given, must have the same shape as `image`; blocks
    /// are then copied from it at the same coordinates.
    pub fn drop<R: Rng + ?Sized>(
        &self,
        image: Tensor,
        donor: Option<&Tensor>,
        rng: &mut R,
    ) -> AugmentResult<(Tensor, Mask)> {
        let outcome = self.drop_traced(image, donor, rng)?;
        Ok((outcome.image, outcome.mask))
    }

    /// Like [`drop`](Self::drop), but also returns the sampled blocks.
    pub fn drop_traced<R: Rng + ?Sized>(
        &self,
        mut image: Tensor,
        donor: Option<&Tensor>,
        rng: &mut R,
    ) -> AugmentResult<DropOutcome> {
        let [channels, height, width] = image.shape();
        let align = self.alignment;
        if height <= align || width <= align {
            return Err(AugmentError::ImageTooSmallForAlignment {
                height,
                width,
                alignment: align,
            });
        }
        if channels == 0 {
            return Err(gmml_core::Error::invalid_shape(image.shape(), "image has no channels").into());
        }
        if let Some(d) = donor {
            if d.shape() != image.shape() {
                return Err(AugmentError::ShapeMismatch {
                    expected: image.shape(),
                    got: d.shape(),
                });
            }
        }

        let pixels = height * width;
        let low = self.max_replace.min(0.5);
        let fraction = if low < self.max_replace {
            rng.gen_range(low..=self.max_replace)
        } else {
            self.max_replace
        };
        let target = fraction * pixels as f64;
        let cap = (self.max_replace * pixels as f64).floor() as usize;

        let max_h = ((self.max_block_fraction * height as f64) as usize).max(align);
        let max_w = ((self.max_block_fraction * width as f64) as usize).max(align);

        let strategy = self.drop_types.choose(rng);
        debug!(
            height,
            width,
            target = target.ceil() as usize,
            %strategy,
            donor = donor.is_some(),
            "dropping patches"
        );

        let mut mask = Mask::like(&image);
        let mut blocks = Vec::new();
        while (mask.covered_pixels() as f64) < target {
            if blocks.len() >= self.max_iterations {
                return Err(AugmentError::CoverageUnreachable {
                    covered: mask.covered_pixels(),
                    target: target.ceil() as usize,
                    iterations: blocks.len(),
                });
            }

            let row = aligned_offset(rng, height - align, align);
            let col = aligned_offset(rng, width - align, align);
            let bh = block_side(rng, align, max_h, height - row);
            let bw = block_side(rng, align, max_w, width - col);
            let rect = Rect::from_block(row, col, bh, bw);
            let rect = self.fit_to_cap(&mask, rect, cap)?;

            match donor {
                Some(d) => image.copy_rect_from(d, rect)?,
                None => match strategy {
                    DropStrategy::Noise => {
                        image.fill_rect_with(rect, || rng.sample::<f32, _>(StandardNormal))?
                    }
                    DropStrategy::Zeros => image.fill_rect(rect, 0.0)?,
                    DropStrategy::SelfCopy => {
                        let src_row = rng.gen_range(0..=height - rect.height) / align * align;
                        let src_col = rng.gen_range(0..=width - rect.width) / align * align;
                        let src = rect.with_origin(src_col, src_row);
                        image.copy_rect_within(src, rect.x, rect.y)?;
                    }
                },
            }

            let fresh = mask.mark(rect)?;
            trace!(%rect, fresh, covered = mask.covered_pixels(), "block");
            blocks.push(rect);
        }

        debug!(
            blocks = blocks.len(),
            coverage = mask.coverage(),
            "patches dropped"
        );
        Ok(DropOutcome {
            image,
            mask,
            blocks,
            strategy,
        })
    }

    /// Shrinks `rect` in alignment steps until marking it keeps coverage
    /// within `cap`, or it is down to one alignment cell.
    fn fit_to_cap(&self, mask: &Mask, mut rect: Rect, cap: usize) -> AugmentResult<Rect> {
        let align = self.alignment;
        let budget = cap.saturating_sub(mask.covered_pixels());
        loop {
            if mask.uncovered_in(rect)? <= budget {
                return Ok(rect);
            }
            if rect.height > align && rect.height >= rect.width {
                rect.height = (rect.height - align).max(align);
            } else if rect.width > align {
                rect.width = (rect.width - align).max(align);
            } else if rect.height > align {
                rect.height = (rect.height - align).max(align);
            } else {
                return Ok(rect);
            }
        }
    }
}

/// Uniform offset in `[0, span)` floored to a multiple of `align`.
fn aligned_offset<R: Rng + ?Sized>(rng: &mut R, span: usize, align: usize) -> usize {
    rng.gen_range(0..span) / align * align
}

/// Block side in `[align, max_side]`, rounded to the nearest multiple of
/// `align`, then clipped to `room`.
///
/// A block that would leave less than `align` pixels before the edge
/// extends to the edge, so trailing rows and columns of sides that are
/// not a multiple of `align` stay reachable.
fn block_side<R: Rng + ?Sized>(rng: &mut R, align: usize, max_side: usize, room: usize) -> usize {
    let side = rng.gen_range(align..=max_side);
    let rounded = ((side + align / 2) / align * align).min(room);
    if room - rounded < align { room } else { rounded }
}

/// Corrupts `image` with a one-off [`PatchDropper`].
///
/// See [`PatchDropper::drop`].
pub fn drop_random_patches<R: Rng + ?Sized>(
    image: Tensor,
    donor: Option<&Tensor>,
    drop_types: &DropTypeSet,
    max_replace: f64,
    alignment: usize,
    max_block_fraction: f64,
    rng: &mut R,
) -> AugmentResult<(Tensor, Mask)> {
    PatchDropper::new(drop_types.clone(), max_replace, alignment, max_block_fraction)?
        .drop(image, donor, rng)
}
