//! # gmml-augment
//!
//! Multi-view augmentation with patch corruption for self-supervised
//! training.
//!
//! - [`PatchDropper`] - aligned block corruption with an exact mask
//! - [`BatchCorruptor`] / [`corrupt_batch`] - donor-based corruption across a batch
//! - [`DataAugmentation`] - two global and K local views per sample
//! - [`RandomResizedCropWithParams`], [`RandomHorizontalFlipWithFlag`] -
//!   transforms that report what they did
//! - [`AugmentConfig`] - YAML-loadable settings
//!
//! Every random operation takes the generator explicitly:
//!
//! ```rust
//! use gmml_augment::{AugmentConfig, DataAugmentation};
//! use gmml_core::Tensor;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let config = AugmentConfig {
//!     global_crop_size: 64,
//!     local_crop_size: 32,
//!     local_crops_number: 2,
//!     ..AugmentConfig::default()
//! };
//! let aug = DataAugmentation::new(config).unwrap();
//! let mut rng = StdRng::seed_from_u64(0);
//! let views = aug.augment(&Tensor::filled(3, 96, 128, 0.5), &mut rng).unwrap();
//! assert_eq!(views.len(), 4);
//! assert!(views.corrupted[0].is_some() && views.corrupted[2].is_none());
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;

pub mod batch;
pub mod config;
pub mod drop_type;
pub mod dropper;
pub mod params;
pub mod transforms;
pub mod views;

pub use batch::{corrupt_batch, BatchCorruptor, DonorPolicy};
pub use config::AugmentConfig;
pub use drop_type::{DropStrategy, DropTypeSet};
pub use dropper::{drop_random_patches, DropOutcome, PatchDropper, MAX_BLOCK_ITERATIONS};
pub use error::{AugmentError, AugmentResult};
pub use params::{RandomHorizontalFlipWithFlag, RandomResizedCropWithParams};
pub use views::{DataAugmentation, ViewBundle};
