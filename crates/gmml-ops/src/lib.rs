//! # gmml-ops
//!
//! Deterministic tensor operations used by the augmentation pipeline.
//!
//! Nothing here is random: the random transforms in `gmml-augment` sample
//! their parameters and call into these primitives.
//!
//! # Modules
//!
//! - [`resize`] - Separable resampling
//! - [`transform`] - Crop, flip, resized crop
//! - [`filter`] - Gaussian blur
//! - [`color`] - Brightness, contrast, saturation, hue, grayscale, solarize, normalize
//!
//! # Example
//!
//! ```rust
//! use gmml_core::{Rect, Tensor};
//! use gmml_ops::{transform::resized_crop, Filter};
//!
//! let src = Tensor::filled(3, 300, 400, 0.5);
//! let view = resized_crop(&src, Rect::new(50, 20, 200, 180), 224, 224, Filter::Bicubic).unwrap();
//! assert_eq!(view.shape(), [3, 224, 224]);
//! ```
//!
//! # Feature Flags
//!
//! - `parallel` (default) - process channel planes on the rayon pool

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
mod planes;
pub mod color;
pub mod filter;
pub mod resize;
pub mod transform;

pub use error::{OpsError, OpsResult};
pub use resize::Filter;
