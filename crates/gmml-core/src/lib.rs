//! # gmml-core
//!
//! Core types for multi-view augmentation with patch corruption.
//!
//! - [`Tensor`] - Owned planar (C, H, W) `f32` image tensor
//! - [`Mask`] - Channel-consistent binary coverage mask
//! - [`Rect`] - Block and crop geometry
//! - [`Error`] - Shape and bounds errors
//!
//! ## Crate Structure
//!
//! This crate has no internal dependencies. The rest of the workspace
//! builds on it:
//!
//! ```text
//! gmml-core (this crate)
//!    ^
//!    |
//!    +-- gmml-ops (resize, crop, flip, blur, color)
//!    +-- gmml-augment (patch dropper, batch corruption, view pipeline)
//!    +-- gmml-cli
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod mask;
pub mod rect;
pub mod tensor;

pub use error::*;
pub use mask::Mask;
pub use rect::Rect;
pub use tensor::Tensor;
