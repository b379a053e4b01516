//! Augmentation configuration.
//!
//! ```yaml
//! drop_perc: 0.7
//! drop_type: noise-zeros
//! drop_align: 16
//! global_crops_scale: [0.4, 1.0]
//! local_crops_scale: [0.05, 0.4]
//! local_crops_number: 8
//! ```
//!
//! Missing fields take their defaults. [`AugmentConfig::validate`] runs on
//! load and again when a pipeline is built.

use crate::drop_type::DropTypeSet;
use crate::dropper::DEFAULT_MAX_BLOCK_FRACTION;
use crate::{AugmentError, AugmentResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Number of global views the pipeline produces.
pub const GLOBAL_CROPS_NUMBER: usize = 2;

/// Multi-view augmentation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AugmentConfig {
    /// Maximum fraction of a global view to corrupt. 0 disables corruption.
    pub drop_perc: f64,
    /// Replacement strategies, `-`-delimited.
    pub drop_type: DropTypeSet,
    /// Block alignment in pixels. 0 behaves as 1.
    pub drop_align: usize,
    /// Area scale range of global crops.
    pub global_crops_scale: (f64, f64),
    /// Area scale range of local crops.
    pub local_crops_scale: (f64, f64),
    /// Number of global crops. Must be 2.
    pub global_crops_number: usize,
    /// Number of local crops.
    pub local_crops_number: usize,
    /// Side length of global views.
    pub global_crop_size: usize,
    /// Side length of local views.
    pub local_crop_size: usize,
    /// Maximum block side as a fraction of the view side.
    pub max_block_fraction: f64,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            drop_perc: 0.7,
            drop_type: DropTypeSet::parse("noise"),
            drop_align: 16,
            global_crops_scale: (0.4, 1.0),
            local_crops_scale: (0.05, 0.4),
            global_crops_number: GLOBAL_CROPS_NUMBER,
            local_crops_number: 8,
            global_crop_size: 224,
            local_crop_size: 96,
            max_block_fraction: DEFAULT_MAX_BLOCK_FRACTION,
        }
    }
}

impl AugmentConfig {
    /// Loads and validates a YAML config file.
    pub fn from_file(path: impl AsRef<Path>) -> AugmentResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AugmentError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        debug!(path = %path.display(), "loading augmentation config");
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parses and validates a YAML config.
    pub fn from_yaml_str(yaml: &str) -> AugmentResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes to YAML.
    pub fn to_yaml(&self) -> AugmentResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Number of views per sample: global plus local.
    #[inline]
    pub fn total_views(&self) -> usize {
        self.global_crops_number + self.local_crops_number
    }

    /// Returns `true` if global views get corrupted.
    #[inline]
    pub fn corruption_enabled(&self) -> bool {
        self.drop_perc > 0.0
    }

    /// Checks every field, naming the first one out of range.
    pub fn validate(&self) -> AugmentResult<()> {
        if !(0.0..=1.0).contains(&self.drop_perc) {
            return Err(AugmentError::invalid_config(format!(
                "drop_perc must be in [0, 1], got {}",
                self.drop_perc
            )));
        }
        check_scale("global_crops_scale", self.global_crops_scale)?;
        check_scale("local_crops_scale", self.local_crops_scale)?;
        if self.global_crops_number != GLOBAL_CROPS_NUMBER {
            return Err(AugmentError::invalid_config(format!(
                "global_crops_number must be {}, got {}",
                GLOBAL_CROPS_NUMBER, self.global_crops_number
            )));
        }
        if self.global_crop_size == 0 || self.local_crop_size == 0 {
            return Err(AugmentError::invalid_config(
                "global_crop_size and local_crop_size must be positive",
            ));
        }
        if !(self.max_block_fraction > 0.0 && self.max_block_fraction <= 1.0) {
            return Err(AugmentError::invalid_config(format!(
                "max_block_fraction must be in (0, 1], got {}",
                self.max_block_fraction
            )));
        }
        if self.corruption_enabled() && self.global_crop_size <= self.drop_align.max(1) {
            return Err(AugmentError::invalid_config(format!(
                "drop_align {} leaves no room in {}px global views",
                self.drop_align, self.global_crop_size
            )));
        }
        Ok(())
    }
}

fn check_scale(name: &str, (lo, hi): (f64, f64)) -> AugmentResult<()> {
    if !(lo > 0.0 && lo <= hi && hi <= 1.0) {
        return Err(AugmentError::invalid_config(format!(
            "{} must satisfy 0 < min <= max <= 1, got ({}, {})",
            name, lo, hi
        )));
    }
    Ok(())
}
