//! Views command
//!
//! Runs the multi-view pipeline on one image and writes every view.

use crate::io::{read_png, write_mask, write_png};
use crate::ViewsArgs;
use anyhow::{Context, Result};
use gmml_augment::{AugmentConfig, DataAugmentation};
use gmml_core::Tensor;
use gmml_ops::color::{denormalize, IMAGENET_MEAN, IMAGENET_STD};
use std::path::Path;
use tracing::{info, trace};

pub fn run(args: ViewsArgs, verbose: bool) -> Result<()> {
    trace!(input = %args.input.display(), "views::run");

    let config = match &args.config {
        Some(path) => AugmentConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => AugmentConfig::default(),
    };
    let pipeline = DataAugmentation::new(config)?;
    let image = read_png(&args.input)?;

    let mut rng = super::make_rng(args.seed);
    let views = pipeline.augment(&image, &mut rng)?;

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create: {}", args.output.display()))?;

    let globals = pipeline.config().global_crops_number;
    for (i, view) in views.clean.iter().enumerate() {
        let name = if i < globals {
            format!("global{}", i + 1)
        } else {
            format!("local{}", i - globals + 1)
        };
        save_view(&args.output.join(format!("{}.png", name)), view)?;
        if let Some(corrupted) = &views.corrupted[i] {
            save_view(&args.output.join(format!("{}_corrupted.png", name)), corrupted)?;
        }
        if let Some(mask) = &views.masks[i] {
            write_mask(&args.output.join(format!("{}_mask.png", name)), mask)?;
            if verbose {
                println!("{}: {:.1}% corrupted", name, mask.coverage() * 100.0);
            }
        }
    }

    info!(views = views.len(), output = %args.output.display(), "wrote views");
    if verbose {
        println!("Wrote {} views to {}", views.len(), args.output.display());
    }
    Ok(())
}

/// Undoes the normalization and writes the view.
fn save_view(path: &Path, view: &Tensor) -> Result<()> {
    let display = denormalize(view.clone(), &IMAGENET_MEAN, &IMAGENET_STD)?;
    write_png(path, &display)
}
