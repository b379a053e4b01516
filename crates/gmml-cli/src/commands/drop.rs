//! Drop command
//!
//! Runs the patch dropper on one image, optionally with a donor.

use crate::io::{read_png, write_mask, write_png};
use crate::DropArgs;
use anyhow::{Result, bail};
use gmml_augment::{DropTypeSet, PatchDropper};
use tracing::{info, trace};

pub fn run(args: DropArgs, verbose: bool) -> Result<()> {
    trace!(input = %args.input.display(), drop_type = %args.drop_type, "drop::run");

    let image = read_png(&args.input)?;
    let donor = match &args.donor {
        Some(path) => {
            let donor = read_png(path)?;
            if donor.shape() != image.shape() {
                bail!(
                    "donor {} is {}x{}, input is {}x{}",
                    path.display(),
                    donor.width(),
                    donor.height(),
                    image.width(),
                    image.height()
                );
            }
            Some(donor)
        }
        None => None,
    };

    let dropper = PatchDropper::new(
        DropTypeSet::parse(&args.drop_type),
        args.max_replace,
        args.align,
        args.max_block,
    )?;
    let mut rng = super::make_rng(args.seed);
    let outcome = dropper.drop_traced(image, donor.as_ref(), &mut rng)?;

    write_png(&args.output, &outcome.image)?;
    if let Some(mask_path) = &args.mask {
        write_mask(mask_path, &outcome.mask)?;
    }

    info!(
        blocks = outcome.blocks.len(),
        coverage = outcome.mask.coverage(),
        "patches dropped"
    );
    if verbose {
        let source = if donor.is_some() { "donor".to_string() } else { outcome.strategy.to_string() };
        println!(
            "{} blocks ({}), {:.1}% corrupted",
            outcome.blocks.len(),
            source,
            outcome.mask.coverage() * 100.0
        );
    }
    Ok(())
}
