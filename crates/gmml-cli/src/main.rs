//! gmml - inspect multi-view augmentation and patch corruption
//!
//! Runs the augmentation pipeline or the patch dropper on PNG files and
//! writes the results for visual inspection.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod io;

#[derive(Parser)]
#[command(name = "gmml")]
#[command(author, version, about = "Inspect multi-view augmentation and patch corruption")]
#[command(long_about = "
Runs the self-supervised augmentation pipeline on PNG images.

Examples:
  gmml views photo.png -o views/               # All views, with corruption
  gmml views photo.png -o views/ -c aug.yaml --seed 7
  gmml drop photo.png -o dropped.png -m mask.png
  gmml drop photo.png -o mixed.png --donor other.png --max-replace 0.5
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the global and local views of an image
    #[command(visible_alias = "v")]
    Views(ViewsArgs),

    /// Corrupt an image with random aligned patches
    #[command(visible_alias = "d")]
    Drop(DropArgs),
}

/// Arguments for the `views` command.
#[derive(Args)]
struct ViewsArgs {
    /// Input image
    input: PathBuf,

    /// Output directory
    #[arg(short, long)]
    output: PathBuf,

    /// Augmentation config (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Random seed (default: from entropy)
    #[arg(long)]
    seed: Option<u64>,
}

/// Arguments for the `drop` command.
#[derive(Args)]
struct DropArgs {
    /// Input image
    input: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// Write the mask here
    #[arg(short, long)]
    mask: Option<PathBuf>,

    /// Copy blocks from this image instead (same size as input)
    #[arg(long)]
    donor: Option<PathBuf>,

    /// Replacement strategies: noise, zeros, rand, joined with '-'
    #[arg(short = 't', long = "drop-type", default_value = "noise")]
    drop_type: String,

    /// Maximum fraction of pixels to replace
    #[arg(long, default_value = "0.7")]
    max_replace: f64,

    /// Block alignment in pixels
    #[arg(short, long, default_value = "16")]
    align: usize,

    /// Maximum block side as a fraction of the image side
    #[arg(long, default_value = "0.3")]
    max_block: f64,

    /// Random seed (default: from entropy)
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Views(args) => commands::views::run(args, cli.verbose),
        Commands::Drop(args) => commands::drop::run(args, cli.verbose),
    }
}
