//! PNG reading and writing for tensors.
//!
//! Inputs are decoded to 3-channel `[0, 1]` tensors: alpha is dropped and
//! gray is replicated. 16-bit inputs keep their high byte.

use anyhow::{bail, Context, Result};
use gmml_core::{Mask, Tensor};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::debug;

/// Reads a PNG as an RGB tensor.
pub fn read_png(path: &Path) -> Result<Tensor> {
    let file = File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
    let mut decoder = png::Decoder::new(BufReader::new(file));
    decoder.set_transformations(png::Transformations::EXPAND);
    let mut reader = decoder
        .read_info()
        .with_context(|| format!("Failed to decode: {}", path.display()))?;

    let buf_size = reader
        .output_buffer_size()
        .context("cannot determine output buffer size")?;
    let mut buf = vec![0u8; buf_size];
    let info = reader
        .next_frame(&mut buf)
        .with_context(|| format!("Failed to decode: {}", path.display()))?;
    let bytes = &buf[..info.buffer_size()];

    let samples: Vec<u8> = match info.bit_depth {
        png::BitDepth::Eight => bytes.to_vec(),
        // Big-endian, high byte first
        png::BitDepth::Sixteen => bytes.chunks_exact(2).map(|b| b[0]).collect(),
        depth => bail!("unsupported bit depth {:?} in {}", depth, path.display()),
    };

    let rgb: Vec<u8> = match info.color_type {
        png::ColorType::Rgb => samples,
        png::ColorType::Rgba => samples.chunks_exact(4).flat_map(|p| [p[0], p[1], p[2]]).collect(),
        png::ColorType::Grayscale => samples.iter().flat_map(|&g| [g, g, g]).collect(),
        png::ColorType::GrayscaleAlpha => samples.chunks_exact(2).flat_map(|p| [p[0], p[0], p[0]]).collect(),
        other => bail!("unsupported color type {:?} in {}", other, path.display()),
    };

    let (width, height) = (info.width as usize, info.height as usize);
    debug!(path = %path.display(), width, height, "read png");
    Ok(Tensor::from_rgb8(width, height, 3, &rgb)?)
}

/// Writes a 1- or 3-channel tensor as 8-bit PNG, clamping to `[0, 1]`.
pub fn write_png(path: &Path, tensor: &Tensor) -> Result<()> {
    let color_type = match tensor.channels() {
        1 => png::ColorType::Grayscale,
        3 => png::ColorType::Rgb,
        n => bail!("cannot write {} channels to PNG", n),
    };

    let file = File::create(path).with_context(|| format!("Failed to create: {}", path.display()))?;
    let mut encoder = png::Encoder::new(
        BufWriter::new(file),
        tensor.width() as u32,
        tensor.height() as u32,
    );
    encoder.set_color(color_type);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::default());
    encoder.set_source_srgb(png::SrgbRenderingIntent::Perceptual);

    let mut writer = encoder
        .write_header()
        .with_context(|| format!("Failed to save: {}", path.display()))?;
    writer
        .write_image_data(&tensor.to_rgb8())
        .with_context(|| format!("Failed to save: {}", path.display()))?;
    debug!(path = %path.display(), "wrote png");
    Ok(())
}

/// Writes channel 0 of `mask` as a black and white PNG.
pub fn write_mask(path: &Path, mask: &Mask) -> Result<()> {
    let t = mask.as_tensor();
    let plane = Tensor::from_data(1, t.height(), t.width(), t.plane(0).to_vec())?;
    write_png(path, &plane)
}
