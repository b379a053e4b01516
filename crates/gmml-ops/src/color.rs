//! Photometric adjustments on `[0, 1]` tensors.
//!
//! All operations take the tensor by value and return the adjusted one.
//! Blending operations clamp their result to `[0, 1]`; [`normalize`] and
//! [`denormalize`] don't clamp.
//!
//! Color operations (saturation, hue, grayscale) expect RGB in channels
//! 0..3. Single-channel tensors pass through saturation and hue unchanged.
//!
//! # Example
//!
//! ```rust
//! use gmml_core::Tensor;
//! use gmml_ops::color::{adjust_brightness, normalize, IMAGENET_MEAN, IMAGENET_STD};
//!
//! let t = Tensor::filled(3, 8, 8, 0.5);
//! let t = adjust_brightness(t, 1.2).unwrap();
//! let t = normalize(t, &IMAGENET_MEAN, &IMAGENET_STD).unwrap();
//! assert_eq!(t.shape(), [3, 8, 8]);
//! ```

use crate::{OpsError, OpsResult};
use gmml_core::Tensor;

/// ImageNet per-channel mean (RGB).
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
/// ImageNet per-channel standard deviation (RGB).
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Luma weights used for grayscale conversion.
const LUMA: [f32; 3] = [0.2989, 0.587, 0.114];

fn ensure_factor(name: &str, factor: f32) -> OpsResult<()> {
    if !(factor.is_finite() && factor >= 0.0) {
        return Err(OpsError::InvalidParameter(format!(
            "{} factor must be non-negative, got {}",
            name, factor
        )));
    }
    Ok(())
}

fn ensure_rgb(op: &str, t: &Tensor) -> OpsResult<()> {
    if t.channels() != 3 {
        return Err(OpsError::Unsupported(format!(
            "{} needs 3 channels, got {}",
            op,
            t.channels()
        )));
    }
    Ok(())
}

/// Luma plane of an RGB tensor.
fn luma(t: &Tensor) -> Vec<f32> {
    let (r, g, b) = (t.plane(0), t.plane(1), t.plane(2));
    r.iter()
        .zip(g)
        .zip(b)
        .map(|((&r, &g), &b)| LUMA[0] * r + LUMA[1] * g + LUMA[2] * b)
        .collect()
}

/// Multiplies every value by `factor`.
pub fn adjust_brightness(mut t: Tensor, factor: f32) -> OpsResult<Tensor> {
    ensure_factor("brightness", factor)?;
    t.map_values(|v| (v * factor).clamp(0.0, 1.0));
    Ok(t)
}

/// Blends towards the mean gray level by `factor` (1.0 = unchanged).
pub fn adjust_contrast(mut t: Tensor, factor: f32) -> OpsResult<Tensor> {
    ensure_factor("contrast", factor)?;
    if t.is_empty() {
        return Ok(t);
    }
    let gray = if t.channels() == 3 {
        luma(&t)
    } else {
        t.plane(0).to_vec()
    };
    let mean = gray.iter().map(|&v| v as f64).sum::<f64>() as f32 / gray.len() as f32;
    t.map_values(|v| (factor * v + (1.0 - factor) * mean).clamp(0.0, 1.0));
    Ok(t)
}

/// Blends towards the per-pixel gray level by `factor` (0.0 = grayscale).
pub fn adjust_saturation(mut t: Tensor, factor: f32) -> OpsResult<Tensor> {
    ensure_factor("saturation", factor)?;
    if t.channels() == 1 {
        return Ok(t);
    }
    ensure_rgb("saturation", &t)?;
    let gray = luma(&t);
    for plane in t.planes_mut() {
        for (v, &g) in plane.iter_mut().zip(&gray) {
            *v = (factor * *v + (1.0 - factor) * g).clamp(0.0, 1.0);
        }
    }
    Ok(t)
}

/// Rotates the hue by `shift` turns, `shift` in `[-0.5, 0.5]`.
pub fn adjust_hue(mut t: Tensor, shift: f32) -> OpsResult<Tensor> {
    if !(-0.5..=0.5).contains(&shift) {
        return Err(OpsError::InvalidParameter(format!(
            "hue shift must be in [-0.5, 0.5], got {}",
            shift
        )));
    }
    if t.channels() == 1 {
        return Ok(t);
    }
    ensure_rgb("hue", &t)?;

    let n = t.pixel_count();
    let data = t.data_mut();
    for i in 0..n {
        let (h, s, v) = rgb_to_hsv(data[i], data[n + i], data[2 * n + i]);
        let h = (h + shift).rem_euclid(1.0);
        let (r, g, b) = hsv_to_rgb(h, s, v);
        data[i] = r;
        data[n + i] = g;
        data[2 * n + i] = b;
    }
    Ok(t)
}

/// Converts RGB to gray, replicated over `out_channels` (1 or 3).
pub fn to_grayscale(t: Tensor, out_channels: usize) -> OpsResult<Tensor> {
    ensure_rgb("grayscale", &t)?;
    if out_channels != 1 && out_channels != 3 {
        return Err(OpsError::InvalidParameter(format!(
            "grayscale output must have 1 or 3 channels, got {}",
            out_channels
        )));
    }
    let gray = luma(&t);
    let data = gray.repeat(out_channels);
    Ok(Tensor::from_data(out_channels, t.height(), t.width(), data)?)
}

/// Inverts every value at or above `threshold`.
pub fn solarize(mut t: Tensor, threshold: f32) -> Tensor {
    t.map_values(|v| if v >= threshold { 1.0 - v } else { v });
    t
}

/// Normalizes each channel: `(v - mean[c]) / std[c]`.
pub fn normalize(mut t: Tensor, mean: &[f32], std: &[f32]) -> OpsResult<Tensor> {
    check_stats(&t, mean, std)?;
    for ((plane, &m), &s) in t.planes_mut().zip(mean).zip(std) {
        for v in plane.iter_mut() {
            *v = (*v - m) / s;
        }
    }
    Ok(t)
}

/// Inverse of [`normalize`]: `v * std[c] + mean[c]`.
pub fn denormalize(mut t: Tensor, mean: &[f32], std: &[f32]) -> OpsResult<Tensor> {
    check_stats(&t, mean, std)?;
    for ((plane, &m), &s) in t.planes_mut().zip(mean).zip(std) {
        for v in plane.iter_mut() {
            *v = *v * s + m;
        }
    }
    Ok(t)
}

fn check_stats(t: &Tensor, mean: &[f32], std: &[f32]) -> OpsResult<()> {
    if mean.len() != t.channels() || std.len() != t.channels() {
        return Err(OpsError::InvalidParameter(format!(
            "normalization expects {} channels, got mean {} / std {}",
            t.channels(),
            mean.len(),
            std.len()
        )));
    }
    if std.iter().any(|&s| s == 0.0) {
        return Err(OpsError::InvalidParameter(
            "normalization std must be non-zero".into(),
        ));
    }
    Ok(())
}

fn rgb_to_hsv(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let maxc = r.max(g).max(b);
    let minc = r.min(g).min(b);
    let delta = maxc - minc;
    let s = if maxc > 0.0 { delta / maxc } else { 0.0 };
    let h = if delta == 0.0 {
        0.0
    } else if maxc == r {
        ((g - b) / delta).rem_euclid(6.0)
    } else if maxc == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };
    ((h / 6.0).rem_euclid(1.0), s, maxc)
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    let h6 = h * 6.0;
    let i = h6.floor();
    let f = h6 - i;
    let p = (v * (1.0 - s)).clamp(0.0, 1.0);
    let q = (v * (1.0 - s * f)).clamp(0.0, 1.0);
    let t = (v * (1.0 - s * (1.0 - f))).clamp(0.0, 1.0);
    match (i as i32).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rgb(r: f32, g: f32, b: f32) -> Tensor {
        Tensor::from_data(3, 1, 1, vec![r, g, b]).unwrap()
    }

    #[test]
    fn test_brightness_clamps() {
        let t = adjust_brightness(rgb(0.2, 0.6, 0.9), 1.5).unwrap();
        assert_relative_eq!(t.get(0, 0, 0), 0.3, epsilon = 1e-6);
        assert_relative_eq!(t.get(2, 0, 0), 1.0);
        assert!(adjust_brightness(rgb(0.0, 0.0, 0.0), -1.0).is_err());
    }

    #[test]
    fn test_contrast_zero_gives_mean_gray() {
        let mut t = Tensor::new(3, 1, 2);
        t.plane_mut(0).copy_from_slice(&[0.0, 1.0]);
        t.plane_mut(1).copy_from_slice(&[0.0, 1.0]);
        t.plane_mut(2).copy_from_slice(&[0.0, 1.0]);
        let out = adjust_contrast(t, 0.0).unwrap();
        for &v in out.data() {
            assert_relative_eq!(v, 0.5, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_saturation_zero_is_grayscale() {
        let t = rgb(1.0, 0.0, 0.0);
        let sat = adjust_saturation(t.clone(), 0.0).unwrap();
        let gray = to_grayscale(t, 3).unwrap();
        for (a, b) in sat.data().iter().zip(gray.data()) {
            assert_relative_eq!(a, b, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_hue_roundtrip() {
        let t = rgb(0.8, 0.3, 0.1);
        let shifted = adjust_hue(t.clone(), 0.25).unwrap();
        assert!((shifted.get(0, 0, 0) - 0.8).abs() > 1e-3);
        let back = adjust_hue(shifted, -0.25).unwrap();
        for (a, b) in back.data().iter().zip(t.data()) {
            assert_relative_eq!(a, b, epsilon = 1e-5);
        }
        assert!(adjust_hue(rgb(0.0, 0.0, 0.0), 0.6).is_err());
    }

    #[test]
    fn test_grayscale_channels() {
        let gray = to_grayscale(rgb(1.0, 1.0, 1.0), 1).unwrap();
        assert_eq!(gray.shape(), [1, 1, 1]);
        assert_relative_eq!(gray.get(0, 0, 0), 0.9999, epsilon = 1e-3);
        assert!(to_grayscale(rgb(1.0, 1.0, 1.0), 2).is_err());
        assert!(to_grayscale(Tensor::new(1, 2, 2), 3).is_err());
    }

    #[test]
    fn test_solarize() {
        let t = solarize(rgb(0.2, 0.5, 0.9), 0.5);
        assert_relative_eq!(t.get(0, 0, 0), 0.2);
        assert_relative_eq!(t.get(1, 0, 0), 0.5);
        assert_relative_eq!(t.get(2, 0, 0), 0.1, epsilon = 1e-6);
    }

    #[test]
    fn test_normalize_denormalize() {
        let t = rgb(0.485, 0.456, 0.406);
        let n = normalize(t.clone(), &IMAGENET_MEAN, &IMAGENET_STD).unwrap();
        for &v in n.data() {
            assert_relative_eq!(v, 0.0, epsilon = 1e-6);
        }
        let back = denormalize(n, &IMAGENET_MEAN, &IMAGENET_STD).unwrap();
        for (a, b) in back.data().iter().zip(t.data()) {
            assert_relative_eq!(a, b, epsilon = 1e-6);
        }
        assert!(normalize(Tensor::new(1, 1, 1), &IMAGENET_MEAN, &IMAGENET_STD).is_err());
    }
}
