//! Per-channel plane dispatch.
//!
//! Every operation in this crate that treats channels independently
//! (resize, blur) goes through [`map_planes`]. With the `parallel` feature
//! the planes are processed on the rayon pool, otherwise sequentially.

use crate::OpsResult;
use gmml_core::Tensor;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Maps every channel plane of `src` through `f` into a new
/// `out_h` x `out_w` tensor.
///
/// `f` receives one `src.height() * src.width()` plane and must return a
/// plane of `out_h * out_w` values.
pub(crate) fn map_planes<F>(src: &Tensor, out_h: usize, out_w: usize, f: F) -> OpsResult<Tensor>
where
    F: Fn(&[f32]) -> Vec<f32> + Sync + Send,
{
    let channels = src.channels();

    #[cfg(feature = "parallel")]
    let planes: Vec<Vec<f32>> = (0..channels)
        .into_par_iter()
        .map(|c| f(src.plane(c)))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let planes: Vec<Vec<f32>> = (0..channels).map(|c| f(src.plane(c))).collect();

    let data = planes.concat();
    Ok(Tensor::from_data(channels, out_h, out_w, data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_planes_keeps_channel_order() {
        let mut src = Tensor::new(3, 2, 2);
        for c in 0..3 {
            src.plane_mut(c).fill(c as f32);
        }
        let out = map_planes(&src, 1, 1, |plane| vec![plane[0] * 10.0]).unwrap();
        assert_eq!(out.shape(), [3, 1, 1]);
        assert_eq!(out.data(), &[0.0, 10.0, 20.0]);
    }

    #[test]
    fn test_map_planes_rejects_wrong_plane_size() {
        let src = Tensor::new(2, 2, 2);
        assert!(map_planes(&src, 2, 2, |_| vec![0.0; 3]).is_err());
    }
}
