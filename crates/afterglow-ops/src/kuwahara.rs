//! Kuwahara oil-paint filter.
//!
//! Each output pixel looks at four `r × r` windows around it and takes the
//! mean colour of the one with the smallest variance, which flattens
//! texture while keeping edges sharp. Window sums come from a summed-area
//! table built over an edge-reflected copy of each channel.

use afterglow_core::{PixelBuffer, CHANNELS};
use afterglow_math::reflect_index;
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::parallel::for_each_row;
use crate::OpsResult;

/// Variances closer than this count as a tie.
const VAR_TIE: f64 = 1e-12;

/// Parameters for [`kuwahara`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct KuwaharaParams {
    /// Window size; 0 is treated as 1.
    pub radius: usize,
}

impl Default for KuwaharaParams {
    fn default() -> Self {
        Self { radius: 4 }
    }
}

/// Summed-area table over a padded, edge-reflected plane.
///
/// Padded index `i` holds the source sample at `i - pad`.
struct Integral {
    stride: usize,
    sum: Vec<f64>,
    sum_sq: Vec<f64>,
}

impl Integral {
    fn build(src: &PixelBuffer, channel: usize, pad: usize, ext_w: usize, ext_h: usize) -> Self {
        let (w, h) = src.dimensions();
        let stride = ext_w + 1;
        let mut sum = vec![0.0f64; stride * (ext_h + 1)];
        let mut sum_sq = vec![0.0f64; stride * (ext_h + 1)];
        for ey in 0..ext_h {
            let sy = reflect_index(ey as isize - pad as isize, h);
            let mut row = 0.0f64;
            let mut row_sq = 0.0f64;
            for ex in 0..ext_w {
                let sx = reflect_index(ex as isize - pad as isize, w);
                let v = src.pixel(sx, sy)[channel] as f64;
                row += v;
                row_sq += v * v;
                let i = (ey + 1) * stride + ex + 1;
                sum[i] = sum[i - stride] + row;
                sum_sq[i] = sum_sq[i - stride] + row_sq;
            }
        }
        Self { stride, sum, sum_sq }
    }

    /// Sums over the `size × size` window with padded top-left `(x, y)`.
    #[inline]
    fn window(&self, x: usize, y: usize, size: usize) -> (f64, f64) {
        let s = self.stride;
        let (x1, y1) = (x + size, y + size);
        let pick = |t: &[f64]| t[y1 * s + x1] - t[y * s + x1] - t[y1 * s + x] + t[y * s + x];
        (pick(&self.sum), pick(&self.sum_sq))
    }
}

/// Oil-paint smoothing by minimum-variance window selection.
///
/// The windows sit at offsets `(0,0)`, `(0,r)`, `(r,0)`, `(r,r)` (as
/// `(dy, dx)`) from a window centred on the pixel, so the last three lie
/// beside, below and diagonally past it rather than around it. Variance is
/// summed over the channels and the first window wins ties. The radius is
/// capped at the larger image side.
///
/// # Example
///
/// ```rust
/// use afterglow_core::PixelBuffer;
/// use afterglow_ops::kuwahara::{kuwahara, KuwaharaParams};
///
/// let img = PixelBuffer::filled(6, 6, [0.25, 0.5, 0.75]);
/// let out = kuwahara(&img, &KuwaharaParams::default()).unwrap();
/// assert!(out.max_abs_diff(&img).unwrap() < 1e-6);
/// ```
pub fn kuwahara(src: &PixelBuffer, p: &KuwaharaParams) -> OpsResult<PixelBuffer> {
    let (w, h) = src.dimensions();
    if src.is_empty() {
        return Ok(src.clone());
    }
    // Padded tables grow with r²; a window wider than the image adds nothing.
    let r = p.radius.clamp(1, w.max(h));
    debug!(w, h, radius = r, "kuwahara");

    let pad = r / 2;
    let (ext_w, ext_h) = (w + 2 * r, h + 2 * r);
    let tables: Vec<Integral> = (0..CHANNELS)
        .map(|c| Integral::build(src, c, pad, ext_w, ext_h))
        .collect();
    let area = (r * r) as f64;
    // Only the (0, 0) window covers the pixel itself; the others sit r past it.
    let offsets = [(0, 0), (0, r), (r, 0), (r, r)];

    let mut out = PixelBuffer::new(w, h);
    for_each_row(out.data_mut(), w * CHANNELS, |y, row| {
        for (x, px) in row.chunks_exact_mut(CHANNELS).enumerate() {
            let mut best_var = f64::INFINITY;
            let mut best = [0.0f32; CHANNELS];
            for &(dy, dx) in &offsets {
                let mut var = 0.0f64;
                let mut mean = [0.0f32; CHANNELS];
                for (c, table) in tables.iter().enumerate() {
                    let (s, sq) = table.window(x + dx, y + dy, r);
                    let m = s / area;
                    var += (sq / area - m * m).max(0.0);
                    mean[c] = m as f32;
                }
                if var < best_var - VAR_TIE {
                    best_var = var;
                    best = mean;
                }
            }
            for (dst, v) in px.iter_mut().zip(best) {
                *dst = v.clamp(0.0, 1.0);
            }
        }
    });
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(w: usize, h: usize) -> PixelBuffer {
        let data = (0..h)
            .flat_map(|_| (0..w).flat_map(move |x| if x < w / 2 { [0.0; 3] } else { [1.0; 3] }))
            .collect();
        PixelBuffer::from_data(w, h, data).unwrap()
    }

    #[test]
    fn test_flat_is_identity() {
        let img = PixelBuffer::filled(7, 5, [0.1, 0.4, 0.8]);
        let out = kuwahara(&img, &KuwaharaParams { radius: 3 }).unwrap();
        assert!(out.max_abs_diff(&img).unwrap() < 1e-6);
    }

    #[test]
    fn test_step_edge_preserved() {
        let img = step(8, 4);
        let out = kuwahara(&img, &KuwaharaParams { radius: 2 }).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn test_outlier_removed() {
        let mut img = PixelBuffer::filled(9, 9, [0.2; 3]);
        img.set_pixel(4, 4, [1.0; 3]);
        let out = kuwahara(&img, &KuwaharaParams { radius: 2 }).unwrap();
        assert!((out.pixel(4, 4)[0] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_zero_radius_is_identity() {
        let mut img = PixelBuffer::filled(5, 5, [0.3; 3]);
        img.set_pixel(1, 3, [0.9, 0.1, 0.5]);
        let out = kuwahara(&img, &KuwaharaParams { radius: 0 }).unwrap();
        assert!(out.max_abs_diff(&img).unwrap() < 1e-6);
    }

    #[test]
    fn test_radius_larger_than_image() {
        let img = step(4, 3);
        let out = kuwahara(&img, &KuwaharaParams { radius: 9 }).unwrap();
        assert_eq!(out.dimensions(), (4, 3));
        assert!(out.data().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_huge_radius_capped_at_image_size() {
        let mut img = PixelBuffer::filled(4, 4, [0.5; 3]);
        img.set_pixel(1, 2, [0.9, 0.2, 0.4]);
        let huge = kuwahara(&img, &KuwaharaParams { radius: 100_000 }).unwrap();
        let capped = kuwahara(&img, &KuwaharaParams { radius: 4 }).unwrap();
        assert_eq!(huge, capped);
    }
}
