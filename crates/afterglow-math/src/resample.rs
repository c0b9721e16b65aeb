//! Bilinear resampling with a mirror boundary.
//!
//! Every geometric effect works the ST-map way: it builds a
//! [`CoordinateMap`] holding, for each destination pixel, the fractional
//! source position to read, and hands it to [`remap_buffer`]. Sampling is
//! always bilinear and always mirrors out-of-range coordinates back into the
//! image through [`reflect_coord`], so warp, kaleidoscope, CRT and
//! flow-paint share one boundary behaviour.
//!
//! When the `parallel` feature is enabled the three colour planes are
//! resampled on rayon.
//!
//! # Example
//!
//! ```rust
//! use afterglow_core::PixelBuffer;
//! use afterglow_math::{remap_buffer, CoordinateMap};
//!
//! let src = PixelBuffer::filled(16, 16, [0.2, 0.4, 0.6]);
//! // Mirror horizontally.
//! let map = CoordinateMap::from_fn(16, 16, |x, y| (y as f32, 15.0 - x as f32));
//! let out = remap_buffer(&src, &map);
//! assert_eq!(out.dimensions(), (16, 16));
//! ```

use afterglow_core::{Field, PixelBuffer};
use glam::Vec2;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
#[allow(unused_imports)]
use tracing::trace;

use crate::interp::reflect_coord;

/// Per-destination-pixel fractional source coordinates.
#[derive(Debug, Clone)]
pub struct CoordinateMap {
    width: usize,
    height: usize,
    src_y: Vec<f32>,
    src_x: Vec<f32>,
}

impl CoordinateMap {
    /// Builds a map by evaluating `f(x, y) -> (src_y, src_x)` for every
    /// destination pixel.
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> (f32, f32),
    {
        let mut src_y = Vec::with_capacity(width * height);
        let mut src_x = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let (sy, sx) = f(x, y);
                src_y.push(sy);
                src_x.push(sx);
            }
        }
        Self { width, height, src_y, src_x }
    }

    /// The identity map.
    pub fn identity(width: usize, height: usize) -> Self {
        Self::from_fn(width, height, |x, y| (y as f32, x as f32))
    }

    /// Destination width.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Destination height.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Source coordinate `(src_y, src_x)` for destination `(x, y)`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> (f32, f32) {
        let i = y * self.width + x;
        (self.src_y[i], self.src_x[i])
    }
}

/// Samples `field` at fractional `(y, x)` with bilinear interpolation.
///
/// Coordinates outside `[0, dim-1]` are mirrored back in. An empty field
/// yields 0; a 1×1 field yields its only value.
#[inline]
pub fn sample_bilinear(field: &Field, y: f32, x: f32) -> f32 {
    let (w, h) = field.dimensions();
    if w == 0 || h == 0 {
        return 0.0;
    }

    let x = reflect_coord(x, w);
    let y = reflect_coord(y, h);

    let x0 = (x.floor() as usize).min(w - 1);
    let y0 = (y.floor() as usize).min(h - 1);
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);

    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let data = field.data();
    let p00 = data[y0 * w + x0];
    let p10 = data[y0 * w + x1];
    let p01 = data[y1 * w + x0];
    let p11 = data[y1 * w + x1];

    let top = p00 * (1.0 - fx) + p10 * fx;
    let bot = p01 * (1.0 - fx) + p11 * fx;
    top * (1.0 - fy) + bot * fy
}

/// [`sample_bilinear`] taking a point with `x`/`y` components.
#[inline]
pub fn sample_at(field: &Field, p: Vec2) -> f32 {
    sample_bilinear(field, p.y, p.x)
}

/// Samples `field` at each point of `points`.
pub fn sample_points(field: &Field, points: &[Vec2]) -> Vec<f32> {
    points.iter().map(|&p| sample_at(field, p)).collect()
}

/// Resamples one field through a coordinate map.
pub fn remap(field: &Field, map: &CoordinateMap) -> Field {
    let mut out = Vec::with_capacity(map.width * map.height);
    for (&sy, &sx) in map.src_y.iter().zip(&map.src_x) {
        out.push(sample_bilinear(field, sy, sx));
    }
    Field::from_vec(map.width, map.height, out).unwrap_or_else(|_| Field::new(map.width, map.height))
}

/// Resamples every channel of `src` through a coordinate map.
#[cfg(feature = "parallel")]
pub fn remap_buffer(src: &PixelBuffer, map: &CoordinateMap) -> PixelBuffer {
    trace!(w = map.width, h = map.height, "remap_buffer");
    let planes = src.planes();
    let out: Vec<Field> = planes.as_slice().par_iter().map(|p| remap(p, map)).collect();
    assemble(out, map)
}

/// Resamples every channel of `src` through a coordinate map (single-threaded fallback).
#[cfg(not(feature = "parallel"))]
pub fn remap_buffer(src: &PixelBuffer, map: &CoordinateMap) -> PixelBuffer {
    trace!(w = map.width, h = map.height, "remap_buffer");
    let out: Vec<Field> = src.planes().iter().map(|p| remap(p, map)).collect();
    assemble(out, map)
}

fn assemble(planes: Vec<Field>, map: &CoordinateMap) -> PixelBuffer {
    <[Field; 3]>::try_from(planes)
        .ok()
        .and_then(|planes| PixelBuffer::from_planes(&planes).ok())
        .unwrap_or_else(|| PixelBuffer::new(map.width, map.height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ramp(w: usize, h: usize) -> Field {
        Field::from_fn(w, h, |x, y| x as f32 + 10.0 * y as f32)
    }

    #[test]
    fn test_integer_coords_exact() {
        let f = ramp(5, 4);
        assert_relative_eq!(sample_bilinear(&f, 2.0, 3.0), 23.0);
        assert_relative_eq!(sample_bilinear(&f, 0.0, 0.0), 0.0);
        assert_relative_eq!(sample_bilinear(&f, 3.0, 4.0), 34.0);
    }

    #[test]
    fn test_fractional_is_linear() {
        let f = ramp(5, 4);
        assert_relative_eq!(sample_bilinear(&f, 1.5, 2.25), 17.25, epsilon = 1e-5);
    }

    #[test]
    fn test_reflects_outside() {
        let f = ramp(5, 4);
        // x = -1 mirrors to x = 1
        assert_relative_eq!(sample_bilinear(&f, 0.0, -1.0), 1.0);
        // x = 5 mirrors to x = 3
        assert_relative_eq!(sample_bilinear(&f, 0.0, 5.0), 3.0);
        // y = -2 mirrors to y = 2
        assert_relative_eq!(sample_bilinear(&f, -2.0, 0.0), 20.0);
    }

    #[test]
    fn test_single_pixel() {
        let f = Field::filled(1, 1, 0.7);
        assert_relative_eq!(sample_bilinear(&f, 12.3, -4.0), 0.7);
        assert_relative_eq!(sample_bilinear(&f, f32::NAN, 0.0), 0.7);
    }

    #[test]
    fn test_identity_remap() {
        let data: Vec<f32> = (0..6 * 5 * 3).map(|i| (i % 7) as f32 / 7.0).collect();
        let src = PixelBuffer::from_data(6, 5, data).unwrap();
        let out = remap_buffer(&src, &CoordinateMap::identity(6, 5));
        assert!(out.max_abs_diff(&src).unwrap() < 1e-6);
    }

    #[test]
    fn test_sample_points() {
        let f = ramp(4, 4);
        let v = sample_points(&f, &[Vec2::new(1.0, 2.0), Vec2::new(3.0, 0.0)]);
        assert_relative_eq!(v[0], 21.0);
        assert_relative_eq!(v[1], 3.0);
    }
}
