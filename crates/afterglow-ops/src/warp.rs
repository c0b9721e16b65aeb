//! Noise warp and kaleidoscope.
//!
//! Both effects work the ST-map way: build a [`CoordinateMap`] of source
//! positions for every destination pixel, then resample all three planes
//! through it with the mirror boundary of [`remap_buffer`].

use std::f32::consts::PI;

use afterglow_core::PixelBuffer;
use afterglow_math::{remap_buffer, value_noise, CoordinateMap};
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::params;
use crate::OpsResult;

/// Second noise field scale factor, so the two axes do not move in lockstep.
const NY_SCALE: f32 = 1.3;

/// Parameters for [`perlin_warp`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WarpParams {
    /// Feature size of the first noise octave in pixels.
    pub scale: f32,
    /// Maximum displacement in pixels.
    pub intensity: f32,
    /// Noise octaves.
    pub octaves: u32,
    /// Noise seed; the vertical field uses `seed + 1`.
    pub seed: u64,
}

impl Default for WarpParams {
    fn default() -> Self {
        Self {
            scale: 10.0,
            intensity: 12.0,
            octaves: 3,
            seed: 42,
        }
    }
}

impl WarpParams {
    /// Checks `scale > 0`, `octaves >= 1` and a finite intensity.
    pub fn validate(&self) -> OpsResult<()> {
        params::positive("scale", self.scale)?;
        params::finite("intensity", self.intensity)?;
        params::at_least("octaves", self.octaves as usize, 1)?;
        Ok(())
    }
}

/// Displaces every pixel by two independent value-noise fields.
///
/// The source position of `(x, y)` is
/// `(x + intensity·Nx(x, y), y + intensity·Ny(x, y))`, where `Nx` is built
/// from `(scale, seed)` and `Ny` from `(scale·1.3, seed+1)`.
///
/// # Example
///
/// ```rust
/// use afterglow_core::PixelBuffer;
/// use afterglow_ops::warp::{perlin_warp, WarpParams};
///
/// let img = PixelBuffer::filled(32, 24, [0.3, 0.6, 0.9]);
/// let out = perlin_warp(&img, &WarpParams::default()).unwrap();
/// // A flat image stays flat under any displacement.
/// assert!(out.max_abs_diff(&img).unwrap() < 1e-5);
/// ```
pub fn perlin_warp(src: &PixelBuffer, p: &WarpParams) -> OpsResult<PixelBuffer> {
    p.validate()?;
    let (w, h) = src.dimensions();
    debug!(w, h, scale = p.scale, intensity = p.intensity, octaves = p.octaves, seed = p.seed, "perlin_warp");

    let nx = value_noise(h, w, p.scale, p.octaves, p.seed);
    let ny = value_noise(h, w, p.scale * NY_SCALE, p.octaves, p.seed.wrapping_add(1));

    let map = CoordinateMap::from_fn(w, h, |x, y| {
        (
            y as f32 + p.intensity * ny.get(x, y),
            x as f32 + p.intensity * nx.get(x, y),
        )
    });
    Ok(remap_buffer(src, &map).clamped())
}

/// Parameters for [`kaleidoscope`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct KaleidoscopeParams {
    /// Number of mirrored sectors (at least 2).
    pub slices: u32,
    /// Rendered disc radius relative to the half-size of the shorter side.
    pub radius: f32,
}

impl Default for KaleidoscopeParams {
    fn default() -> Self {
        Self {
            slices: 8,
            radius: 1.0,
        }
    }
}

impl KaleidoscopeParams {
    /// Checks `slices >= 2` and a finite radius.
    pub fn validate(&self) -> OpsResult<()> {
        params::at_least("slices", self.slices as usize, 2)?;
        params::finite("radius", self.radius)?;
        Ok(())
    }
}

/// Folds the image into `slices` mirrored sectors around its centre.
///
/// Polar angle around `(w/2, h/2)` is reduced modulo `2π/slices` and
/// mirrored into `[0, π/slices]`; the radius is kept. Pixels farther than
/// `radius · min(w/2, h/2)` from the centre are black.
pub fn kaleidoscope(src: &PixelBuffer, p: &KaleidoscopeParams) -> OpsResult<PixelBuffer> {
    p.validate()?;
    let (w, h) = src.dimensions();
    debug!(w, h, slices = p.slices, radius = p.radius, "kaleidoscope");

    let cx = w as f32 / 2.0;
    let cy = h as f32 / 2.0;
    let sector = 2.0 * PI / p.slices as f32;
    let half = sector / 2.0;
    let r_max = p.radius * cx.min(cy);

    let map = CoordinateMap::from_fn(w, h, |x, y| {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        let r = (dx * dx + dy * dy).sqrt();
        let mut theta = dy.atan2(dx).rem_euclid(sector);
        if theta > half {
            theta = sector - theta;
        }
        (cy + r * theta.sin(), cx + r * theta.cos())
    });

    let mut out = remap_buffer(src, &map);
    for y in 0..h {
        let dy = y as f32 - cy;
        for x in 0..w {
            let dx = x as f32 - cx;
            if (dx * dx + dy * dy).sqrt() > r_max {
                out.set_pixel(x, y, [0.0; 3]);
            }
        }
    }
    Ok(out.clamped())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(w: usize, h: usize) -> PixelBuffer {
        let data = (0..w * h * 3).map(|i| ((i * 37) % 101) as f32 / 100.0).collect();
        PixelBuffer::from_data(w, h, data).unwrap()
    }

    #[test]
    fn test_warp_deterministic() {
        let img = pattern(24, 20);
        let a = perlin_warp(&img, &WarpParams::default()).unwrap();
        let b = perlin_warp(&img, &WarpParams::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_warp_zero_intensity_is_identity() {
        let img = pattern(16, 12);
        let p = WarpParams { intensity: 0.0, ..Default::default() };
        let out = perlin_warp(&img, &p).unwrap();
        assert!(out.max_abs_diff(&img).unwrap() < 1e-6);
    }

    #[test]
    fn test_warp_moves_pixels() {
        let img = pattern(32, 32);
        let out = perlin_warp(&img, &WarpParams::default()).unwrap();
        assert!(out.max_abs_diff(&img).unwrap() > 0.01);
        assert!(out.data().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_warp_rejects_bad_params() {
        let img = pattern(4, 4);
        assert!(perlin_warp(&img, &WarpParams { scale: 0.0, ..Default::default() }).is_err());
        assert!(perlin_warp(&img, &WarpParams { octaves: 0, ..Default::default() }).is_err());
    }

    #[test]
    fn test_warp_max_seed_wraps() {
        let img = pattern(8, 8);
        let p = WarpParams { seed: u64::MAX, ..Default::default() };
        assert!(perlin_warp(&img, &p).is_ok());
    }

    #[test]
    fn test_kaleidoscope_rejects_one_slice() {
        let img = pattern(8, 8);
        let p = KaleidoscopeParams { slices: 1, radius: 1.0 };
        assert!(kaleidoscope(&img, &p).is_err());
    }

    #[test]
    fn test_kaleidoscope_two_slices_keeps_first_quadrant() {
        let img = pattern(21, 21);
        let out = kaleidoscope(&img, &KaleidoscopeParams { slices: 2, radius: 1.0 }).unwrap();
        let (cx, cy) = (10.5f32, 10.5f32);
        for y in 11..21 {
            for x in 11..21 {
                let (dx, dy) = (x as f32 - cx, y as f32 - cy);
                if (dx * dx + dy * dy).sqrt() > cx {
                    continue;
                }
                let a = img.pixel(x, y);
                let b = out.pixel(x, y);
                for c in 0..3 {
                    assert!((a[c] - b[c]).abs() < 1e-3, "({x},{y}) {a:?} vs {b:?}");
                }
            }
        }
    }

    #[test]
    fn test_kaleidoscope_outside_disc_black() {
        let img = PixelBuffer::filled(20, 10, [1.0; 3]);
        let out = kaleidoscope(&img, &KaleidoscopeParams::default()).unwrap();
        assert_eq!(out.pixel(0, 0), [0.0; 3]);
        assert_eq!(out.pixel(19, 0), [0.0; 3]);
        assert_eq!(out.pixel(10, 5), [1.0; 3]);
    }

    #[test]
    fn test_kaleidoscope_zero_radius_all_black_but_centre() {
        let img = PixelBuffer::filled(8, 8, [1.0; 3]);
        let out = kaleidoscope(&img, &KaleidoscopeParams { slices: 6, radius: 0.0 }).unwrap();
        assert_eq!(out.pixel(4, 4), [1.0; 3]);
        assert_eq!(out.pixel(3, 4), [0.0; 3]);
    }
}
