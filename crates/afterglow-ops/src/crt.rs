//! Retro CRT tube: barrel curvature, scanlines, aperture-grille mask and
//! vignette.
//!
//! Coordinates are normalised to [-1, 1] around the pixel-grid centre
//! `((w-1)/2, (h-1)/2)`. The curvature pass resamples through
//! [`remap_buffer`]; the remaining passes are per-pixel gains.

use std::f32::consts::PI;

use afterglow_core::PixelBuffer;
use afterglow_math::{remap_buffer, CoordinateMap};
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::params;
use crate::OpsResult;

/// Parameters for [`crt`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CrtParams {
    /// Darkening depth of alternate rows.
    pub scanline_strength: f32,
    /// Corner darkening.
    pub vignette: f32,
    /// Barrel distortion coefficient `k` in `x' = x(1 + k·r²)`.
    pub curvature: f32,
    /// RGB stripe mask blend: a pixel's own stripe channel is scaled by
    /// `1 + m`, the other two by `1 - m`.
    pub mask_strength: f32,
}

impl Default for CrtParams {
    fn default() -> Self {
        Self {
            scanline_strength: 0.25,
            vignette: 0.35,
            curvature: 0.08,
            mask_strength: 0.2,
        }
    }
}

impl CrtParams {
    /// All four values must be finite.
    pub fn validate(&self) -> OpsResult<()> {
        params::finite("scanline_strength", self.scanline_strength)?;
        params::finite("vignette", self.vignette)?;
        params::finite("curvature", self.curvature)?;
        params::finite("mask_strength", self.mask_strength)?;
        Ok(())
    }
}

/// Normalised coordinate of pixel `i` on an axis centred at `c`.
#[inline]
fn norm(i: usize, c: f32) -> f32 {
    if c > 0.0 { (i as f32 - c) / c } else { 0.0 }
}

/// Applies the CRT look.
///
/// With every parameter at zero the output equals the input.
pub fn crt(src: &PixelBuffer, p: &CrtParams) -> OpsResult<PixelBuffer> {
    p.validate()?;
    let (w, h) = src.dimensions();
    debug!(w, h, curvature = p.curvature, scanlines = p.scanline_strength, "crt");

    let cx = (w as f32 - 1.0) / 2.0;
    let cy = (h as f32 - 1.0) / 2.0;
    let k = p.curvature;

    let map = CoordinateMap::from_fn(w, h, |x, y| {
        let nx = norm(x, cx);
        let ny = norm(y, cy);
        let gain = 1.0 + k * (nx * nx + ny * ny);
        (cy + ny * gain * cy, cx + nx * gain * cx)
    });
    let mut out = remap_buffer(src, &map);

    let r2_max = {
        let (nx, ny) = (norm(0, cx), norm(0, cy));
        nx * nx + ny * ny
    };
    let s = p.scanline_strength;
    let m = p.mask_strength;

    for y in 0..h {
        let line = 1.0 - s + s * ((PI * y as f32 / 2.0).sin() * 0.5 + 0.5);
        let ny = norm(y, cy);
        for x in 0..w {
            let nx = norm(x, cx);
            let r2 = nx * nx + ny * ny;
            let vign = if r2_max > 0.0 { 1.0 - p.vignette * r2 / r2_max } else { 1.0 };
            let stripe = x % 3;
            let px = out.pixel(x, y);
            let mut rgb = [0.0f32; 3];
            for (c, v) in rgb.iter_mut().enumerate() {
                let lit = px[c] * line;
                let mask = if c == stripe { 1.0 } else { 0.0 };
                let masked = (lit * (1.0 - m) + lit * mask * 2.0 * m).clamp(0.0, 1.0);
                *v = masked * vign;
            }
            out.set_pixel(x, y, rgb);
        }
    }
    Ok(out.clamped())
}
