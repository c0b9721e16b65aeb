//! Circular-dot halftone.
//!
//! The image is cut into `cell × cell` blocks (edge blocks truncated). Each
//! block's mean luminance sets the radius of one black dot centred in the
//! block, `(1 − mean)·cell·√2/2`, so a black block is fully covered and a
//! white block gets no dot. Dots of radius 0.5 or less are skipped.
//!
//! [`halftone_layout`] returns the dots without painting them;
//! [`halftone`] paints them onto a white [`RasterCanvas`].

use std::f32::consts::SQRT_2;

use afterglow_core::PixelBuffer;
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::draw::{Canvas, RasterCanvas};
use crate::{params, OpsResult};

const MIN_DOT_RADIUS: f32 = 0.5;
const CONTRAST_EPSILON: f32 = 1e-5;

/// Parameters for [`halftone`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HalftoneParams {
    /// Grid cell size in pixels.
    pub cell: usize,
    /// Tone response; luminance is raised to `1/contrast` before averaging.
    pub contrast: f32,
}

impl Default for HalftoneParams {
    fn default() -> Self {
        Self {
            cell: 8,
            contrast: 1.0,
        }
    }
}

impl HalftoneParams {
    /// Checks `cell >= 1` and a finite contrast.
    pub fn validate(&self) -> OpsResult<()> {
        params::at_least("cell", self.cell, 1)?;
        params::finite("contrast", self.contrast)?;
        Ok(())
    }
}

/// One halftone dot, in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dot {
    /// Centre x.
    pub cx: f32,
    /// Centre y.
    pub cy: f32,
    /// Radius.
    pub radius: f32,
}

/// Computes the dots for `src` without drawing them.
pub fn halftone_layout(src: &PixelBuffer, p: &HalftoneParams) -> OpsResult<Vec<Dot>> {
    p.validate()?;
    let (w, h) = src.dimensions();
    let mut lum = src.luminance();
    if p.contrast != 1.0 {
        let gamma = 1.0 / p.contrast.max(CONTRAST_EPSILON);
        lum = lum.map(|v| v.clamp(0.0, 1.0).powf(gamma));
    }

    let cell = p.cell;
    let radius_max = cell as f32 * SQRT_2 / 2.0;
    let mut dots = Vec::new();

    for y0 in (0..h).step_by(cell) {
        let y1 = (y0 + cell).min(h);
        for x0 in (0..w).step_by(cell) {
            let x1 = (x0 + cell).min(w);
            let mut sum = 0.0f32;
            for y in y0..y1 {
                sum += lum.row(y)[x0..x1].iter().sum::<f32>();
            }
            let mean = sum / ((y1 - y0) * (x1 - x0)) as f32;
            let radius = ((1.0 - mean) * radius_max).max(0.0);
            if radius > MIN_DOT_RADIUS {
                dots.push(Dot {
                    cx: x0 as f32 + (x1 - x0) as f32 / 2.0,
                    cy: y0 as f32 + (y1 - y0) as f32 / 2.0,
                    radius,
                });
            }
        }
    }
    trace!(w, h, cell, dots = dots.len(), "halftone_layout");
    Ok(dots)
}

/// Renders the halftone as black dots on white.
///
/// # Example
///
/// ```rust
/// use afterglow_core::PixelBuffer;
/// use afterglow_ops::halftone::{halftone, HalftoneParams};
///
/// let img = PixelBuffer::filled(16, 16, [1.0, 1.0, 1.0]);
/// let out = halftone(&img, &HalftoneParams::default()).unwrap();
/// assert!(out.data().iter().all(|&v| v == 1.0));
/// ```
pub fn halftone(src: &PixelBuffer, p: &HalftoneParams) -> OpsResult<PixelBuffer> {
    let dots = halftone_layout(src, p)?;
    let (w, h) = src.dimensions();
    debug!(w, h, cell = p.cell, dots = dots.len(), "halftone");
    let mut canvas = RasterCanvas::new(w, h, [1.0; 3]);
    for dot in &dots {
        canvas.fill_disc(dot.cx, dot.cy, dot.radius, [0.0; 3]);
    }
    Ok(canvas.into_buffer())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mid_gray_single_centred_dot() {
        let img = PixelBuffer::filled(4, 4, [0.5; 3]);
        let dots = halftone_layout(&img, &HalftoneParams { cell: 4, contrast: 1.0 }).unwrap();
        assert_eq!(dots.len(), 1);
        assert_relative_eq!(dots[0].cx, 2.0);
        assert_relative_eq!(dots[0].cy, 2.0);
        assert_relative_eq!(dots[0].radius, 0.5 * 4.0 * SQRT_2 / 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_mid_gray_render_is_symmetric() {
        let img = PixelBuffer::filled(4, 4, [0.5; 3]);
        let out = halftone(&img, &HalftoneParams { cell: 4, contrast: 1.0 }).unwrap();
        assert_eq!(out.pixel(1, 1), [0.0; 3]);
        assert_eq!(out.pixel(2, 2), [0.0; 3]);
        assert_eq!(out.pixel(0, 0), [1.0; 3]);
        assert_eq!(out.pixel(3, 0), [1.0; 3]);
    }

    #[test]
    fn test_black_covers_white_skips() {
        let black = PixelBuffer::filled(8, 8, [0.0; 3]);
        let dots = halftone_layout(&black, &HalftoneParams::default()).unwrap();
        assert_relative_eq!(dots[0].radius, 8.0 * SQRT_2 / 2.0, epsilon = 1e-5);
        let out = halftone(&black, &HalftoneParams::default()).unwrap();
        assert!(out.data().iter().all(|&v| v == 0.0));

        let white = PixelBuffer::filled(8, 8, [1.0; 3]);
        assert!(halftone_layout(&white, &HalftoneParams::default()).unwrap().is_empty());
    }

    #[test]
    fn test_edge_blocks_truncated() {
        let img = PixelBuffer::filled(10, 5, [0.0; 3]);
        let dots = halftone_layout(&img, &HalftoneParams { cell: 4, contrast: 1.0 }).unwrap();
        assert_eq!(dots.len(), 3 * 2);
        let last = dots[dots.len() - 1];
        assert_relative_eq!(last.cx, 9.0);
        assert_relative_eq!(last.cy, 4.5);
    }

    #[test]
    fn test_contrast_shrinks_dots() {
        let img = PixelBuffer::filled(8, 8, [0.4; 3]);
        let base = halftone_layout(&img, &HalftoneParams { cell: 8, contrast: 1.0 }).unwrap();
        let hard = halftone_layout(&img, &HalftoneParams { cell: 8, contrast: 2.0 }).unwrap();
        assert!(hard[0].radius < base[0].radius);
    }

    #[test]
    fn test_zero_cell_rejected() {
        let img = PixelBuffer::filled(4, 4, [0.5; 3]);
        assert!(halftone(&img, &HalftoneParams { cell: 0, contrast: 1.0 }).is_err());
    }
}
