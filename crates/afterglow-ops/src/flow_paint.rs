//! Flow-paint: colour advected along isophotes.
//!
//! A velocity field is derived once from the blurred luminance gradient,
//! rotated 90° so it follows lines of constant brightness. A lattice of
//! sample points, one every `stride` pixels, then walks that field for
//! `steps` iterations. Each iteration the points pick up the source colour
//! at their new position and stamp it back onto their home grid cell, and
//! the whole canvas is softened by a small Gaussian. The strokes build up
//! over the iterations.

use afterglow_core::{Field, PixelBuffer, CHANNELS};
use afterglow_math::{sample_bilinear, SeededRng};
#[allow(unused_imports)]
use tracing::{debug, info, trace};

use crate::cancel::CancelToken;
use crate::filter::{gaussian_blur, gradient};
use crate::{params, OpsResult};

/// Softening applied to the canvas after every iteration.
const CANVAS_SIGMA: f32 = 0.5;
const SPEED_EPSILON: f32 = 1e-6;

/// Parameters for [`flow_paint`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FlowPaintParams {
    /// Advection iterations.
    pub steps: u32,
    /// Lattice spacing in pixels.
    pub stride: usize,
    /// Standard deviation of the per-step direction noise.
    pub jitter: f32,
    /// Gaussian sigma applied to luminance before taking the gradient.
    pub blur: f32,
    /// Jitter seed.
    pub seed: u64,
}

impl Default for FlowPaintParams {
    fn default() -> Self {
        Self {
            steps: 400,
            stride: 3,
            jitter: 0.3,
            blur: 1.2,
            seed: 7,
        }
    }
}

impl FlowPaintParams {
    /// Checks `stride >= 1`, `jitter >= 0` and `blur >= 0`.
    pub fn validate(&self) -> OpsResult<()> {
        params::at_least("stride", self.stride, 1)?;
        params::non_negative("jitter", self.jitter)?;
        params::non_negative("blur", self.blur)?;
        Ok(())
    }
}

/// Isophote-following velocity `(vx, vy) = (-∂L/∂y, ∂L/∂x)`.
#[derive(Debug, Clone)]
pub struct VelocityField {
    /// Horizontal component.
    pub vx: Field,
    /// Vertical component.
    pub vy: Field,
}

impl VelocityField {
    /// Derives the field from luminance blurred with `sigma`.
    pub fn from_luminance(lum: &Field, sigma: f32) -> Self {
        let smooth = gaussian_blur(lum, sigma);
        let (gy, gx) = gradient(&smooth);
        Self {
            vx: gy.map(|v| -v),
            vy: gx,
        }
    }
}

/// Strided sample positions carried across iterations.
#[derive(Debug, Clone)]
pub struct SampleLattice {
    rows: usize,
    cols: usize,
    stride: usize,
    xs: Vec<f32>,
    ys: Vec<f32>,
}

impl SampleLattice {
    /// One point at every `stride`-th row and column, starting at 0.
    pub fn new(width: usize, height: usize, stride: usize) -> Self {
        let stride = stride.max(1);
        let rows = height.div_ceil(stride);
        let cols = width.div_ceil(stride);
        let mut xs = Vec::with_capacity(rows * cols);
        let mut ys = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                xs.push((c * stride) as f32);
                ys.push((r * stride) as f32);
            }
        }
        Self { rows, cols, stride, xs, ys }
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    /// Returns `true` if the lattice has no points.
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Current `(x, y)` of point `i`.
    pub fn position(&self, i: usize) -> (f32, f32) {
        (self.xs[i], self.ys[i])
    }

    /// Moves every point one normalised step along `field`, plus jitter,
    /// clamped to the image.
    fn advect(&mut self, field: &VelocityField, jitter: f32, rng: &mut SeededRng, w: usize, h: usize) {
        let n = self.len();
        let mut dx = Vec::with_capacity(n);
        let mut dy = Vec::with_capacity(n);
        for i in 0..n {
            let vx = sample_bilinear(&field.vx, self.ys[i], self.xs[i]);
            let vy = sample_bilinear(&field.vy, self.ys[i], self.xs[i]);
            let mag = (vx * vx + vy * vy).sqrt() + SPEED_EPSILON;
            dx.push(vx / mag);
            dy.push(vy / mag);
        }
        let jx = rng.gaussian_vec(n, jitter);
        let jy = rng.gaussian_vec(n, jitter);

        let max_x = w.saturating_sub(1) as f32;
        let max_y = h.saturating_sub(1) as f32;
        for i in 0..n {
            self.ys[i] = (self.ys[i] + dy[i] + jy[i]).clamp(0.0, max_y);
            self.xs[i] = (self.xs[i] + dx[i] + jx[i]).clamp(0.0, max_x);
        }
    }

    /// Samples `sources` at the current positions and writes each value to
    /// the point's home cell in `canvas`.
    fn stamp(&self, sources: &[Field; CHANNELS], canvas: &mut [Field; CHANNELS]) {
        for r in 0..self.rows {
            for c in 0..self.cols {
                let i = r * self.cols + c;
                let (hx, hy) = (c * self.stride, r * self.stride);
                for (src, dst) in sources.iter().zip(canvas.iter_mut()) {
                    dst.set(hx, hy, sample_bilinear(src, self.ys[i], self.xs[i]));
                }
            }
        }
    }
}

/// Paints `src` with colour dragged along its isophotes.
///
/// `cancel` is polled before every iteration.
///
/// # Errors
///
/// Invalid parameters, or [`OpsError::Cancelled`](crate::OpsError::Cancelled)
/// with the number of iterations already applied.
pub fn flow_paint(src: &PixelBuffer, p: &FlowPaintParams, cancel: &CancelToken) -> OpsResult<PixelBuffer> {
    p.validate()?;
    let (w, h) = src.dimensions();
    debug!(w, h, steps = p.steps, stride = p.stride, jitter = p.jitter, seed = p.seed, "flow_paint");

    let field = VelocityField::from_luminance(&src.luminance(), p.blur);
    let sources = src.planes();
    let mut canvas = src.planes();
    let mut lattice = SampleLattice::new(w, h, p.stride);
    let mut rng = SeededRng::new(p.seed);

    for done in 0..p.steps as usize {
        cancel.check(done)?;
        lattice.advect(&field, p.jitter, &mut rng, w, h);
        lattice.stamp(&sources, &mut canvas);
        for plane in canvas.iter_mut() {
            *plane = gaussian_blur(plane, CANVAS_SIGMA);
        }
    }
    info!(steps = p.steps, points = lattice.len(), "flow_paint done");

    Ok(PixelBuffer::from_planes(&canvas)?.clamped())
}
