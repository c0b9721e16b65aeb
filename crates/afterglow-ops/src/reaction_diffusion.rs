//! Gray-Scott reaction-diffusion stylisation.
//!
//! Two concentration grids evolve under
//!
//! ```text
//! reaction = A·B²
//! A' = clamp(A + dA·∇²A − reaction + feed·(1 − A), 0, 1)
//! B' = clamp(B + dB·∇²B + reaction − (kill + feed)·B, 0, 1)
//! ```
//!
//! with the 3×3 stencil of [`Kernel::gray_scott_laplacian`] and a mirrored
//! border. Every step reads only the previous state and writes into a
//! second pair of grids, which are then swapped in.
//!
//! `B` is seeded from the source: 0.1 where luminance is above its mean,
//! plus N(0, 0.02) noise drawn row-major from the per-call generator. The
//! final `B − A` is normalised and coloured with the palette
//! `(p, √p, 1 − p)`, then mixed over the source.

use afterglow_core::{Field, PixelBuffer};
use afterglow_math::{reflect_index, SeededRng};
#[allow(unused_imports)]
use tracing::{debug, info, trace};

use crate::cancel::CancelToken;
use crate::filter::{rebuild, Kernel};
use crate::parallel::for_each_row;
use crate::{params, OpsResult};

const SEED_LEVEL: f32 = 0.1;
const SEED_NOISE: f32 = 0.02;

/// Parameters for [`reaction_diffusion`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReactionDiffusionParams {
    /// Simulation steps.
    pub steps: u32,
    /// Feed rate.
    pub feed: f32,
    /// Kill rate.
    pub kill: f32,
    /// Diffusion rate of `A`.
    pub diff_a: f32,
    /// Diffusion rate of `B`.
    pub diff_b: f32,
    /// Blend of the pattern over the source, 0 keeps the source.
    pub mix: f32,
    /// Seed for the initial noise.
    pub seed: u64,
    /// Stop early once no cell changes by more than this in one step.
    pub tolerance: Option<f32>,
}

impl Default for ReactionDiffusionParams {
    fn default() -> Self {
        Self {
            steps: 300,
            feed: 0.055,
            kill: 0.062,
            diff_a: 1.0,
            diff_b: 0.5,
            mix: 0.6,
            seed: 123,
            tolerance: None,
        }
    }
}

impl ReactionDiffusionParams {
    /// All rates must be finite; a tolerance must be positive.
    pub fn validate(&self) -> OpsResult<()> {
        params::finite("feed", self.feed)?;
        params::finite("kill", self.kill)?;
        params::finite("diff_a", self.diff_a)?;
        params::finite("diff_b", self.diff_b)?;
        params::finite("mix", self.mix)?;
        if let Some(tol) = self.tolerance {
            params::positive("tolerance", tol)?;
        }
        Ok(())
    }
}

/// The two concentration grids of a running simulation.
#[derive(Debug, Clone)]
pub struct ReactionDiffusionState {
    a: Field,
    b: Field,
}

impl ReactionDiffusionState {
    /// Seeds the state from a luminance field.
    pub fn seeded(lum: &Field, seed: u64) -> Self {
        let (w, h) = lum.dimensions();
        let mean = lum.mean();
        let mut rng = SeededRng::new(seed);
        let noise = rng.gaussian_vec(w * h, SEED_NOISE);
        let b = lum
            .data()
            .iter()
            .zip(noise)
            .map(|(&l, n)| {
                let base = if l > mean { SEED_LEVEL } else { 0.0 };
                (base + n).clamp(0.0, 1.0)
            })
            .collect();
        Self {
            a: Field::filled(w, h, 1.0),
            b: rebuild(w, h, b),
        }
    }

    /// Concentration of `A`.
    pub fn a(&self) -> &Field {
        &self.a
    }

    /// Concentration of `B`.
    pub fn b(&self) -> &Field {
        &self.b
    }

    /// Advances one step; returns the largest per-cell change.
    pub fn step(&mut self, p: &ReactionDiffusionParams) -> f32 {
        let (w, h) = self.a.dimensions();
        let kernel = Kernel::gray_scott_laplacian();
        let a = self.a.data();
        let b = self.b.data();

        let mut next_a = vec![0.0f32; w * h];
        for_each_row(&mut next_a, w, |y, row| {
            for (x, dst) in row.iter_mut().enumerate() {
                let i = y * w + x;
                let reaction = a[i] * b[i] * b[i];
                let lap = laplacian(a, w, h, x, y, &kernel);
                *dst = (a[i] + p.diff_a * lap - reaction + p.feed * (1.0 - a[i])).clamp(0.0, 1.0);
            }
        });

        let mut next_b = vec![0.0f32; w * h];
        for_each_row(&mut next_b, w, |y, row| {
            for (x, dst) in row.iter_mut().enumerate() {
                let i = y * w + x;
                let reaction = a[i] * b[i] * b[i];
                let lap = laplacian(b, w, h, x, y, &kernel);
                *dst = (b[i] + p.diff_b * lap + reaction - (p.kill + p.feed) * b[i]).clamp(0.0, 1.0);
            }
        });

        let delta = a
            .iter()
            .zip(&next_a)
            .chain(b.iter().zip(&next_b))
            .map(|(old, new)| (new - old).abs())
            .fold(0.0f32, f32::max);

        self.a = rebuild(w, h, next_a);
        self.b = rebuild(w, h, next_b);
        delta
    }

    /// `B − A` stretched to [0, 1]; a flat result is 0.5 everywhere.
    pub fn pattern(&self) -> Field {
        self.b
            .zip_map(&self.a, |b, a| b - a)
            .map(|f| f.normalized())
            .unwrap_or_else(|_| Field::filled(self.a.width(), self.a.height(), 0.5))
    }
}

#[inline]
fn laplacian(g: &[f32], w: usize, h: usize, x: usize, y: usize, k: &Kernel) -> f32 {
    let mut sum = 0.0f32;
    for ky in 0..3 {
        let sy = reflect_index(y as isize + ky as isize - 1, h);
        for kx in 0..3 {
            let sx = reflect_index(x as isize + kx as isize - 1, w);
            sum += g[sy * w + sx] * k.data[ky * 3 + kx];
        }
    }
    sum
}

/// Runs the simulation on `src` and mixes the coloured pattern over it.
///
/// `cancel` is polled before every step.
///
/// # Errors
///
/// Invalid parameters, or [`OpsError::Cancelled`](crate::OpsError::Cancelled)
/// with the number of steps already applied.
pub fn reaction_diffusion(
    src: &PixelBuffer,
    p: &ReactionDiffusionParams,
    cancel: &CancelToken,
) -> OpsResult<PixelBuffer> {
    p.validate()?;
    let (w, h) = src.dimensions();
    debug!(w, h, steps = p.steps, feed = p.feed, kill = p.kill, seed = p.seed, "reaction_diffusion");

    let mut state = ReactionDiffusionState::seeded(&src.luminance(), p.seed);
    let mut completed = 0usize;
    for _ in 0..p.steps {
        cancel.check(completed)?;
        let delta = state.step(p);
        completed += 1;
        if p.tolerance.is_some_and(|tol| delta < tol) {
            debug!(completed, delta, "reaction_diffusion converged");
            break;
        }
    }
    info!(completed, "reaction_diffusion done");

    let pattern = state.pattern();
    let mix = p.mix;
    let mut data = Vec::with_capacity(w * h * 3);
    for (px, &v) in src.data().chunks_exact(3).zip(pattern.data()) {
        let palette = [v, v.sqrt(), 1.0 - v];
        for c in 0..3 {
            data.push((px[c] * (1.0 - mix) + palette[c] * mix).clamp(0.0, 1.0));
        }
    }
    Ok(PixelBuffer::from_data(w, h, data)?)
}
