//! Multi-octave value noise.
//!
//! Each octave draws a coarse lattice of uniform samples, upsamples it to
//! full resolution with a smootherstep-weighted bilinear blend and adds it
//! at half the amplitude of the previous octave. The sum is stretched to
//! [-1, 1].
//!
//! This is value noise, not gradient noise: only smooth, layered
//! pseudo-randomness is promised, not agreement with any reference noise.
//!
//! ```rust
//! use afterglow_math::value_noise;
//!
//! let a = value_noise(32, 48, 10.0, 3, 42);
//! let b = value_noise(32, 48, 10.0, 3, 42);
//! assert_eq!(a, b);
//! assert_eq!(a.dimensions(), (48, 32));
//! ```

use afterglow_core::Field;
#[allow(unused_imports)]
use tracing::trace;

use crate::interp::{lerp, smootherstep};
use crate::rng::SeededRng;

const SCALE_EPSILON: f32 = 1e-6;
const RANGE_EPSILON: f32 = 1e-6;

/// One octave lattice: `(cells + 2)` samples per axis.
struct Lattice {
    cells_x: usize,
    cells_y: usize,
    stride: usize,
    values: Vec<f32>,
}

impl Lattice {
    fn draw(width: usize, height: usize, frequency: f32, rng: &mut SeededRng) -> Self {
        // At most one cell per pixel.
        let cells_x = ((width as f32 * frequency).floor() as usize).clamp(1, width);
        let cells_y = ((height as f32 * frequency).floor() as usize).clamp(1, height);
        let stride = cells_x + 2;
        let values = (0..(cells_y + 2) * stride).map(|_| rng.uniform()).collect();
        Self {
            cells_x,
            cells_y,
            stride,
            values,
        }
    }

    #[inline]
    fn at(&self, lx: usize, ly: usize) -> f32 {
        self.values[ly * self.stride + lx]
    }

    /// Adds this lattice, upsampled to `width × height`, into `acc`.
    fn accumulate(&self, acc: &mut [f32], width: usize, height: usize, amplitude: f32) {
        let sx = self.cells_x as f32 / width as f32;
        let sy = self.cells_y as f32 / height as f32;
        for y in 0..height {
            let gy = y as f32 * sy;
            let y0 = gy.floor() as usize;
            let ty = smootherstep(gy - y0 as f32);
            for x in 0..width {
                let gx = x as f32 * sx;
                let x0 = gx.floor() as usize;
                let tx = smootherstep(gx - x0 as f32);
                let top = lerp(self.at(x0, y0), self.at(x0 + 1, y0), tx);
                let bot = lerp(self.at(x0, y0 + 1), self.at(x0 + 1, y0 + 1), tx);
                acc[y * width + x] += lerp(top, bot, ty) * amplitude;
            }
        }
    }
}

/// Generates a `width × height` value-noise field in [-1, 1].
///
/// `scale` sets the feature size of the first octave in pixels (the lattice
/// has roughly `dim / scale` cells per axis); each further octave doubles
/// the frequency and halves the amplitude. `octaves` below 1 is treated as
/// 1. Identical arguments always produce a bit-identical field.
pub fn value_noise(height: usize, width: usize, scale: f32, octaves: u32, seed: u64) -> Field {
    trace!(width, height, scale, octaves, seed, "value_noise");
    if width == 0 || height == 0 {
        return Field::new(width, height);
    }

    let mut rng = SeededRng::new(seed);
    let mut acc = vec![0.0f32; width * height];
    let mut frequency = 1.0 / scale.max(SCALE_EPSILON);
    let mut amplitude = 1.0f32;
    let mut total = 0.0f32;

    for _ in 0..octaves.max(1) {
        let lattice = Lattice::draw(width, height, frequency, &mut rng);
        lattice.accumulate(&mut acc, width, height, amplitude);
        total += amplitude;
        amplitude *= 0.5;
        frequency *= 2.0;
    }

    for v in &mut acc {
        *v /= total.max(SCALE_EPSILON);
    }

    let (lo, hi) = acc
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = (hi - lo).max(RANGE_EPSILON);
    for v in &mut acc {
        *v = (*v - lo) / range * 2.0 - 1.0;
    }

    Field::from_vec(width, height, acc).unwrap_or_else(|_| Field::new(width, height))
}
