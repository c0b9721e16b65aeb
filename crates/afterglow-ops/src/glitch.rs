//! Digital glitch: chromatic aberration and scanline tearing.
//!
//! All shifts wrap around the row, like a circular buffer.

use afterglow_core::{PixelBuffer, CHANNELS};
use afterglow_math::SeededRng;
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::{params, OpsResult};

/// Every this many rows the red and blue channels drift by one pixel.
const DRIFT_PERIOD: usize = 23;

/// Parameters for [`glitch`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GlitchParams {
    /// Apply chromatic aberration first.
    pub aberration: bool,
    /// Red/blue split in pixels.
    pub shift: i64,
    /// Largest row displacement in pixels.
    pub line_shift: usize,
    /// Probability that a row is displaced.
    pub prob: f32,
    /// Seed for the row displacement.
    pub seed: u64,
}

impl Default for GlitchParams {
    fn default() -> Self {
        Self {
            aberration: true,
            shift: 3,
            line_shift: 12,
            prob: 0.15,
            seed: 1234,
        }
    }
}

impl GlitchParams {
    /// `prob` must lie in [0, 1].
    pub fn validate(&self) -> OpsResult<()> {
        params::in_range("prob", self.prob, 0.0, 1.0)
    }
}

/// Rotates one channel of an interleaved row right by `shift` pixels.
///
/// `None` rotates whole pixels.
fn roll_row(row: &mut [f32], channel: Option<usize>, shift: i64) {
    let n = row.len() / CHANNELS;
    if n == 0 {
        return;
    }
    let k = shift.rem_euclid(n as i64) as usize;
    if k == 0 {
        return;
    }
    match channel {
        None => row.rotate_right(k * CHANNELS),
        Some(c) => {
            let original: Vec<f32> = row.iter().skip(c).step_by(CHANNELS).copied().collect();
            for (x, &v) in original.iter().enumerate() {
                row[((x + k) % n) * CHANNELS + c] = v;
            }
        }
    }
}

/// Shifts red right and blue left by `shift` pixels, wrapping.
///
/// # Example
///
/// ```rust
/// use afterglow_core::PixelBuffer;
/// use afterglow_ops::glitch::chromatic_aberration;
///
/// let mut img = PixelBuffer::filled(4, 1, [0.0, 0.0, 0.0]);
/// img.set_pixel(0, 0, [1.0, 1.0, 1.0]);
/// let out = chromatic_aberration(&img, 1);
/// assert_eq!(out.pixel(1, 0)[0], 1.0);
/// assert_eq!(out.pixel(3, 0)[2], 1.0);
/// ```
pub fn chromatic_aberration(src: &PixelBuffer, shift: i64) -> PixelBuffer {
    trace!(w = src.width(), h = src.height(), shift, "chromatic_aberration");
    let mut out = src.clone();
    // Reduced first so the opposite roll never negates i64::MIN.
    let k = shift.rem_euclid(src.width().max(1) as i64);
    for y in 0..src.height() {
        let row = out.row_mut(y);
        roll_row(row, Some(0), k);
        roll_row(row, Some(2), -k);
    }
    out
}

/// Randomly displaces rows horizontally.
///
/// One generator is created from `seed` per call. For each row a uniform
/// draw below `prob` triggers a second draw, an integer offset in
/// `[-line_shift, line_shift]`, by which the row is rolled. Rows whose index
/// is a multiple of 23 then also roll red by +1 and blue by -1.
pub fn scanline_glitch(src: &PixelBuffer, line_shift: usize, prob: f32, seed: u64) -> PixelBuffer {
    let mut rng = SeededRng::new(seed);
    let bound = i64::try_from(line_shift).unwrap_or(i64::MAX);
    let mut out = src.clone();
    let mut torn = 0usize;
    for y in 0..src.height() {
        let row = out.row_mut(y);
        if rng.uniform() < prob {
            roll_row(row, None, rng.int_inclusive(-bound, bound));
            torn += 1;
        }
        if y % DRIFT_PERIOD == 0 {
            roll_row(row, Some(0), 1);
            roll_row(row, Some(2), -1);
        }
    }
    trace!(torn, "scanline_glitch");
    out
}

/// Chromatic aberration (when enabled) followed by the scanline glitch.
pub fn glitch(src: &PixelBuffer, p: &GlitchParams) -> OpsResult<PixelBuffer> {
    p.validate()?;
    debug!(
        w = src.width(),
        h = src.height(),
        aberration = p.aberration,
        shift = p.shift,
        line_shift = p.line_shift,
        prob = p.prob,
        seed = p.seed,
        "glitch"
    );
    let base = if p.aberration {
        chromatic_aberration(src, p.shift)
    } else {
        src.clone()
    };
    Ok(scanline_glitch(&base, p.line_shift, p.prob, p.seed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(w: usize, h: usize) -> PixelBuffer {
        let data = (0..h)
            .flat_map(|y| (0..w).flat_map(move |x| {
                let v = (x + y * w) as f32 / (w * h) as f32;
                [v, v * 0.5, 1.0 - v]
            }))
            .collect();
        PixelBuffer::from_data(w, h, data).unwrap()
    }

    #[test]
    fn test_roll_matches_circular_shift() {
        let mut row = vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0];
        roll_row(&mut row, None, 1);
        assert_eq!(row, vec![2.0, 2.0, 2.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        roll_row(&mut row, Some(1), -1);
        assert_eq!(row, vec![2.0, 0.0, 2.0, 0.0, 1.0, 0.0, 1.0, 2.0, 1.0]);
    }

    #[test]
    fn test_aberration_keeps_green() {
        let img = ramp(6, 3);
        let out = chromatic_aberration(&img, 2);
        assert_eq!(out.plane(1), img.plane(1));
        assert_eq!(out.pixel(2, 1)[0], img.pixel(0, 1)[0]);
        assert_eq!(out.pixel(0, 1)[2], img.pixel(2, 1)[2]);
    }

    #[test]
    fn test_zero_probability_only_drifts() {
        let img = ramp(5, 30);
        let out = scanline_glitch(&img, 12, 0.0, 9);
        for y in 0..30 {
            if y % DRIFT_PERIOD == 0 {
                assert_eq!(out.pixel(1, y)[0], img.pixel(0, y)[0]);
                assert_eq!(out.pixel(0, y)[2], img.pixel(1, y)[2]);
            } else {
                assert_eq!(out.row(y), img.row(y));
            }
        }
    }

    #[test]
    fn test_rows_are_rotations() {
        let img = ramp(7, 20);
        let p = GlitchParams { aberration: false, prob: 1.0, ..Default::default() };
        let out = glitch(&img, &p).unwrap();
        for y in (0..20).filter(|y| y % DRIFT_PERIOD != 0) {
            let mut got: Vec<u32> = out.row(y).iter().map(|v| v.to_bits()).collect();
            let mut want: Vec<u32> = img.row(y).iter().map(|v| v.to_bits()).collect();
            got.sort_unstable();
            want.sort_unstable();
            assert_eq!(got, want);
        }
    }

    #[test]
    fn test_deterministic_per_seed() {
        let img = ramp(16, 40);
        let p = GlitchParams { prob: 0.5, ..Default::default() };
        assert_eq!(glitch(&img, &p).unwrap(), glitch(&img, &p).unwrap());
        let other = GlitchParams { seed: 99, ..p };
        assert_ne!(glitch(&img, &p).unwrap(), glitch(&img, &other).unwrap());
    }

    #[test]
    fn test_extreme_shifts_wrap() {
        let img = ramp(6, 4);
        let out = chromatic_aberration(&img, i64::MIN);
        assert_eq!(out, chromatic_aberration(&img, i64::MIN.rem_euclid(6)));

        let p = GlitchParams { shift: i64::MIN, line_shift: usize::MAX, prob: 1.0, ..Default::default() };
        let out = glitch(&img, &p).unwrap();
        let (got, want) = (out.plane(1), img.plane(1));
        for y in 0..4 {
            let mut a: Vec<u32> = got.row(y).iter().map(|v| v.to_bits()).collect();
            let mut b: Vec<u32> = want.row(y).iter().map(|v| v.to_bits()).collect();
            a.sort_unstable();
            b.sort_unstable();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_rejects_bad_probability() {
        let img = ramp(4, 4);
        assert!(glitch(&img, &GlitchParams { prob: 1.5, ..Default::default() }).is_err());
        assert!(glitch(&img, &GlitchParams { prob: f32::NAN, ..Default::default() }).is_err());
    }
}
