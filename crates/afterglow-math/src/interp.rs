//! Interpolation and boundary helpers.
//!
//! - Linear interpolation ([`lerp`])
//! - Smooth fade curves ([`smootherstep`])
//! - Mirror boundaries for continuous coordinates ([`reflect_coord`]) and
//!   for discrete kernel taps ([`reflect_index`])
//!
//! # Usage
//!
//! ```rust
//! use afterglow_math::{lerp, reflect_coord, reflect_index};
//!
//! assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
//! assert_eq!(reflect_coord(-1.5, 10), 1.5);
//! assert_eq!(reflect_index(-1, 10), 0);
//! ```

/// Linear interpolation between two values.
///
/// Returns `a` when `t = 0.0`, and `b` when `t = 1.0`.
///
/// # Example
///
/// ```rust
/// use afterglow_math::lerp;
///
/// assert_eq!(lerp(0.0, 10.0, 0.0), 0.0);
/// assert_eq!(lerp(0.0, 10.0, 1.0), 10.0);
/// ```
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Quintic fade curve on `t` in [0, 1].
///
/// `t³(t(6t − 15) + 10)`: zero first and second derivative at both ends,
/// which hides the lattice when upsampling value noise.
///
/// # Example
///
/// ```rust
/// use afterglow_math::smootherstep;
///
/// assert_eq!(smootherstep(0.0), 0.0);
/// assert_eq!(smootherstep(1.0), 1.0);
/// assert_eq!(smootherstep(0.5), 0.5);
/// ```
#[inline]
pub fn smootherstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Mirrors a continuous coordinate back into `[0, n-1]`.
///
/// The mirror axes sit on the first and last sample, so the pattern repeats
/// with period `2(n-1)`: `-0.5 → 0.5`, `n-1+0.5 → n-1-0.5`. A single-sample
/// axis and non-finite input both resolve to 0.
#[inline]
pub fn reflect_coord(c: f32, n: usize) -> f32 {
    if n <= 1 || !c.is_finite() {
        return 0.0;
    }
    let max = (n - 1) as f32;
    let period = 2.0 * max;
    let t = c.abs() % period;
    if t > max { period - t } else { t }
}

/// Mirrors a discrete index into `[0, n)`, repeating the edge sample.
///
/// `-1 → 0`, `-2 → 1`, `n → n-1`. This is the boundary used by every
/// convolution kernel.
#[inline]
pub fn reflect_index(i: isize, n: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    let n = n as isize;
    let period = 2 * n;
    let t = i.rem_euclid(period);
    if t >= n { (period - 1 - t) as usize } else { t as usize }
}
