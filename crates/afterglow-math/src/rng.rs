//! Per-call seeded random source.
//!
//! Every effect that needs randomness builds its own [`SeededRng`] from the
//! seed it was given, so two invocations with different seeds never observe
//! each other's state and the same seed always replays the same stream.
//!
//! ```rust
//! use afterglow_math::SeededRng;
//!
//! let mut a = SeededRng::new(7);
//! let mut b = SeededRng::new(7);
//! assert_eq!(a.uniform(), b.uniform());
//! ```

use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use rand_xoshiro::Xoshiro256StarStar;

/// Xoshiro256** generator seeded from a `u64`.
#[derive(Debug, Clone)]
pub struct SeededRng {
    rng: Xoshiro256StarStar,
}

impl SeededRng {
    /// Creates a generator from `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Xoshiro256StarStar::seed_from_u64(seed),
        }
    }

    /// Uniform sample in [0, 1).
    #[inline]
    pub fn uniform(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    /// Returns `true` with probability `p` (draws one uniform sample).
    #[inline]
    pub fn chance(&mut self, p: f32) -> bool {
        self.uniform() < p
    }

    /// Uniform integer in `[lo, hi]`. Returns `lo` when the range is empty.
    pub fn int_inclusive(&mut self, lo: i64, hi: i64) -> i64 {
        if hi <= lo {
            return lo;
        }
        self.rng.random_range(lo..=hi)
    }

    /// One sample of `N(0, std)`. A non-positive or non-finite `std` yields 0.
    pub fn gaussian(&mut self, std: f32) -> f32 {
        match Normal::new(0.0f32, std) {
            Ok(normal) if std > 0.0 => normal.sample(&mut self.rng),
            _ => 0.0,
        }
    }

    /// `n` samples of `N(0, std)` in draw order.
    pub fn gaussian_vec(&mut self, n: usize, std: f32) -> Vec<f32> {
        match Normal::new(0.0f32, std) {
            Ok(normal) if std > 0.0 => (0..n).map(|_| normal.sample(&mut self.rng)).collect(),
            _ => vec![0.0; n],
        }
    }
}
