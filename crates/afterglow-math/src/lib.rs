//! # afterglow-math
//!
//! Numeric primitives shared by every afterglow effect.
//!
//! - Interpolation helpers ([`lerp`], [`smootherstep`])
//! - Mirror boundaries ([`reflect_coord`], [`reflect_index`])
//! - Bilinear resampling through a [`CoordinateMap`] ([`remap_buffer`])
//! - Multi-octave value noise ([`value_noise`])
//! - Per-call seeded randomness ([`SeededRng`])
//!
//! # Usage
//!
//! ```rust
//! use afterglow_core::PixelBuffer;
//! use afterglow_math::{remap_buffer, value_noise, CoordinateMap};
//!
//! let img = PixelBuffer::filled(32, 32, [0.5, 0.5, 0.5]);
//! let nx = value_noise(32, 32, 8.0, 2, 1);
//! let map = CoordinateMap::from_fn(32, 32, |x, y| (y as f32, x as f32 + 4.0 * nx.get(x, y)));
//! let warped = remap_buffer(&img, &map);
//! assert_eq!(warped.dimensions(), (32, 32));
//! ```
//!
//! # Dependencies
//!
//! - [`glam`] - point type for sample positions
//! - `rand`, `rand_xoshiro`, `rand_distr` - seeded generator and Gaussian draws
//! - `rayon` (optional, `parallel` feature) - per-channel resampling

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod interp;
mod noise;
mod resample;
mod rng;

pub use interp::*;
pub use noise::value_noise;
pub use resample::*;
pub use rng::SeededRng;

/// Re-export of the glam point type used for sample positions.
pub use glam::Vec2;
