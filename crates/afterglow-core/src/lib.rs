//! # afterglow-core
//!
//! Core types for afterglow image effects.
//!
//! - [`PixelBuffer`] - copy-on-write RGB float image, the input and output
//!   of every effect
//! - [`Field`] - scalar grid for luminance, noise and simulation state
//! - [`luminance`] - the single Rec.709 luminance definition
//!
//! ## Crate Structure
//!
//! ```text
//! afterglow-core (this crate)
//!    ^
//!    +-- afterglow-math (resampling, noise, rng)
//!    +-- afterglow-ops (effects)
//!    +-- afterglow-io (decode/encode)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod buffer;
pub mod error;
pub mod field;
pub mod pixel;

pub use buffer::{PixelBuffer, CHANNELS};
pub use error::{Error, Result};
pub use field::{Field, NORMALIZE_EPSILON};
pub use pixel::{luminance, REC709_LUMA, REC709_LUMA_B, REC709_LUMA_G, REC709_LUMA_R};
