//! # afterglow-ops
//!
//! Stylised image effects.
//!
//! Every effect is a pure function from a [`PixelBuffer`](afterglow_core::PixelBuffer)
//! and a parameter struct to a new buffer with values in [0, 1]. Parameter
//! structs implement `Default` and `validate()`; validation runs before any
//! pixel is touched.
//!
//! # Modules
//!
//! - [`warp`] - value-noise warp and kaleidoscope
//! - [`crt`] - CRT monitor simulation
//! - [`reaction_diffusion`] - Gray-Scott pattern growth
//! - [`flow_paint`] - colour advection along isophotes
//! - [`halftone`], [`ascii`] - layout effects drawn through [`draw`]
//! - [`pixel_sort`], [`kuwahara`], [`glitch`], [`glow`]
//! - [`filter`] - convolution, Gaussian blur and gradients
//! - [`registry`] - filter names, parameter schemas and dispatch
//!
//! # Example
//!
//! ```rust
//! use afterglow_core::PixelBuffer;
//! use afterglow_ops::{apply_chain, ApplyContext, Filter};
//!
//! let img = PixelBuffer::filled(16, 16, [0.4, 0.5, 0.6]);
//! let steps: Vec<Filter> = ["crt", "glitch:prob=0.3"]
//!     .iter()
//!     .map(|s| s.parse())
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! let out = apply_chain(&img, &steps, &mut ApplyContext::default()).unwrap();
//! assert!(out.data().iter().all(|v| (0.0..=1.0).contains(v)));
//! ```
//!
//! # Iterative effects
//!
//! [`reaction_diffusion`](reaction_diffusion::reaction_diffusion) and
//! [`flow_paint`](flow_paint::flow_paint) take a [`CancelToken`] and stop
//! with [`OpsError::Cancelled`] once it is cancelled or its deadline passes.
//!
//! # Features
//!
//! - `parallel` (default) - per-row and per-channel loops on rayon
//! - `serde` - `Serialize`/`Deserialize` for the parameter structs

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod cancel;
mod error;
mod parallel;
mod params;

pub mod ascii;
pub mod crt;
pub mod draw;
pub mod filter;
pub mod flow_paint;
pub mod glitch;
pub mod glow;
pub mod halftone;
pub mod kuwahara;
pub mod pixel_sort;
pub mod reaction_diffusion;
pub mod registry;
pub mod warp;

pub use cancel::CancelToken;
pub use error::{OpsError, OpsResult};
pub use registry::{apply_chain, ApplyContext, Filter, FilterKind, FilterSpec, ParamKind, ParamSpec};

pub use ascii::AsciiParams;
pub use crt::CrtParams;
pub use flow_paint::FlowPaintParams;
pub use glitch::GlitchParams;
pub use glow::{BloomParams, NeonParams};
pub use halftone::HalftoneParams;
pub use kuwahara::KuwaharaParams;
pub use pixel_sort::{PixelSortParams, SortDirection};
pub use reaction_diffusion::ReactionDiffusionParams;
pub use warp::{KaleidoscopeParams, WarpParams};
