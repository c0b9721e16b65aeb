//! ASCII-art rendering.
//!
//! Luminance is box-averaged down to a `cols × rows` grid, where
//! `rows = h / (2·cell_w)` compensates for glyphs being about twice as tall
//! as they are wide. Each cell's brightness picks a character from a ramp
//! ordered dark to light.
//!
//! ```rust
//! use afterglow_core::PixelBuffer;
//! use afterglow_ops::ascii::{ascii_layout, AsciiParams};
//!
//! let img = PixelBuffer::filled(40, 40, [0.0, 0.0, 0.0]);
//! let p = AsciiParams { cols: 4, ..Default::default() };
//! let layout = ascii_layout(&img, &p).unwrap();
//! assert_eq!(layout.to_text(), "@@@@\n@@@@");
//! ```

use afterglow_core::{Field, PixelBuffer};
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::draw::{Canvas, GlyphRasterizer, RasterCanvas};
use crate::{params, OpsError, OpsResult};

/// Default ramp, darkest first.
pub const DEFAULT_CHARSET: &str = "@%#*+=-:. ";

/// Line height relative to the font size.
const LINE_HEIGHT: f32 = 1.9;

/// Parameters for [`ascii`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AsciiParams {
    /// Characters across.
    pub cols: usize,
    /// Map bright areas to dark glyphs instead.
    pub invert: bool,
    /// Glyph ramp, darkest first. Fewer than two glyphs falls back to
    /// [`DEFAULT_CHARSET`].
    pub charset: String,
    /// Glyph cell width in output pixels.
    pub font_size: usize,
}

impl Default for AsciiParams {
    fn default() -> Self {
        Self {
            cols: 120,
            invert: false,
            charset: DEFAULT_CHARSET.to_string(),
            font_size: 10,
        }
    }
}

impl AsciiParams {
    /// Checks `cols >= 1` and `font_size >= 1`.
    pub fn validate(&self) -> OpsResult<()> {
        params::at_least("cols", self.cols, 1)?;
        params::at_least("font_size", self.font_size, 1)?;
        Ok(())
    }

    /// The ramp actually used.
    pub fn glyphs(&self) -> Vec<char> {
        let chars: Vec<char> = self.charset.chars().collect();
        if chars.len() < 2 {
            DEFAULT_CHARSET.chars().collect()
        } else {
            chars
        }
    }
}

/// Character grid chosen for an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsciiLayout {
    /// Characters across.
    pub cols: usize,
    /// Lines.
    pub rows: usize,
    /// Row-major characters.
    pub glyphs: Vec<char>,
}

impl AsciiLayout {
    /// Character at column `x`, line `y`.
    pub fn at(&self, x: usize, y: usize) -> char {
        self.glyphs[y * self.cols + x]
    }

    /// Plain-text art, lines joined by `\n`.
    pub fn to_text(&self) -> String {
        self.glyphs
            .chunks(self.cols)
            .map(|line| line.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Box-averages `field` down to `cols × rows`.
fn downsample(field: &Field, cols: usize, rows: usize) -> Field {
    let (w, h) = field.dimensions();
    let span = |i: usize, n: usize, dim: usize| {
        let lo = (i * dim / n).min(dim - 1);
        let hi = ((i + 1) * dim / n).clamp(lo + 1, dim);
        (lo, hi)
    };
    Field::from_fn(cols, rows, |c, r| {
        let (x0, x1) = span(c, cols, w);
        let (y0, y1) = span(r, rows, h);
        let mut sum = 0.0f32;
        for y in y0..y1 {
            sum += field.row(y)[x0..x1].iter().sum::<f32>();
        }
        sum / ((x1 - x0) * (y1 - y0)) as f32
    })
}

/// Index into a ramp of `n` glyphs for brightness `b`.
#[inline]
fn glyph_index(b: f32, n: usize) -> usize {
    let i = (b * (n - 1) as f32).round_ties_even();
    i.clamp(0.0, (n - 1) as f32) as usize
}

/// Chooses the character grid for `src`.
pub fn ascii_layout(src: &PixelBuffer, p: &AsciiParams) -> OpsResult<AsciiLayout> {
    p.validate()?;
    if src.is_empty() {
        return Err(OpsError::InvalidDimensions("ascii needs a non-empty image".into()));
    }
    let (w, h) = src.dimensions();
    let cols = p.cols;
    let cell_w = (w / cols).max(1);
    let cell_h = cell_w * 2;
    let rows = (h / cell_h).max(1);

    let glyphs = p.glyphs();
    let n = glyphs.len();
    let small = downsample(&src.luminance(), cols, rows);
    let chosen = small
        .data()
        .iter()
        .map(|&b| {
            let b = if p.invert { 1.0 - b } else { b };
            glyphs[glyph_index(b, n)]
        })
        .collect();
    trace!(w, h, cols, rows, "ascii_layout");
    Ok(AsciiLayout {
        cols,
        rows,
        glyphs: chosen,
    })
}

/// Renders the ASCII art as black glyphs on white.
///
/// The canvas is `cols·font_size` wide and `rows·⌊1.9·font_size⌋` tall.
pub fn ascii(
    src: &PixelBuffer,
    p: &AsciiParams,
    rasterizer: &mut dyn GlyphRasterizer,
) -> OpsResult<PixelBuffer> {
    let layout = ascii_layout(src, p)?;
    let cell_w = p.font_size;
    let cell_h = ((p.font_size as f32 * LINE_HEIGHT).floor() as usize).max(1);
    debug!(cols = layout.cols, rows = layout.rows, font_size = p.font_size, "ascii");

    let mut canvas = RasterCanvas::new(layout.cols * cell_w, layout.rows * cell_h, [1.0; 3]);
    for y in 0..layout.rows {
        for x in 0..layout.cols {
            let ch = layout.at(x, y);
            if ch == ' ' {
                continue;
            }
            let mask = rasterizer.rasterize(ch, cell_w, cell_h);
            canvas.blend_mask((x * cell_w) as isize, (y * cell_h) as isize, &mask, [0.0; 3]);
        }
    }
    Ok(canvas.into_buffer())
}
