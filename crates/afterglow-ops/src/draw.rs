//! Drawing boundary for the layout-producing effects.
//!
//! Halftone and ASCII compute a numeric layout (dot centres and radii, a
//! glyph grid) and only then paint it. Painting goes through two small
//! traits so the raster backend can be swapped:
//!
//! - [`Canvas`] - filled discs and coverage-mask blits
//! - [`GlyphRasterizer`] - turns a character into a coverage mask
//!
//! [`RasterCanvas`] paints into a [`PixelBuffer`]; [`BitmapGlyphs`] is a
//! built-in 5×7 bitmap face covering the default ASCII ramp.
//!
//! ```rust
//! use afterglow_ops::draw::{Canvas, RasterCanvas};
//!
//! let mut canvas = RasterCanvas::new(8, 8, [1.0, 1.0, 1.0]);
//! canvas.fill_disc(4.0, 4.0, 2.0, [0.0, 0.0, 0.0]);
//! let img = canvas.into_buffer();
//! assert_eq!(img.pixel(4, 4), [0.0, 0.0, 0.0]);
//! assert_eq!(img.pixel(0, 0), [1.0, 1.0, 1.0]);
//! ```

use afterglow_core::{PixelBuffer, CHANNELS};

/// Per-pixel coverage in [0, 1], row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphMask {
    /// Mask width.
    pub width: usize,
    /// Mask height.
    pub height: usize,
    /// Coverage values.
    pub coverage: Vec<f32>,
}

impl GlyphMask {
    /// An all-transparent mask.
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            coverage: vec![0.0; width * height],
        }
    }

    /// Coverage at `(x, y)`.
    #[inline]
    pub fn at(&self, x: usize, y: usize) -> f32 {
        self.coverage[y * self.width + x]
    }
}

/// Raster target for layout effects.
pub trait Canvas {
    /// Canvas `(width, height)`.
    fn dimensions(&self) -> (usize, usize);

    /// Fills every pixel whose centre lies within `radius` of `(cx, cy)`.
    fn fill_disc(&mut self, cx: f32, cy: f32, radius: f32, rgb: [f32; CHANNELS]);

    /// Blends `rgb` in through `mask`, with the mask's top-left at `(x0, y0)`.
    fn blend_mask(&mut self, x0: isize, y0: isize, mask: &GlyphMask, rgb: [f32; CHANNELS]);
}

/// Produces coverage masks for characters.
pub trait GlyphRasterizer {
    /// Rasterizes `ch` into a `cell_width × cell_height` mask.
    fn rasterize(&mut self, ch: char, cell_width: usize, cell_height: usize) -> GlyphMask;
}

/// [`Canvas`] over an owned [`PixelBuffer`].
#[derive(Debug, Clone)]
pub struct RasterCanvas {
    buffer: PixelBuffer,
}

impl RasterCanvas {
    /// A canvas filled with `background`.
    pub fn new(width: usize, height: usize, background: [f32; CHANNELS]) -> Self {
        Self {
            buffer: PixelBuffer::filled(width, height, background),
        }
    }

    /// Finishes drawing and returns the image.
    pub fn into_buffer(self) -> PixelBuffer {
        self.buffer
    }
}

impl Canvas for RasterCanvas {
    fn dimensions(&self) -> (usize, usize) {
        self.buffer.dimensions()
    }

    fn fill_disc(&mut self, cx: f32, cy: f32, radius: f32, rgb: [f32; CHANNELS]) {
        if !(radius > 0.0) {
            return;
        }
        let (w, h) = self.buffer.dimensions();
        let r2 = radius * radius;
        let x_lo = (cx - radius).floor().max(0.0) as usize;
        let y_lo = (cy - radius).floor().max(0.0) as usize;
        let x_hi = ((cx + radius).ceil().max(0.0) as usize).min(w);
        let y_hi = ((cy + radius).ceil().max(0.0) as usize).min(h);
        for y in y_lo..y_hi {
            let dy = y as f32 + 0.5 - cy;
            for x in x_lo..x_hi {
                let dx = x as f32 + 0.5 - cx;
                if dx * dx + dy * dy <= r2 {
                    self.buffer.set_pixel(x, y, rgb);
                }
            }
        }
    }

    fn blend_mask(&mut self, x0: isize, y0: isize, mask: &GlyphMask, rgb: [f32; CHANNELS]) {
        let (w, h) = self.buffer.dimensions();
        for my in 0..mask.height {
            let y = y0 + my as isize;
            if y < 0 || y >= h as isize {
                continue;
            }
            for mx in 0..mask.width {
                let x = x0 + mx as isize;
                if x < 0 || x >= w as isize {
                    continue;
                }
                let a = mask.at(mx, my).clamp(0.0, 1.0);
                if a <= 0.0 {
                    continue;
                }
                let (x, y) = (x as usize, y as usize);
                let bg = self.buffer.pixel(x, y);
                self.buffer.set_pixel(
                    x,
                    y,
                    [
                        bg[0] * (1.0 - a) + rgb[0] * a,
                        bg[1] * (1.0 - a) + rgb[1] * a,
                        bg[2] * (1.0 - a) + rgb[2] * a,
                    ],
                );
            }
        }
    }
}

const BITMAP_W: usize = 5;
const BITMAP_H: usize = 7;

/// Rows of a 5×7 bitmap, bit 4 is the leftmost column.
type Bitmap = [u8; BITMAP_H];

const TOFU: Bitmap = [0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111];

fn bitmap_for(ch: char) -> Option<Bitmap> {
    let rows = match ch {
        ' ' => [0; BITMAP_H],
        '@' => [0b01110, 0b10001, 0b10111, 0b10101, 0b10111, 0b10000, 0b01110],
        '%' => [0b11001, 0b11010, 0b00010, 0b00100, 0b01000, 0b01011, 0b10011],
        '#' => [0b01010, 0b01010, 0b11111, 0b01010, 0b11111, 0b01010, 0b01010],
        '*' => [0b00000, 0b00100, 0b10101, 0b01110, 0b10101, 0b00100, 0b00000],
        '+' => [0b00000, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0b00000],
        '=' => [0b00000, 0b00000, 0b11111, 0b00000, 0b11111, 0b00000, 0b00000],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        ':' => [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
        _ => return None,
    };
    Some(rows)
}

/// Built-in 5×7 bitmap face.
///
/// Covers the default ramp `@%#*+=-:. `; any other character renders as an
/// outlined box. Glyphs are scaled by the largest integer factor that fits
/// the cell (with a one-pixel margin) and centred in it.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitmapGlyphs;

impl BitmapGlyphs {
    /// Returns `true` if `ch` has its own bitmap.
    pub fn covers(ch: char) -> bool {
        bitmap_for(ch).is_some()
    }
}

impl GlyphRasterizer for BitmapGlyphs {
    fn rasterize(&mut self, ch: char, cell_width: usize, cell_height: usize) -> GlyphMask {
        let mut mask = GlyphMask::empty(cell_width, cell_height);
        let bitmap = bitmap_for(ch).unwrap_or(TOFU);
        let scale = ((cell_width / (BITMAP_W + 1)).min(cell_height / (BITMAP_H + 1))).max(1);
        let ox = cell_width.saturating_sub(BITMAP_W * scale) / 2;
        let oy = cell_height.saturating_sub(BITMAP_H * scale) / 2;
        for (row, bits) in bitmap.iter().enumerate() {
            for col in 0..BITMAP_W {
                if bits & (1 << (BITMAP_W - 1 - col)) == 0 {
                    continue;
                }
                for sy in 0..scale {
                    let y = oy + row * scale + sy;
                    if y >= cell_height {
                        continue;
                    }
                    for sx in 0..scale {
                        let x = ox + col * scale + sx;
                        if x < cell_width {
                            mask.coverage[y * cell_width + x] = 1.0;
                        }
                    }
                }
            }
        }
        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disc_is_symmetric_and_clipped() {
        let mut c = RasterCanvas::new(4, 4, [1.0; 3]);
        c.fill_disc(2.0, 2.0, 4.0_f32.sqrt() * 0.5 * 2.0_f32.sqrt(), [0.0; 3]);
        let img = c.into_buffer();
        for (x, y) in [(1, 1), (2, 1), (1, 2), (2, 2)] {
            assert_eq!(img.pixel(x, y), [0.0; 3]);
        }
        assert_eq!(img.pixel(0, 0), [1.0; 3]);
        assert_eq!(img.pixel(3, 3), [1.0; 3]);

        // Disc hanging off the edge does not panic.
        let mut c = RasterCanvas::new(4, 4, [1.0; 3]);
        c.fill_disc(-1.0, 5.0, 3.0, [0.0; 3]);
        assert_eq!(c.into_buffer().pixel(0, 3), [0.0; 3]);
    }

    #[test]
    fn test_zero_radius_draws_nothing() {
        let mut c = RasterCanvas::new(3, 3, [1.0; 3]);
        c.fill_disc(1.5, 1.5, 0.0, [0.0; 3]);
        assert!(c.into_buffer().data().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_blend_mask_partial_coverage() {
        let mut c = RasterCanvas::new(2, 1, [1.0; 3]);
        let mask = GlyphMask {
            width: 2,
            height: 1,
            coverage: vec![0.5, 1.0],
        };
        c.blend_mask(0, 0, &mask, [0.0; 3]);
        let img = c.into_buffer();
        assert_eq!(img.pixel(0, 0), [0.5; 3]);
        assert_eq!(img.pixel(1, 0), [0.0; 3]);
    }

    #[test]
    fn test_space_is_blank_and_at_is_not() {
        let mut g = BitmapGlyphs;
        assert!(g.rasterize(' ', 10, 19).coverage.iter().all(|&v| v == 0.0));
        let at = g.rasterize('@', 10, 19);
        assert!(at.coverage.iter().any(|&v| v == 1.0));
        assert_eq!((at.width, at.height), (10, 19));
    }

    #[test]
    fn test_denser_glyphs_cover_more() {
        let mut g = BitmapGlyphs;
        let ink = |m: GlyphMask| m.coverage.iter().sum::<f32>();
        assert!(ink(g.rasterize('@', 12, 24)) > ink(g.rasterize('.', 12, 24)));
        assert!(ink(g.rasterize('-', 12, 24)) > 0.0);
    }

    #[test]
    fn test_unknown_char_renders_box() {
        let mut g = BitmapGlyphs;
        assert!(!BitmapGlyphs::covers('Z'));
        assert!(g.rasterize('Z', 6, 8).coverage.iter().any(|&v| v == 1.0));
    }

    #[test]
    fn test_tiny_cell_does_not_panic() {
        let mut g = BitmapGlyphs;
        let m = g.rasterize('#', 2, 3);
        assert_eq!(m.coverage.len(), 6);
    }
}
