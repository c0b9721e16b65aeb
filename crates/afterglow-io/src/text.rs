//! System-font glyph rasterizer for the `ascii` effect.
//!
//! Glyphs are shaped and rasterized with cosmic-text. The font database is
//! expensive to build, so one instance is shared process-wide; masks are
//! cached per rasterizer.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use afterglow_ops::draw::{GlyphMask, GlyphRasterizer};
use cosmic_text::{Attrs, Buffer, Color, Family, FontSystem, Metrics, Shaping, SwashCache};
#[allow(unused_imports)]
use tracing::{debug, trace};

lazy_static::lazy_static! {
    static ref FONT_SYSTEM: Mutex<FontSystem> = Mutex::new(FontSystem::new());
    static ref SWASH_CACHE: Mutex<SwashCache> = Mutex::new(SwashCache::new());
}

/// Cell height divided by font size.
const LINE_RATIO: f32 = 1.2;

/// [`GlyphRasterizer`] backed by installed fonts.
#[derive(Debug, Clone)]
pub struct FontGlyphs {
    family: String,
    cache: HashMap<(char, usize, usize), GlyphMask>,
}

impl FontGlyphs {
    /// Uses the system monospace face.
    pub fn new() -> Self {
        Self::with_family("monospace")
    }

    /// Uses `family`: `monospace`, `serif`, `sans-serif` or a font name.
    pub fn with_family(family: &str) -> Self {
        Self {
            family: family.to_string(),
            cache: HashMap::new(),
        }
    }

    fn render(&self, ch: char, cell_width: usize, cell_height: usize) -> GlyphMask {
        let mut mask = GlyphMask::empty(cell_width, cell_height);
        if ch.is_whitespace() || cell_width == 0 || cell_height == 0 {
            return mask;
        }

        let mut font_system = FONT_SYSTEM.lock().unwrap_or_else(PoisonError::into_inner);
        let mut swash_cache = SWASH_CACHE.lock().unwrap_or_else(PoisonError::into_inner);

        let line_height = cell_height as f32;
        let metrics = Metrics::new(line_height / LINE_RATIO, line_height);
        let mut buffer = Buffer::new(&mut font_system, metrics);
        buffer.set_size(&mut font_system, Some(cell_width as f32), Some(line_height));

        let family = match self.family.to_lowercase().as_str() {
            "monospace" | "mono" => Family::Monospace,
            "serif" => Family::Serif,
            "sans-serif" | "sans" => Family::SansSerif,
            _ => Family::Name(&self.family),
        };
        let mut utf8 = [0u8; 4];
        let text = ch.encode_utf8(&mut utf8);
        buffer.set_text(&mut font_system, text, &Attrs::new().family(family), Shaping::Advanced);
        buffer.shape_until_scroll(&mut font_system, false);

        let (w, h) = (cell_width as i32, cell_height as i32);
        buffer.draw(&mut font_system, &mut swash_cache, Color::rgb(0, 0, 0), |x, y, rw, rh, color| {
            let a = color.a() as f32 / 255.0;
            for py in y.max(0)..(y + rh as i32).min(h) {
                for px in x.max(0)..(x + rw as i32).min(w) {
                    let i = py as usize * cell_width + px as usize;
                    let c = mask.coverage[i];
                    mask.coverage[i] = (c + a * (1.0 - c)).min(1.0);
                }
            }
        });
        trace!(ch = %ch, cell_width, cell_height, "glyph rendered");
        mask
    }
}

impl Default for FontGlyphs {
    fn default() -> Self {
        Self::new()
    }
}

impl GlyphRasterizer for FontGlyphs {
    fn rasterize(&mut self, ch: char, cell_width: usize, cell_height: usize) -> GlyphMask {
        let key = (ch, cell_width, cell_height);
        if let Some(mask) = self.cache.get(&key) {
            return mask.clone();
        }
        let mask = self.render(ch, cell_width, cell_height);
        self.cache.insert(key, mask.clone());
        mask
    }
}
