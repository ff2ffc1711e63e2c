//! Glyph rasterization using swash
//!
//! Converts glyph outlines to 8-bit coverage masks. Rasterized glyphs are
//! kept in a small LRU cache keyed by face, glyph and size, since every
//! re-render draws the same short labels again.

use crate::font::FontFace;
use crate::{Result, TextError};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use swash::scale::{Render, ScaleContext, Source};
use swash::zeno::Format;

const GLYPH_CACHE_CAPACITY: usize = 512;

/// Rasterized glyph coverage mask with placement
#[derive(Debug, Clone)]
pub struct RasterizedGlyph {
    /// Coverage values, row-major, `width * height` bytes
    pub bitmap: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Offset from the pen position to the left edge of the bitmap
    pub left: i32,
    /// Offset from the baseline up to the top edge of the bitmap
    pub top: i32,
}

impl RasterizedGlyph {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct GlyphKey {
    /// Identity of the face data
    face: usize,
    face_index: u32,
    glyph_id: u16,
    size_bits: u32,
}

/// Glyph rasterizer using swash
pub struct GlyphRasterizer {
    scale_context: ScaleContext,
    cache: LruCache<GlyphKey, Arc<RasterizedGlyph>>,
}

impl GlyphRasterizer {
    pub fn new() -> Self {
        Self {
            scale_context: ScaleContext::new(),
            cache: LruCache::new(
                NonZeroUsize::new(GLYPH_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN),
            ),
        }
    }

    /// Rasterize a glyph at the given font size
    pub fn rasterize(
        &mut self,
        font: &FontFace,
        glyph_id: u16,
        font_size: f32,
    ) -> Result<Arc<RasterizedGlyph>> {
        let key = GlyphKey {
            face: font.data().as_ptr() as usize,
            face_index: font.face_index(),
            glyph_id,
            size_bits: font_size.to_bits(),
        };
        if let Some(glyph) = self.cache.get(&key) {
            return Ok(Arc::clone(glyph));
        }

        let swash_font = swash::FontRef::from_index(font.data(), font.face_index() as usize)
            .ok_or(TextError::InvalidFontData)?;

        let mut scaler = self
            .scale_context
            .builder(swash_font)
            .size(font_size)
            .hint(false)
            .build();

        let mut render = Render::new(&[Source::Outline]);
        render.format(Format::Alpha);

        let glyph = match render.render(&mut scaler, glyph_id) {
            Some(img) => RasterizedGlyph {
                bitmap: img.data,
                width: img.placement.width,
                height: img.placement.height,
                left: img.placement.left,
                top: img.placement.top,
            },
            // Empty glyph (like space)
            None => RasterizedGlyph {
                bitmap: Vec::new(),
                width: 0,
                height: 0,
                left: 0,
                top: 0,
            },
        };

        let glyph = Arc::new(glyph);
        self.cache.put(key, Arc::clone(&glyph));
        Ok(glyph)
    }
}

impl Default for GlyphRasterizer {
    fn default() -> Self {
        Self::new()
    }
}
