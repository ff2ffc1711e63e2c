//! Text shaping using rustybuzz (HarfBuzz)
//!
//! Converts a string into positioned glyphs with kerning and ligatures
//! applied. Widths reported here are what a native single-call string draw
//! would occupy.

use crate::font::FontFace;
use rustybuzz::{Face, UnicodeBuffer};

/// A shaped glyph, positions in font units
#[derive(Debug, Clone, Copy)]
pub struct ShapedGlyph {
    pub glyph_id: u16,
    /// X offset from the pen position
    pub x_offset: i32,
    /// Y offset from the pen position (positive = up)
    pub y_offset: i32,
    /// Horizontal advance to the next glyph
    pub x_advance: i32,
}

/// Result of shaping a string
#[derive(Debug, Clone)]
pub struct ShapedText {
    /// Glyphs in visual order
    pub glyphs: Vec<ShapedGlyph>,
    /// Total advance width in font units
    pub total_advance: i32,
    pub font_size: f32,
    pub units_per_em: u16,
}

impl ShapedText {
    /// Total width in pixels
    pub fn width_px(&self) -> f32 {
        self.scale(self.total_advance)
    }

    /// Scale a font-unit value to pixels
    pub fn scale(&self, value: i32) -> f32 {
        value as f32 * self.font_size / self.units_per_em as f32
    }
}

/// Text shaper using HarfBuzz via rustybuzz
#[derive(Debug, Default)]
pub struct TextShaper;

impl TextShaper {
    pub fn new() -> Self {
        Self
    }

    /// Shape a string with the given font
    pub fn shape(&self, text: &str, font_face: &FontFace, font_size: f32) -> ShapedText {
        // Face borrows the font data, so it is rebuilt per call
        let face = match Face::from_slice(font_face.data(), font_face.face_index()) {
            Some(f) => f,
            None => return self.fallback_shape(text, font_face, font_size),
        };

        let mut buffer = UnicodeBuffer::new();
        buffer.push_str(text);

        let output = rustybuzz::shape(&face, &[], buffer);

        let mut total_advance = 0i32;
        let glyphs = output
            .glyph_infos()
            .iter()
            .zip(output.glyph_positions())
            .map(|(info, pos)| {
                total_advance += pos.x_advance;
                ShapedGlyph {
                    glyph_id: info.glyph_id as u16,
                    x_offset: pos.x_offset,
                    y_offset: pos.y_offset,
                    x_advance: pos.x_advance,
                }
            })
            .collect();

        ShapedText {
            glyphs,
            total_advance,
            font_size,
            units_per_em: font_face.metrics().units_per_em,
        }
    }

    /// Unshaped glyph sequence from cmap and hmtx, used when rustybuzz
    /// cannot open the face
    fn fallback_shape(&self, text: &str, font_face: &FontFace, font_size: f32) -> ShapedText {
        tracing::debug!(
            "Shaping '{}' without rustybuzz ({})",
            text,
            font_face.family_name()
        );

        let mut total_advance = 0i32;
        let glyphs = text
            .chars()
            .map(|c| {
                let glyph_id = font_face.glyph_id(c).unwrap_or(0);
                let advance = font_face.glyph_advance(glyph_id).unwrap_or(0) as i32;
                total_advance += advance;
                ShapedGlyph {
                    glyph_id,
                    x_offset: 0,
                    y_offset: 0,
                    x_advance: advance,
                }
            })
            .collect();

        ShapedText {
            glyphs,
            total_advance,
            font_size,
            units_per_em: font_face.metrics().units_per_em,
        }
    }
}
