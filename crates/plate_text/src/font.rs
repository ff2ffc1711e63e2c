//! Font faces
//!
//! Parses TTF/OTF data via ttf-parser and extracts the metrics the
//! measurer and rasterizer need.

use crate::{Result, TextError};
use plate_core::FontWeight;
use std::sync::Arc;

/// Font metrics in font units
#[derive(Debug, Clone, Copy)]
pub struct FontMetrics {
    /// Units per em (typically 1000 or 2048)
    pub units_per_em: u16,
    /// Distance from baseline to the top of the em box
    pub ascender: i16,
}

impl FontMetrics {
    /// Scale a value from font units to pixels
    pub fn scale(&self, value: f32, font_size: f32) -> f32 {
        value * font_size / self.units_per_em as f32
    }

    /// Ascender in pixels
    pub fn ascender_px(&self, font_size: f32) -> f32 {
        self.scale(self.ascender as f32, font_size)
    }
}

/// A parsed font face
pub struct FontFace {
    /// Raw font data, shared with shaper and rasterizer
    data: Arc<Vec<u8>>,
    /// Face index within the font file (for TTC files)
    face_index: u32,
    metrics: FontMetrics,
    family_name: String,
    weight: FontWeight,
}

impl FontFace {
    /// Load a font from raw TTF/OTF data (uses face index 0)
    pub fn from_data(data: Vec<u8>) -> Result<Self> {
        Self::from_data_with_index(data, 0)
    }

    /// Load a font from raw TTF/OTF data with a specific face index
    pub fn from_data_with_index(data: Vec<u8>, face_index: u32) -> Result<Self> {
        let data = Arc::new(data);

        let face = ttf_parser::Face::parse(&data, face_index)
            .map_err(|e| TextError::FontParseError(format!("{:?}", e)))?;

        let metrics = FontMetrics {
            units_per_em: face.units_per_em(),
            ascender: face.ascender(),
        };

        let family_name = face
            .names()
            .into_iter()
            .find(|n| n.name_id == ttf_parser::name_id::FAMILY)
            .and_then(|n| n.to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        let weight = face
            .tables()
            .os2
            .map(|os2| FontWeight::from_number(os2.weight().to_number()))
            .unwrap_or_default();

        Ok(Self {
            data,
            face_index,
            metrics,
            family_name,
            weight,
        })
    }

    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    pub fn weight(&self) -> FontWeight {
        self.weight
    }

    /// Raw font data for shaping and rasterization
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn face_index(&self) -> u32 {
        self.face_index
    }

    fn as_ttf_face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.data, self.face_index).ok()
    }

    /// Glyph ID for a character
    pub fn glyph_id(&self, c: char) -> Option<u16> {
        self.as_ttf_face()
            .and_then(|face| face.glyph_index(c))
            .map(|id| id.0)
    }

    /// Horizontal advance of a glyph in font units
    pub fn glyph_advance(&self, glyph_id: u16) -> Option<u16> {
        self.as_ttf_face()
            .and_then(|face| face.glyph_hor_advance(ttf_parser::GlyphId(glyph_id)))
    }
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("family_name", &self.family_name)
            .field("weight", &self.weight)
            .field("face_index", &self.face_index)
            .finish()
    }
}
