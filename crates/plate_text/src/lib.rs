//! Text fitting and glyph rendering for plate templates
//!
//! This crate provides:
//! - Font loading and parsing (TTF/OTF via ttf-parser)
//! - Font discovery by family list and weight (fontdb)
//! - Text shaping (HarfBuzz via rustybuzz)
//! - Glyph rasterization (swash)
//! - The measuring/drawing seams ([`TextMeasurer`], [`TextCanvas`])
//! - The fit engine that picks the largest font size fitting a slot
//! - The slot renderer with optional manual letter spacing

pub mod draw;
pub mod fit;
pub mod font;
pub mod measure;
pub mod rasterizer;
pub mod registry;
pub mod shaper;

pub use draw::draw_slot_text;
pub use fit::{fit_text, fit_text_with, FitResult, FitStrategy};
pub use font::{FontFace, FontMetrics};
pub use measure::{FontSpec, TextCanvas, TextMeasurer};
pub use rasterizer::{GlyphRasterizer, RasterizedGlyph};
pub use registry::{FontRegistry, GenericFont};
pub use shaper::{ShapedGlyph, ShapedText, TextShaper};

use thiserror::Error;

/// Text rendering errors
#[derive(Error, Debug)]
pub enum TextError {
    #[error("Failed to load font: {0}")]
    FontLoadError(String),

    #[error("Failed to parse font: {0}")]
    FontParseError(String),

    #[error("No font matches '{family}' (weight {weight})")]
    FontNotFound { family: String, weight: u16 },

    #[error("No active font; call set_font first")]
    NoActiveFont,

    #[error("Invalid font data")]
    InvalidFontData,
}

pub type Result<T> = std::result::Result<T, TextError>;
