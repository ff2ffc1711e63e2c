//! Drawing surfaces
//!
//! [`RenderSurface`] is everything the compositor needs from a raster
//! target. [`RasterSurface`] implements it on a [`Pixmap`] with real fonts:
//! strings are shaped with rustybuzz so that measured widths match what a
//! single `fill_text` call draws, and glyphs are rasterized with swash.

use plate_core::{Color, Point, Rect};
use plate_image::Pixmap;
use plate_text::{
    FontFace, FontRegistry, FontSpec, GlyphRasterizer, TextCanvas, TextError, TextMeasurer,
    TextShaper,
};
use std::sync::Arc;

/// A raster target the compositor can clear, paint images on and draw text on
pub trait RenderSurface: TextCanvas {
    /// Current pixel dimensions
    fn size(&self) -> (u32, u32);

    /// Reallocate to new dimensions; content is undefined afterwards
    fn resize(&mut self, width: u32, height: u32);

    /// Reset every pixel to transparent
    fn clear(&mut self);

    /// Draw `image` stretched into `rect`
    fn draw_image(&mut self, image: &Pixmap, rect: Rect);

    /// Pixel content
    fn pixmap(&self) -> &Pixmap;
}

struct ActiveFont {
    spec: FontSpec,
    face: Arc<FontFace>,
}

/// Software surface backed by a [`Pixmap`]
pub struct RasterSurface {
    pixmap: Pixmap,
    fonts: FontRegistry,
    shaper: TextShaper,
    rasterizer: GlyphRasterizer,
    font: Option<ActiveFont>,
    fill: Color,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32, fonts: FontRegistry) -> Self {
        Self {
            pixmap: Pixmap::new(width, height),
            fonts,
            shaper: TextShaper::new(),
            rasterizer: GlyphRasterizer::new(),
            font: None,
            fill: Color::BLACK,
        }
    }

    fn active(&self) -> Result<&ActiveFont, TextError> {
        self.font.as_ref().ok_or(TextError::NoActiveFont)
    }
}

impl TextMeasurer for RasterSurface {
    fn set_font(&mut self, font: &FontSpec) -> Result<(), TextError> {
        if let Some(active) = &mut self.font {
            if active.spec.family == font.family && active.spec.weight == font.weight {
                // Same face, only the size changes
                active.spec.size = font.size;
                return Ok(());
            }
        }

        let face = self.fonts.resolve(&font.family, font.weight)?;
        tracing::debug!("Font '{}' resolved to {}", font.css(), face.family_name());
        self.font = Some(ActiveFont {
            spec: font.clone(),
            face,
        });
        Ok(())
    }

    fn measure_text(&mut self, text: &str) -> Result<f32, TextError> {
        let active = self.active()?;
        Ok(self
            .shaper
            .shape(text, &active.face, active.spec.size)
            .width_px())
    }
}

impl TextCanvas for RasterSurface {
    fn set_fill_color(&mut self, color: Color) {
        self.fill = color;
    }

    fn fill_text(&mut self, text: &str, origin: Point) -> Result<(), TextError> {
        let active = self.font.as_ref().ok_or(TextError::NoActiveFont)?;
        let size = active.spec.size;
        let shaped = self.shaper.shape(text, &active.face, size);

        // Top of the em box sits at origin.y
        let baseline = origin.y + active.face.metrics().ascender_px(size);
        let mut pen_x = origin.x;

        for glyph in &shaped.glyphs {
            let raster = self.rasterizer.rasterize(&active.face, glyph.glyph_id, size)?;
            if !raster.is_empty() {
                let x = (pen_x + shaped.scale(glyph.x_offset)).round() as i32 + raster.left;
                let y = (baseline - shaped.scale(glyph.y_offset)).round() as i32 - raster.top;
                self.pixmap.fill_mask(
                    &raster.bitmap,
                    raster.width,
                    raster.height,
                    x,
                    y,
                    self.fill,
                );
            }
            pen_x += shaped.scale(glyph.x_advance);
        }

        Ok(())
    }
}

impl RenderSurface for RasterSurface {
    fn size(&self) -> (u32, u32) {
        self.pixmap.dimensions()
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.pixmap.resize(width, height);
    }

    fn clear(&mut self) {
        self.pixmap.clear();
    }

    fn draw_image(&mut self, image: &Pixmap, rect: Rect) {
        self.pixmap.draw_image(image, rect);
    }

    fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }
}
