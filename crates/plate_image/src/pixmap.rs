//! RGBA8 raster surface
//!
//! Pixels are straight (non-premultiplied) RGBA. All drawing is clipped to
//! the surface bounds and blends source-over.

use crate::error::{ImageError, Result};
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use plate_core::{Color, Rect};

/// An owned RGBA8 pixel surface
#[derive(Debug, Clone, PartialEq)]
pub struct Pixmap {
    image: RgbaImage,
}

impl Pixmap {
    /// Create a fully transparent surface
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    /// Wrap raw RGBA pixels
    pub fn from_rgba(pixels: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(ImageError::InvalidDimensions {
                width,
                height,
                reason: format!("expected {} bytes, got {}", expected, pixels.len()),
            });
        }
        RgbaImage::from_raw(width, height, pixels)
            .map(Self::from_image)
            .ok_or_else(|| ImageError::InvalidDimensions {
                width,
                height,
                reason: "buffer rejected".to_string(),
            })
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Raw RGBA bytes, row-major
    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        (x < self.width() && y < self.height()).then(|| self.image.get_pixel(x, y).0)
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    /// Reallocate to new dimensions, discarding content
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.dimensions() != (width, height) {
            self.image = RgbaImage::new(width, height);
        }
    }

    /// Reset the whole surface to transparent
    pub fn clear(&mut self) {
        self.image.pixels_mut().for_each(|p| *p = Rgba([0, 0, 0, 0]));
    }

    /// Draw `source` stretched into `rect` (no aspect correction)
    pub fn draw_image(&mut self, source: &Pixmap, rect: Rect) {
        let width = rect.width().round();
        let height = rect.height().round();
        if width < 1.0 || height < 1.0 {
            return;
        }
        let (width, height) = (width as u32, height as u32);

        let x = rect.x().round() as i64;
        let y = rect.y().round() as i64;
        if source.dimensions() == (width, height) {
            imageops::overlay(&mut self.image, &source.image, x, y);
        } else {
            tracing::debug!(
                "Stretching {}x{} image into {}x{}",
                source.width(),
                source.height(),
                width,
                height
            );
            let stretched = imageops::resize(&source.image, width, height, FilterType::Triangle);
            imageops::overlay(&mut self.image, &stretched, x, y);
        }
    }

    /// Fill `color` through an 8-bit coverage mask placed at (`x`, `y`)
    pub fn fill_mask(
        &mut self,
        mask: &[u8],
        mask_width: u32,
        mask_height: u32,
        x: i32,
        y: i32,
        color: Color,
    ) {
        debug_assert_eq!(mask.len(), (mask_width * mask_height) as usize);
        let [r, g, b, a] = color.to_array();

        for my in 0..mask_height {
            let py = y + my as i32;
            if py < 0 || py >= self.height() as i32 {
                continue;
            }
            for mx in 0..mask_width {
                let px = x + mx as i32;
                if px < 0 || px >= self.width() as i32 {
                    continue;
                }
                let coverage = mask[(my * mask_width + mx) as usize];
                if coverage == 0 {
                    continue;
                }

                let src_a = a * coverage as f32 / 255.0;
                let dst = self.image.get_pixel_mut(px as u32, py as u32);
                *dst = blend_over([r, g, b, src_a], dst.0);
            }
        }
    }

    /// Encode as a lossless PNG at the surface's exact dimensions
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes)
            .write_image(
                self.image.as_raw(),
                self.width(),
                self.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| ImageError::Encode(e.to_string()))?;
        Ok(bytes)
    }
}

/// Source-over with straight alpha; `src` is in 0..=1 floats
fn blend_over(src: [f32; 4], dst: [u8; 4]) -> Rgba<u8> {
    let [sr, sg, sb, sa] = src;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |s: f32, d: u8| {
        let d = d as f32 / 255.0;
        let v = (s * sa + d * da * (1.0 - sa)) / out_a;
        (v.clamp(0.0, 1.0) * 255.0).round() as u8
    };

    Rgba([
        channel(sr, dst[0]),
        channel(sg, dst[1]),
        channel(sb, dst[2]),
        (out_a.clamp(0.0, 1.0) * 255.0).round() as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Pixmap {
        Pixmap::from_image(RgbaImage::from_pixel(width, height, Rgba(rgba)))
    }

    #[test]
    fn test_new_is_transparent() {
        let pixmap = Pixmap::new(3, 2);
        assert_eq!(pixmap.dimensions(), (3, 2));
        assert!(pixmap.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_from_rgba_checks_length() {
        assert!(Pixmap::from_rgba(vec![255, 0, 0, 255], 2, 2).is_err());
        let pixmap = Pixmap::from_rgba(vec![255; 16], 2, 2).unwrap();
        assert_eq!(pixmap.pixel(1, 1), Some([255, 255, 255, 255]));
        assert_eq!(pixmap.pixel(2, 0), None);
    }

    #[test]
    fn test_draw_image_stretches_to_rect() {
        let mut surface = Pixmap::new(4, 4);
        let source = solid(2, 1, [255, 0, 0, 255]);
        surface.draw_image(&source, Rect::new(0.0, 0.0, 4.0, 4.0));
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(surface.pixel(x, y), Some([255, 0, 0, 255]));
            }
        }
    }

    #[test]
    fn test_fill_mask_blends_over_opaque() {
        let mut surface = solid(2, 1, [0, 0, 0, 255]);
        surface.fill_mask(&[255, 128], 2, 1, 0, 0, Color::WHITE);
        assert_eq!(surface.pixel(0, 0), Some([255, 255, 255, 255]));
        assert_eq!(surface.pixel(1, 0), Some([128, 128, 128, 255]));
    }

    #[test]
    fn test_fill_mask_on_transparent_keeps_color() {
        let mut surface = Pixmap::new(1, 1);
        surface.fill_mask(&[128], 1, 1, 0, 0, Color::RED);
        assert_eq!(surface.pixel(0, 0), Some([255, 0, 0, 128]));
    }

    #[test]
    fn test_fill_mask_clips_negative_origin() {
        let mut surface = Pixmap::new(2, 2);
        surface.fill_mask(&[255; 9], 3, 3, -1, -1, Color::WHITE);
        assert_eq!(surface.pixel(0, 0), Some([255, 255, 255, 255]));
        assert_eq!(surface.pixel(1, 1), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_encode_png_round_trips_dimensions() {
        let pixmap = solid(7, 5, [1, 2, 3, 255]);
        let png = pixmap.encode_png().unwrap();
        assert_eq!(&png[1..4], b"PNG");
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (7, 5));
    }
}
