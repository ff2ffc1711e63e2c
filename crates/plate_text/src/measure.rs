//! Measuring and drawing seams
//!
//! The fit engine and the slot renderer only talk to these traits, so they
//! run unchanged against a real raster surface or an in-memory fake.
//! Both traits are stateful like a 2D canvas context: `set_font` and
//! `set_fill_color` change the active state used by later calls.

use crate::Result;
use plate_core::{Color, FontWeight, Point, TextSlotConfig};

/// Font configuration: family list, weight and pixel size
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub weight: FontWeight,
    pub size: f32,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, weight: FontWeight, size: f32) -> Self {
        Self {
            family: family.into(),
            weight,
            size,
        }
    }

    /// The slot's family and weight at `size`
    pub fn for_slot(slot: &TextSlotConfig, size: f32) -> Self {
        Self::new(slot.font_family.clone(), slot.font_weight, size)
    }

    /// CSS shorthand, e.g. `700 40px Montserrat`
    pub fn css(&self) -> String {
        format!("{} {}px {}", self.weight.to_number(), self.size, self.family)
    }
}

/// Reports rendered pixel widths under an active font
pub trait TextMeasurer {
    /// Make `font` the active font
    fn set_font(&mut self, font: &FontSpec) -> Result<()>;

    /// Rendered width of `text` in pixels under the active font
    fn measure_text(&mut self, text: &str) -> Result<f32>;
}

/// A measurer that can also draw
pub trait TextCanvas: TextMeasurer {
    /// Set the color used by `fill_text`
    fn set_fill_color(&mut self, color: Color);

    /// Draw `text` with its top-left (top text baseline) at `origin`
    fn fill_text(&mut self, text: &str, origin: Point) -> Result<()>;
}

impl<T: TextMeasurer + ?Sized> TextMeasurer for &mut T {
    fn set_font(&mut self, font: &FontSpec) -> Result<()> {
        (**self).set_font(font)
    }

    fn measure_text(&mut self, text: &str) -> Result<f32> {
        (**self).measure_text(text)
    }
}

impl<T: TextCanvas + ?Sized> TextCanvas for &mut T {
    fn set_fill_color(&mut self, color: Color) {
        (**self).set_fill_color(color)
    }

    fn fill_text(&mut self, text: &str, origin: Point) -> Result<()> {
        (**self).fill_text(text, origin)
    }
}
