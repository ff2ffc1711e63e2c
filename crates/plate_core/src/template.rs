//! Templates and text slot configuration
//!
//! A [`Template`] is a base raster image plus an ordered set of named text
//! slots. Two conventions are part of the slot contract:
//!
//! - **Order**: slots are evaluated and drawn in the order the template
//!   declares them. The order never depends on hashing or iteration quirks.
//! - **Omission**: an empty live value for a slot means "omit this slot".
//!   Nothing is measured or drawn for it.

use crate::color::Color;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default ratio between the minimum and the nominal font size
pub const DEFAULT_MIN_FONT_RATIO: f32 = 0.7;

/// Font weight variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "WeightRepr", into = "u16")]
pub enum FontWeight {
    Thin = 100,
    ExtraLight = 200,
    Light = 300,
    #[default]
    Regular = 400,
    Medium = 500,
    SemiBold = 600,
    Bold = 700,
    ExtraBold = 800,
    Black = 900,
}

impl FontWeight {
    /// Convert from numeric weight (100-900)
    pub fn from_number(weight: u16) -> Self {
        match weight {
            0..=149 => FontWeight::Thin,
            150..=249 => FontWeight::ExtraLight,
            250..=349 => FontWeight::Light,
            350..=449 => FontWeight::Regular,
            450..=549 => FontWeight::Medium,
            550..=649 => FontWeight::SemiBold,
            650..=749 => FontWeight::Bold,
            750..=849 => FontWeight::ExtraBold,
            _ => FontWeight::Black,
        }
    }

    /// Get numeric weight value
    pub fn to_number(self) -> u16 {
        self as u16
    }

    /// Parse a CSS weight keyword or number
    pub fn from_css(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "normal" | "regular" => Some(FontWeight::Regular),
            "bold" => Some(FontWeight::Bold),
            "lighter" | "light" => Some(FontWeight::Light),
            "bolder" => Some(FontWeight::Black),
            other => other.parse::<u16>().ok().map(Self::from_number),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WeightRepr {
    Number(u16),
    Keyword(String),
}

impl TryFrom<WeightRepr> for FontWeight {
    type Error = String;

    fn try_from(repr: WeightRepr) -> Result<Self, Self::Error> {
        match repr {
            WeightRepr::Number(n) => Ok(FontWeight::from_number(n)),
            WeightRepr::Keyword(k) => {
                FontWeight::from_css(&k).ok_or_else(|| format!("unknown font weight '{}'", k))
            }
        }
    }
}

impl From<FontWeight> for u16 {
    fn from(weight: FontWeight) -> Self {
        weight.to_number()
    }
}

/// Configuration of one dynamic text slot
///
/// Coordinates and sizes are in output pixels. `(x, y)` is the top-left
/// anchor of the rendered text (top text baseline).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSlotConfig {
    /// Prepended to the live value before fitting and drawing
    #[serde(default)]
    pub prefix: String,
    pub x: f32,
    pub y: f32,
    /// CSS-like family list, e.g. `"Montserrat, sans-serif"`
    pub font_family: String,
    #[serde(default)]
    pub font_weight: FontWeight,
    /// Nominal font size in pixels
    pub font_size: f32,
    /// Smallest size the fit engine may shrink to; unset, zero or negative
    /// means 70% of `font_size`
    #[serde(default)]
    pub min_font_size: Option<f32>,
    /// Maximum rendered width in pixels
    pub max_width: f32,
    #[serde(default)]
    pub color: Color,
    /// Extra pixels added after every glyph's natural advance
    #[serde(default)]
    pub letter_spacing: f32,
    /// Human name of the field, used in messages
    #[serde(default)]
    pub label: Option<String>,
    /// Whether export requires a value for this slot
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

impl TextSlotConfig {
    /// Create a slot with default styling
    pub fn new(font_family: impl Into<String>, font_size: f32, max_width: f32) -> Self {
        Self {
            prefix: String::new(),
            x: 0.0,
            y: 0.0,
            font_family: font_family.into(),
            font_weight: FontWeight::Regular,
            font_size,
            min_font_size: None,
            max_width,
            color: Color::BLACK,
            letter_spacing: 0.0,
            label: None,
            required: true,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_min_font_size(mut self, size: f32) -> Self {
        self.min_font_size = Some(size);
        self
    }

    pub fn with_letter_spacing(mut self, spacing: f32) -> Self {
        self.letter_spacing = spacing;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.font_weight = weight;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Minimum font size, defaulting to 70% of the nominal size
    pub fn min_font_size(&self) -> f32 {
        self.min_font_size
            .filter(|min| *min > 0.0)
            .unwrap_or(self.font_size * DEFAULT_MIN_FONT_RATIO)
    }

    /// Letter spacing, `None` when unset or zero
    pub fn letter_spacing(&self) -> Option<f32> {
        (self.letter_spacing != 0.0).then_some(self.letter_spacing)
    }

    /// The text actually fitted and drawn for a live value
    pub fn compose(&self, value: &str) -> String {
        format!("{}{}", self.prefix, value)
    }

    /// Check the slot invariants
    pub fn validate(&self) -> Result<(), String> {
        if !(self.font_size > 0.0) {
            return Err(format!("fontSize must be > 0 (got {})", self.font_size));
        }
        if !(self.max_width > 0.0) {
            return Err(format!("maxWidth must be > 0 (got {})", self.max_width));
        }
        let min = self.min_font_size();
        if !(min > 0.0) || min > self.font_size {
            return Err(format!(
                "minFontSize must be in (0, {}] (got {})",
                self.font_size, min
            ));
        }
        if self.font_family.trim().is_empty() {
            return Err("fontFamily must not be empty".to_string());
        }
        Ok(())
    }
}

/// A template: base image, output size and ordered text slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    pub base_image: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Every other key of the record is a slot, in declaration order
    #[serde(flatten)]
    slots: IndexMap<String, TextSlotConfig>,
}

impl Template {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        base_image: impl Into<PathBuf>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            base_image: base_image.into(),
            width,
            height,
            slots: IndexMap::new(),
        }
    }

    /// Append a slot; later slots are drawn after earlier ones
    pub fn with_slot(mut self, name: impl Into<String>, config: TextSlotConfig) -> Self {
        self.slots.insert(name.into(), config);
        self
    }

    /// Slots in declaration order
    pub fn slots(&self) -> impl Iterator<Item = (&str, &TextSlotConfig)> {
        self.slots.iter().map(|(name, config)| (name.as_str(), config))
    }

    pub fn slot(&self, name: &str) -> Option<&TextSlotConfig> {
        self.slots.get(name)
    }

    /// Human name of a slot: its `label`, else the slot name
    pub fn slot_label<'a>(&'a self, name: &'a str) -> &'a str {
        self.slots
            .get(name)
            .and_then(|config| config.label.as_deref())
            .unwrap_or(name)
    }

    /// Resolve a relative base image path against `dir`
    pub(crate) fn resolve_base_image(&mut self, dir: &Path) {
        if self.base_image.is_relative() {
            self.base_image = dir.join(&self.base_image);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_font_size_defaults_to_seventy_percent() {
        let slot = TextSlotConfig::new("Inter", 40.0, 200.0);
        assert!((slot.min_font_size() - 28.0).abs() < 1e-4);

        let slot = slot.with_min_font_size(30.0);
        assert_eq!(slot.min_font_size(), 30.0);
    }

    #[test]
    fn test_non_positive_min_font_size_uses_default() {
        for min in [0.0, -5.0] {
            let slot = TextSlotConfig::new("Inter", 40.0, 200.0).with_min_font_size(min);
            assert!((slot.min_font_size() - 28.0).abs() < 1e-4);
            assert!(slot.validate().is_ok());
        }
    }

    #[test]
    fn test_zero_letter_spacing_is_unset() {
        let slot = TextSlotConfig::new("Inter", 40.0, 200.0);
        assert_eq!(slot.letter_spacing(), None);
        assert_eq!(slot.with_letter_spacing(2.0).letter_spacing(), Some(2.0));
    }

    #[test]
    fn test_validate_rejects_min_above_nominal() {
        let slot = TextSlotConfig::new("Inter", 40.0, 200.0).with_min_font_size(41.0);
        assert!(slot.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_positive_width() {
        assert!(TextSlotConfig::new("Inter", 40.0, 0.0).validate().is_err());
        assert!(TextSlotConfig::new("Inter", 40.0, 1.0).validate().is_ok());
    }

    #[test]
    fn test_font_weight_keywords() {
        assert_eq!(FontWeight::from_css("bold"), Some(FontWeight::Bold));
        assert_eq!(FontWeight::from_css("600"), Some(FontWeight::SemiBold));
        assert_eq!(FontWeight::from_css("heavy"), None);
    }

    #[test]
    fn test_slots_keep_declaration_order() {
        let template = Template::new("a", "A", "a.png", 10, 10)
            .with_slot("version", TextSlotConfig::new("Inter", 40.0, 200.0))
            .with_slot("validFrom", TextSlotConfig::new("Inter", 30.0, 300.0))
            .with_slot("author", TextSlotConfig::new("Inter", 20.0, 100.0));

        let names: Vec<_> = template.slots().map(|(name, _)| name).collect();
        assert_eq!(names, ["version", "validFrom", "author"]);
    }

    #[test]
    fn test_slot_label_falls_back_to_name() {
        let template = Template::new("a", "A", "a.png", 10, 10)
            .with_slot(
                "version",
                TextSlotConfig::new("Inter", 40.0, 200.0).with_label("Version"),
            )
            .with_slot("validFrom", TextSlotConfig::new("Inter", 30.0, 300.0));

        assert_eq!(template.slot_label("version"), "Version");
        assert_eq!(template.slot_label("validFrom"), "validFrom");
    }
}
