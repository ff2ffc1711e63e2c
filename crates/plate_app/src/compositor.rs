//! Full-resolution compositing
//!
//! One pass clears the surface, stretches the base image over the whole
//! template area and then fits and draws every slot in declaration order.
//! Slots whose trimmed live value is empty are omitted. The first slot that
//! cannot fit ends the pass; slots drawn before it stay on the surface.

use crate::error::Result;
use crate::surface::{RasterSurface, RenderSurface};
use plate_core::{Size, Template};
use plate_image::Pixmap;
use plate_text::{draw_slot_text, fit_text_with, FitResult, FitStrategy};
use rustc_hash::FxHashMap;

/// Advisory shown once per pass when any slot was shrunk
pub const SHRUNK_MESSAGE: &str = "Text was shrunk to fit the available space.";

/// Result of one composite pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Every non-empty slot was drawn; `shrunk` if any used less than nominal size
    Success { shrunk: bool },
    /// `slot` did not fit at its minimum size; the pass was aborted there
    Unfit { slot: String, label: String },
}

impl RenderOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RenderOutcome::Success { .. })
    }

    pub fn is_shrunk(&self) -> bool {
        matches!(self, RenderOutcome::Success { shrunk: true })
    }

    /// User-facing warning or error text, if any
    pub fn message(&self) -> Option<String> {
        match self {
            RenderOutcome::Success { shrunk: false } => None,
            RenderOutcome::Success { shrunk: true } => Some(SHRUNK_MESSAGE.to_string()),
            RenderOutcome::Unfit { label, .. } => {
                Some(format!("{} is too long. Shorten the text.", label))
            }
        }
    }
}

/// Owns the full-resolution surface and renders templates onto it
pub struct Compositor<S: RenderSurface = RasterSurface> {
    surface: S,
    strategy: FitStrategy,
}

impl<S: RenderSurface> Compositor<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            strategy: FitStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: FitStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> FitStrategy {
        self.strategy
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The composited pixels of the last pass
    pub fn pixmap(&self) -> &Pixmap {
        self.surface.pixmap()
    }

    /// Composite `template` with `live_values` (slot name to raw input)
    ///
    /// Unfit text is reported through [`RenderOutcome::Unfit`]; `Err` means a
    /// font could not be resolved or drawn.
    pub fn render_full_resolution(
        &mut self,
        template: &Template,
        base_image: &Pixmap,
        live_values: &FxHashMap<String, String>,
    ) -> Result<RenderOutcome> {
        let (width, height) = (template.width, template.height);
        if self.surface.size() != (width, height) {
            self.surface.resize(width, height);
        }
        self.surface.clear();
        self.surface
            .draw_image(base_image, Size::new(width as f32, height as f32).to_rect());

        let mut shrunk = false;
        for (name, slot) in template.slots() {
            let value = live_values.get(name).map(|v| v.trim()).unwrap_or("");
            if value.is_empty() {
                continue;
            }

            let text = slot.compose(value);
            match fit_text_with(&mut self.surface, &text, slot, self.strategy)? {
                FitResult::Fits {
                    font_size,
                    shrunk: slot_shrunk,
                } => {
                    if slot_shrunk {
                        tracing::debug!(
                            "Slot '{}' shrunk from {}px to {}px",
                            name,
                            slot.font_size,
                            font_size
                        );
                        shrunk = true;
                    }
                    draw_slot_text(&mut self.surface, &text, slot, font_size)?;
                }
                FitResult::Unfit => {
                    tracing::debug!(
                        "Slot '{}' does not fit at {}px: '{}'",
                        name,
                        slot.min_font_size(),
                        text
                    );
                    return Ok(RenderOutcome::Unfit {
                        slot: name.to_string(),
                        label: template.slot_label(name).to_string(),
                    });
                }
                FitResult::Skipped => {}
            }
        }

        Ok(RenderOutcome::Success { shrunk })
    }
}
