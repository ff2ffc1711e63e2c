//! Application state
//!
//! A [`Session`] is the whole generator without any presentation layer:
//! the template registry, the current selection, the live field values,
//! the compositor with its full-resolution surface and the derived preview.
//! Front ends feed it edits and clock ticks and read back the preview,
//! the last outcome and export artifacts.

use crate::compositor::{Compositor, RenderOutcome};
use crate::debounce::{Debouncer, DEFAULT_DEBOUNCE};
use crate::error::{AppError, Result};
use crate::surface::{RasterSurface, RenderSurface};
use plate_core::{Template, TemplateRegistry};
use plate_image::{output_file_name, scale_to_fit, Pixmap};
use plate_text::FitStrategy;
use rustc_hash::FxHashMap;
use std::time::{Duration, Instant};

/// Slot whose value names exported files
pub const VERSION_SLOT: &str = "version";

/// Session tuning
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Preview bounds; the preview never exceeds them and is never upscaled
    pub preview_max_width: u32,
    pub preview_max_height: u32,
    /// Quiet time after the last edit before a render runs
    pub debounce: Duration,
    pub fit_strategy: FitStrategy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            preview_max_width: 800,
            preview_max_height: 600,
            debounce: DEFAULT_DEBOUNCE,
            fit_strategy: FitStrategy::Linear,
        }
    }
}

/// An encoded output image and its file name
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub file_name: String,
    pub png: Vec<u8>,
}

struct Selection {
    template: Template,
    base_image: Pixmap,
}

/// Explicit generator state, driven by edits and ticks
pub struct Session<S: RenderSurface = RasterSurface> {
    registry: TemplateRegistry,
    selection: Option<Selection>,
    values: FxHashMap<String, String>,
    compositor: Compositor<S>,
    preview: Option<Pixmap>,
    last_outcome: Option<RenderOutcome>,
    config: SessionConfig,
    debouncer: Debouncer,
}

impl<S: RenderSurface> Session<S> {
    pub fn new(registry: TemplateRegistry, surface: S) -> Self {
        Self::with_config(registry, surface, SessionConfig::default())
    }

    pub fn with_config(registry: TemplateRegistry, surface: S, config: SessionConfig) -> Self {
        Self {
            registry,
            selection: None,
            values: FxHashMap::default(),
            compositor: Compositor::new(surface).with_strategy(config.fit_strategy),
            preview: None,
            last_outcome: None,
            debouncer: Debouncer::new(config.debounce),
            config,
        }
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn selected_template(&self) -> Option<&Template> {
        self.selection.as_ref().map(|s| &s.template)
    }

    /// Scaled copy of the last successful composite
    pub fn preview(&self) -> Option<&Pixmap> {
        self.preview.as_ref()
    }

    pub fn compositor(&self) -> &Compositor<S> {
        &self.compositor
    }

    /// Full-resolution composite of the last pass
    pub fn composite(&self) -> &Pixmap {
        self.compositor.pixmap()
    }

    pub fn last_outcome(&self) -> Option<&RenderOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn value(&self, slot: &str) -> Option<&str> {
        self.values.get(slot).map(String::as_str)
    }

    pub fn is_render_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Select a template, load its base image and render immediately
    ///
    /// On failure the previous selection is dropped.
    pub fn select_template(&mut self, id: &str) -> Result<RenderOutcome> {
        self.clear_template();

        let template = self
            .registry
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::UnknownTemplate(id.to_string()))?;
        let base_image =
            Pixmap::load(template.base_image.as_path()).map_err(|source| AppError::BaseImage {
                template: id.to_string(),
                source,
            })?;

        tracing::info!(
            "Selected template '{}' ({}x{})",
            template.id,
            template.width,
            template.height
        );
        self.selection = Some(Selection {
            template,
            base_image,
        });
        self.render()
    }

    /// Drop the selection, its preview and any pending render
    pub fn clear_template(&mut self) {
        self.selection = None;
        self.preview = None;
        self.last_outcome = None;
        self.debouncer.cancel();
    }

    /// Store a field value and push back the pending render
    pub fn set_value(&mut self, slot: impl Into<String>, value: impl Into<String>, now: Instant) {
        self.values.insert(slot.into(), value.into());
        if self.selection.is_some() {
            self.debouncer.schedule(now);
        }
    }

    /// Run the pending render if its deadline has passed
    pub fn tick(&mut self, now: Instant) -> Result<Option<RenderOutcome>> {
        if self.debouncer.poll(now) {
            self.render().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Composite now and regenerate the preview on success
    ///
    /// An unfit or failed pass leaves the previous preview in place and
    /// disables export until a later pass succeeds.
    pub fn render(&mut self) -> Result<RenderOutcome> {
        self.debouncer.cancel();
        let selection = self
            .selection
            .as_ref()
            .ok_or_else(|| AppError::Validation("Select a template".to_string()))?;

        let outcome = match self.compositor.render_full_resolution(
            &selection.template,
            &selection.base_image,
            &self.values,
        ) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.last_outcome = None;
                return Err(err);
            }
        };

        match &outcome {
            RenderOutcome::Success { shrunk } => {
                self.preview = Some(scale_to_fit(
                    self.compositor.pixmap(),
                    self.config.preview_max_width,
                    self.config.preview_max_height,
                ));
                if *shrunk {
                    tracing::warn!("Template '{}': text was shrunk", selection.template.id);
                }
            }
            RenderOutcome::Unfit { slot, .. } => {
                tracing::warn!(
                    "Template '{}': slot '{}' is too long",
                    selection.template.id,
                    slot
                );
            }
        }

        self.last_outcome = Some(outcome.clone());
        Ok(outcome)
    }

    /// Check export preconditions without rendering
    pub fn validate(&self) -> Result<&Template> {
        let selection = self
            .selection
            .as_ref()
            .ok_or_else(|| AppError::Validation("Select a template".to_string()))?;
        let template = &selection.template;

        for (name, slot) in template.slots() {
            let filled = self.value(name).map_or(false, |v| !v.trim().is_empty());
            if slot.required && !filled {
                return Err(AppError::Validation(format!(
                    "Enter {}",
                    template.slot_label(name)
                )));
            }
        }
        Ok(template)
    }

    /// Whether an export would currently be accepted
    pub fn can_export(&self) -> bool {
        self.validate().is_ok()
            && self
                .last_outcome
                .as_ref()
                .map_or(false, RenderOutcome::is_success)
    }

    /// Re-render and encode the full-resolution composite
    pub fn export(&mut self) -> Result<ExportArtifact> {
        let template = self.validate()?;
        let file_name = output_file_name(&template.id, &self.file_version(template));

        if let RenderOutcome::Unfit { slot, label } = self.render()? {
            return Err(AppError::TooLong { slot, label });
        }

        let png = self.compositor.pixmap().encode_png()?;
        tracing::info!("Exported {} ({} bytes)", file_name, png.len());
        Ok(ExportArtifact { file_name, png })
    }

    /// Version string for file naming: the `version` slot, else the first slot
    fn file_version(&self, template: &Template) -> String {
        let name = if template.slot(VERSION_SLOT).is_some() {
            Some(VERSION_SLOT)
        } else {
            template.slots().next().map(|(name, _)| name)
        };
        name.and_then(|name| self.value(name))
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }
}
