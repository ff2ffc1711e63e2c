//! Template registry
//!
//! The registry is loaded once at startup from a JSON document and is
//! read-only afterwards. Any parse or validation failure is a fatal
//! initialization error; nothing is retried.

use crate::error::{CoreError, Result};
use crate::template::Template;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize)]
struct RegistryDocument {
    templates: Vec<Template>,
}

/// Validated, immutable collection of templates
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    /// Templates in document order
    templates: Vec<Template>,
    /// Template id -> index into `templates`
    index: FxHashMap<String, usize>,
}

impl TemplateRegistry {
    /// Parse and validate a registry document
    ///
    /// Relative `baseImage` paths are kept as written.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: RegistryDocument = serde_json::from_str(json)?;
        Self::from_templates(document.templates)
    }

    /// Load a registry file
    ///
    /// Relative `baseImage` paths are resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| CoreError::RegistryRead {
            path: path.to_path_buf(),
            source,
        })?;

        let document: RegistryDocument = serde_json::from_str(&json)?;
        let mut templates = document.templates;
        if let Some(dir) = path.parent() {
            for template in &mut templates {
                template.resolve_base_image(dir);
            }
        }

        let registry = Self::from_templates(templates)?;
        tracing::debug!(
            "Loaded {} templates from {}",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    /// Build a registry from already constructed templates
    pub fn from_templates(templates: Vec<Template>) -> Result<Self> {
        let mut index = FxHashMap::default();

        for (position, template) in templates.iter().enumerate() {
            validate_template(template)?;
            if index.insert(template.id.clone(), position).is_some() {
                return Err(CoreError::DuplicateTemplate(template.id.clone()));
            }
        }

        Ok(Self { templates, index })
    }

    pub fn get(&self, id: &str) -> Option<&Template> {
        self.index.get(id).map(|&i| &self.templates[i])
    }

    /// Templates in document order
    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn validate_template(template: &Template) -> Result<()> {
    if template.id.is_empty() {
        return Err(CoreError::InvalidTemplate {
            template: template.name.clone(),
            reason: "id must not be empty".to_string(),
        });
    }
    if template.width == 0 || template.height == 0 {
        return Err(CoreError::InvalidTemplate {
            template: template.id.clone(),
            reason: format!(
                "output size must be positive (got {}x{})",
                template.width, template.height
            ),
        });
    }

    for (name, slot) in template.slots() {
        slot.validate().map_err(|reason| CoreError::InvalidSlot {
            template: template.id.clone(),
            slot: name.to_string(),
            reason,
        })?;
    }

    Ok(())
}
