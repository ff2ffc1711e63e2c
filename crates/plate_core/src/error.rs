//! Error types for plate_core

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating templates
#[derive(Error, Debug)]
pub enum CoreError {
    /// The registry file could not be read
    #[error("Failed to read template registry {path}: {source}")]
    RegistryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The registry JSON could not be parsed
    #[error("Failed to parse template registry: {0}")]
    RegistryParse(#[from] serde_json::Error),

    /// Two templates share the same id
    #[error("Duplicate template id '{0}'")]
    DuplicateTemplate(String),

    /// A template declares invalid dimensions or slots
    #[error("Invalid template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    /// A slot configuration violates its invariants
    #[error("Invalid slot '{slot}' in template '{template}': {reason}")]
    InvalidSlot {
        template: String,
        slot: String,
        reason: String,
    },

    /// A color string could not be parsed
    #[error("Invalid color '{0}'")]
    InvalidColor(String),
}

/// Result type for plate_core operations
pub type Result<T> = std::result::Result<T, CoreError>;
