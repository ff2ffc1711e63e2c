//! Error types for plate_app

use plate_core::CoreError;
use plate_image::ImageError;
use plate_text::TextError;
use thiserror::Error;

/// Errors that can occur while compositing or exporting
#[derive(Error, Debug)]
pub enum AppError {
    /// Template registry could not be loaded or is invalid
    #[error(transparent)]
    Registry(#[from] CoreError),

    /// Font resolution or glyph rendering failed
    #[error(transparent)]
    Text(#[from] TextError),

    /// Image decoding or encoding failed
    #[error(transparent)]
    Image(#[from] ImageError),

    /// No template with this id is registered
    #[error("Unknown template '{0}'")]
    UnknownTemplate(String),

    /// The base image of the selected template could not be loaded
    #[error("Failed to load base image for template '{template}': {source}")]
    BaseImage {
        template: String,
        #[source]
        source: ImageError,
    },

    /// Export preconditions are not met
    #[error("{0}")]
    Validation(String),

    /// A slot's text does not fit even at its minimum font size
    #[error("{label} is too long. Shorten the text.")]
    TooLong { slot: String, label: String },
}

/// Result type for plate_app operations
pub type Result<T> = std::result::Result<T, AppError>;
