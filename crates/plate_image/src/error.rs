//! Error types for plate_image

use thiserror::Error;

/// Errors that can occur while loading, drawing or encoding images
#[derive(Error, Debug)]
pub enum ImageError {
    /// Failed to read an image file
    #[error("Failed to load image file: {0}")]
    FileLoad(String),

    /// Failed to decode image data
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// Failed to encode image data
    #[error("Failed to encode image: {0}")]
    Encode(String),

    /// Pixel buffer does not match the declared dimensions
    #[error("Invalid image dimensions {width}x{height}: {reason}")]
    InvalidDimensions {
        width: u32,
        height: u32,
        reason: String,
    },
}

impl From<image::ImageError> for ImageError {
    fn from(err: image::ImageError) -> Self {
        ImageError::Decode(err.to_string())
    }
}

/// Result type for image operations
pub type Result<T> = std::result::Result<T, ImageError>;
