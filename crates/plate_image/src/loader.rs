//! Base image loading
//!
//! A missing or undecodable base image is fatal for the template that
//! references it; there is no placeholder fallback.

use crate::error::{ImageError, Result};
use crate::pixmap::Pixmap;
use std::path::Path;

impl Pixmap {
    /// Load and decode an image file (PNG or JPEG)
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| ImageError::FileLoad(format!("{}: {}", path.display(), e)))?;
        let pixmap = Self::from_bytes(&data)?;
        tracing::debug!(
            "Decoded {} ({}x{})",
            path.display(),
            pixmap.width(),
            pixmap.height()
        );
        Ok(pixmap)
    }

    /// Decode an image from encoded bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(data)?;
        Ok(Self::from_image(img.to_rgba8()))
    }
}
