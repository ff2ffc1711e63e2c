//! Preview scaling
//!
//! Produces a fresh, downscaled copy of a composited surface. Never
//! upscales and never touches the source.

use crate::pixmap::Pixmap;
use image::imageops::{self, FilterType};

/// Target dimensions for fitting `width`x`height` into `max_width`x`max_height`
///
/// `scale = min(max_width / width, max_height / height, 1)`, dimensions are
/// floored and clamped to at least one pixel.
pub fn fit_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }

    let scale = (max_width as f64 / width as f64)
        .min(max_height as f64 / height as f64)
        .min(1.0);

    let target = |dim: u32| ((dim as f64 * scale).floor() as u32).max(1);
    (target(width), target(height))
}

/// Scale `source` down to fit within the bounds
pub fn scale_to_fit(source: &Pixmap, max_width: u32, max_height: u32) -> Pixmap {
    let (width, height) = fit_dimensions(source.width(), source.height(), max_width, max_height);
    if (width, height) == source.dimensions() {
        return source.clone();
    }

    tracing::trace!(
        "Scaling preview {}x{} -> {}x{}",
        source.width(),
        source.height(),
        width,
        height
    );
    Pixmap::from_image(imageops::resize(
        source.as_image(),
        width,
        height,
        FilterType::Triangle,
    ))
}
