//! Raster surfaces for plate
//!
//! - [`Pixmap`]: an owned RGBA8 surface with the few drawing primitives the
//!   compositor needs (clear, stretched image blit, coverage-mask fill)
//! - Decoding of base template images ([`Pixmap::load`])
//! - [`scale_to_fit`]: downscaled preview copies
//! - PNG export and deterministic output file names

pub mod error;
pub mod export;
pub mod loader;
pub mod pixmap;
pub mod scale;

pub use error::{ImageError, Result};
pub use export::{output_file_name, sanitize_file_component};
pub use pixmap::Pixmap;
pub use scale::{fit_dimensions, scale_to_fit};
