//! Plate application layer
//!
//! Ties the template registry, the text fit engine and the raster surfaces
//! together:
//!
//! - [`RenderSurface`] / [`RasterSurface`]: the drawing target and its
//!   software implementation with real fonts
//! - [`Compositor`]: one full-resolution pass over a template
//! - [`Debouncer`]: collapses bursts of edits into one render
//! - [`Session`]: explicit generator state (selection, values, preview,
//!   export) with no presentation layer attached
//!
//! # Example
//!
//! ```ignore
//! use plate_app::{RasterSurface, Session};
//! use plate_core::TemplateRegistry;
//! use plate_text::FontRegistry;
//!
//! let registry = TemplateRegistry::load("templates.json".as_ref())?;
//! let mut session = Session::new(registry, RasterSurface::new(1, 1, FontRegistry::new()));
//! session.select_template("b2b-a")?;
//! session.set_value("version", "2.3.1", std::time::Instant::now());
//! session.render()?;
//! let artifact = session.export()?;
//! ```

mod compositor;
mod debounce;
mod error;
mod session;
mod surface;

#[cfg(test)]
mod tests;

pub use compositor::{Compositor, RenderOutcome, SHRUNK_MESSAGE};
pub use debounce::{Debouncer, DEFAULT_DEBOUNCE};
pub use error::{AppError, Result};
pub use session::{ExportArtifact, Session, SessionConfig, VERSION_SLOT};
pub use surface::{RasterSurface, RenderSurface};
