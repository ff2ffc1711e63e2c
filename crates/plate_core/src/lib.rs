//! Plate Core
//!
//! This crate provides the data model shared by every other plate crate:
//!
//! - **Templates**: base image reference, output dimensions and ordered text slots
//! - **Text slots**: anchor, font, size range, width limit, color and letter spacing
//! - **Registry**: the immutable, validated set of templates loaded at startup
//! - **Primitives**: colors, points, sizes and rectangles in output pixel space
//!
//! # Example
//!
//! ```rust
//! use plate_core::TemplateRegistry;
//!
//! let registry = TemplateRegistry::from_json_str(r##"{
//!     "templates": [{
//!         "id": "a",
//!         "name": "Template A",
//!         "baseImage": "a.png",
//!         "width": 2000,
//!         "height": 3000,
//!         "version": {
//!             "prefix": "v",
//!             "x": 100, "y": 80,
//!             "fontFamily": "Inter",
//!             "fontSize": 40,
//!             "minFontSize": 28,
//!             "maxWidth": 200,
//!             "color": "#ffffff"
//!         }
//!     }]
//! }"##).unwrap();
//!
//! let template = registry.get("a").unwrap();
//! assert_eq!(template.slots().count(), 1);
//! ```

pub mod color;
pub mod error;
pub mod geometry;
pub mod registry;
pub mod template;

pub use color::Color;
pub use error::{CoreError, Result};
pub use geometry::{Point, Rect, Size};
pub use registry::TemplateRegistry;
pub use template::{FontWeight, Template, TextSlotConfig};
