//! Font registry for font discovery and caching
//!
//! Uses fontdb to resolve a CSS-like family list (`"Montserrat, sans-serif"`)
//! and a weight to a parsed [`FontFace`].
//!
//! Fonts registered explicitly (bundled font directories, raw data) are
//! searched first. The full system font scan is deferred until a lookup
//! fails, since it can be slow.

use crate::font::FontFace;
use crate::{Result, TextError};
use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use plate_core::FontWeight;
use rustc_hash::FxHashMap;
use std::path::Path;
use std::sync::Arc;

/// Generic font category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenericFont {
    /// Default system UI font
    System,
    Monospace,
    Serif,
    SansSerif,
    Cursive,
    Fantasy,
}

impl GenericFont {
    /// Parse a CSS generic family keyword
    pub fn from_css(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "system-ui" | "ui-sans-serif" => Some(GenericFont::System),
            "monospace" | "ui-monospace" => Some(GenericFont::Monospace),
            "serif" | "ui-serif" => Some(GenericFont::Serif),
            "sans-serif" => Some(GenericFont::SansSerif),
            "cursive" => Some(GenericFont::Cursive),
            "fantasy" => Some(GenericFont::Fantasy),
            _ => None,
        }
    }

    fn family(self) -> Family<'static> {
        match self {
            GenericFont::System | GenericFont::SansSerif => Family::SansSerif,
            GenericFont::Monospace => Family::Monospace,
            GenericFont::Serif => Family::Serif,
            GenericFont::Cursive => Family::Cursive,
            GenericFont::Fantasy => Family::Fantasy,
        }
    }

    /// Named fonts tried when fontdb's generic mapping finds nothing
    fn fallback_names(self) -> &'static [&'static str] {
        match self {
            GenericFont::System | GenericFont::SansSerif => &[
                "Roboto",
                "Helvetica",
                "Arial",
                "Noto Sans",
                "DejaVu Sans",
                "Liberation Sans",
            ],
            GenericFont::Serif => &[
                "Noto Serif",
                "Times New Roman",
                "Georgia",
                "DejaVu Serif",
                "Liberation Serif",
            ],
            GenericFont::Monospace => &[
                "Roboto Mono",
                "Menlo",
                "Consolas",
                "DejaVu Sans Mono",
                "Liberation Mono",
            ],
            GenericFont::Cursive | GenericFont::Fantasy => &[],
        }
    }
}

/// One entry of a font family list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FamilyName {
    Named(String),
    Generic(GenericFont),
}

/// Split a CSS-like family list into entries, in priority order
///
/// Quotes around names are removed; unquoted generic keywords map to
/// [`GenericFont`].
pub fn parse_family_list(list: &str) -> Vec<FamilyName> {
    list.split(',')
        .filter_map(|entry| {
            let entry = entry.trim();
            let unquoted = entry.trim_matches(|c| c == '"' || c == '\'');
            if unquoted.is_empty() {
                return None;
            }
            if unquoted.len() == entry.len() {
                if let Some(generic) = GenericFont::from_css(unquoted) {
                    return Some(FamilyName::Generic(generic));
                }
            }
            Some(FamilyName::Named(unquoted.to_string()))
        })
        .collect()
}

/// Font registry that discovers and caches fonts
pub struct FontRegistry {
    db: Database,
    /// Cached faces keyed by family list and weight (None = not found)
    faces: FxHashMap<String, Option<Arc<FontFace>>>,
    /// Whether the full system font scan has been performed
    system_fonts_loaded: bool,
}

impl FontRegistry {
    /// Create an empty registry; system fonts are scanned lazily
    pub fn new() -> Self {
        Self {
            db: Database::new(),
            faces: FxHashMap::default(),
            system_fonts_loaded: false,
        }
    }

    /// Load every font file in a directory (recursively)
    pub fn load_font_dir(&mut self, dir: &Path) -> usize {
        let before = self.db.len();
        self.db.load_fonts_dir(dir);
        let loaded = self.db.len() - before;
        tracing::debug!("Loaded {} font faces from {}", loaded, dir.display());
        self.forget_misses();
        loaded
    }

    /// Load a single font file
    pub fn load_font_file(&mut self, path: &Path) -> Result<()> {
        self.db.load_font_file(path).map_err(|e| {
            TextError::FontLoadError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        self.forget_misses();
        Ok(())
    }

    /// Number of faces known to the registry
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    fn ensure_system_fonts_loaded(&mut self) {
        if self.system_fonts_loaded {
            return;
        }

        tracing::debug!("Loading all system fonts (lazy scan)...");
        self.db.load_system_fonts();
        self.system_fonts_loaded = true;
        self.forget_misses();
        tracing::debug!("System fonts loaded: {} faces", self.db.len());
    }

    /// Drop cached negative lookups after new fonts were added
    fn forget_misses(&mut self) {
        self.faces.retain(|_, face| face.is_some());
    }

    /// Resolve a family list and weight to a font face
    pub fn resolve(&mut self, family_list: &str, weight: FontWeight) -> Result<Arc<FontFace>> {
        let cache_key = format!("{}:w{}", family_list, weight.to_number());

        if let Some(cached) = self.faces.get(&cache_key) {
            return cached.clone().ok_or_else(|| TextError::FontNotFound {
                family: family_list.to_string(),
                weight: weight.to_number(),
            });
        }

        let families = parse_family_list(family_list);
        let mut id = self.find_face_id(&families, weight);
        if id.is_none() && !self.system_fonts_loaded {
            self.ensure_system_fonts_loaded();
            id = self.find_face_id(&families, weight);
        }

        let Some(id) = id else {
            tracing::warn!(
                "Font '{}' (weight={}) not found",
                family_list,
                weight.to_number()
            );
            self.faces.insert(cache_key, None);
            return Err(TextError::FontNotFound {
                family: family_list.to_string(),
                weight: weight.to_number(),
            });
        };

        let face = self
            .db
            .with_face_data(id, |data, index| {
                FontFace::from_data_with_index(data.to_vec(), index)
            })
            .ok_or_else(|| TextError::FontLoadError("Font source not found".to_string()))??;
        let face = Arc::new(face);

        tracing::debug!(
            "Resolved '{}' (weight={}) to '{}' ({:?})",
            family_list,
            weight.to_number(),
            face.family_name(),
            face.weight()
        );
        self.faces.insert(cache_key, Some(Arc::clone(&face)));

        Ok(face)
    }

    /// First face matching the family list, in list order
    fn find_face_id(&self, families: &[FamilyName], weight: FontWeight) -> Option<fontdb::ID> {
        families.iter().find_map(|family| match family {
            FamilyName::Named(name) => self.query(Family::Name(name.as_str()), weight),
            FamilyName::Generic(generic) => self.find_generic_face_id(*generic, weight),
        })
    }

    fn find_generic_face_id(&self, generic: GenericFont, weight: FontWeight) -> Option<fontdb::ID> {
        if let Some(id) = self.query(generic.family(), weight) {
            return Some(id);
        }

        // Generic queries may not match fonts loaded by path
        generic
            .fallback_names()
            .iter()
            .find_map(|name| self.query(Family::Name(name), weight))
    }

    fn query(&self, family: Family<'_>, weight: FontWeight) -> Option<fontdb::ID> {
        let families = [family];
        let query = Query {
            families: &families,
            weight: Weight(weight.to_number()),
            style: Style::Normal,
            stretch: Stretch::Normal,
        };
        self.db.query(&query)
    }
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}
