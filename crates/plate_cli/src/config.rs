//! `plate.toml` handling
//!
//! Every key is optional. Relative paths are resolved against the directory
//! holding the config file.

use anyhow::{Context, Result};
use plate_app::SessionConfig;
use plate_text::FitStrategy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "plate.toml";

/// Generator configuration stored in plate.toml
#[derive(Debug, Deserialize, Serialize)]
pub struct PlateConfig {
    /// Template registry (JSON)
    #[serde(default = "default_registry")]
    pub registry: PathBuf,
    #[serde(default)]
    pub fonts: FontsConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

fn default_registry() -> PathBuf {
    PathBuf::from("templates.json")
}

/// Font discovery
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct FontsConfig {
    /// Extra font directories, searched before system fonts
    #[serde(default)]
    pub dirs: Vec<PathBuf>,
    /// Individual font files, e.g. brand faces shipped next to the templates
    #[serde(default)]
    pub files: Vec<PathBuf>,
}

/// Preview scaling and scheduling
#[derive(Debug, Deserialize, Serialize)]
pub struct PreviewConfig {
    #[serde(default = "default_max_width")]
    pub max_width: u32,
    #[serde(default = "default_max_height")]
    pub max_height: u32,
    /// Quiet time after an edit before re-rendering
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_max_width() -> u32 {
    800
}

fn default_max_height() -> u32 {
    600
}

fn default_debounce_ms() -> u64 {
    150
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            max_width: default_max_width(),
            max_height: default_max_height(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// Output settings
#[derive(Debug, Deserialize, Serialize)]
pub struct RenderConfig {
    /// Where exported images are written
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// `linear` or `bisect`
    #[serde(default = "default_fit_strategy")]
    pub fit_strategy: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_fit_strategy() -> String {
    "linear".to_string()
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            fit_strategy: default_fit_strategy(),
        }
    }
}

impl Default for PlateConfig {
    fn default() -> Self {
        Self {
            registry: default_registry(),
            fonts: FontsConfig::default(),
            preview: PreviewConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl PlateConfig {
    /// Load a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let mut config: PlateConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        if let Some(dir) = path.parent() {
            config.resolve_paths(dir);
        }
        Ok(config)
    }

    /// Load `path` if given, else `plate.toml` in `dir` if present, else defaults
    pub fn discover(path: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        let candidate = dir.join(CONFIG_FILE);
        if candidate.exists() {
            return Self::load(&candidate);
        }

        tracing::debug!("No {} in {}, using defaults", CONFIG_FILE, dir.display());
        let mut config = Self::default();
        config.resolve_paths(dir);
        Ok(config)
    }

    fn resolve_paths(&mut self, dir: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = dir.join(&*path);
            }
        };
        resolve(&mut self.registry);
        resolve(&mut self.render.output_dir);
        self.fonts.dirs.iter_mut().for_each(resolve);
        self.fonts.files.iter_mut().for_each(resolve);
    }

    pub fn fit_strategy(&self) -> Result<FitStrategy> {
        self.render
            .fit_strategy
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))
    }

    pub fn session_config(&self) -> Result<SessionConfig> {
        Ok(SessionConfig {
            preview_max_width: self.preview.max_width,
            preview_max_height: self.preview.max_height,
            debounce: Duration::from_millis(self.preview.debounce_ms),
            fit_strategy: self.fit_strategy()?,
        })
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
