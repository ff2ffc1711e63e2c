//! Plate CLI
//!
//! List templates, check that their assets resolve, and render labelled
//! images from the command line.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use plate_app::{RasterSurface, RenderOutcome, Session};
use plate_core::TemplateRegistry;
use plate_image::Pixmap;
use plate_text::{FontRegistry, FontSpec, TextMeasurer};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;

use config::{PlateConfig, CONFIG_FILE};

#[derive(Parser)]
#[command(name = "plate")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Render text onto image templates", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: ./plate.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Template registry, overrides the config
    #[arg(short, long, global = true)]
    registry: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered templates and their slots
    List,

    /// Render a template and export it as PNG
    Render {
        /// Template id
        template: String,

        /// Slot value, repeatable: --set version=2.3.1
        #[arg(short = 's', long = "set", value_parser = parse_assignment)]
        values: Vec<(String, String)>,

        /// Output file or directory (default: render.output_dir)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the scaled preview here
        #[arg(long)]
        preview: Option<PathBuf>,
    },

    /// Check that every template's base image and fonts load
    Check,

    /// Write a default plate.toml in the current directory
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let cwd = std::env::current_dir()?;
    let config = || load_config(cli.config.as_deref(), cli.registry.as_deref(), &cwd);

    match &cli.command {
        Commands::List => cmd_list(&config()?),
        Commands::Render {
            template,
            values,
            output,
            preview,
        } => cmd_render(
            &config()?,
            template,
            values,
            output.as_deref(),
            preview.as_deref(),
        ),
        Commands::Check => cmd_check(&config()?),
        Commands::Init => cmd_init(&cwd),
    }
}

fn load_config(path: Option<&Path>, registry: Option<&Path>, cwd: &Path) -> Result<PlateConfig> {
    let mut config = PlateConfig::discover(path, cwd)?;
    if let Some(registry) = registry {
        config.registry = registry.to_path_buf();
    }
    Ok(config)
}

/// Parse `slot=value`; the value may contain further `=`
fn parse_assignment(s: &str) -> std::result::Result<(String, String), String> {
    let (slot, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected SLOT=VALUE, got '{}'", s))?;
    let slot = slot.trim();
    if slot.is_empty() {
        return Err(format!("missing slot name in '{}'", s));
    }
    Ok((slot.to_string(), value.to_string()))
}

fn load_registry(config: &PlateConfig) -> Result<TemplateRegistry> {
    TemplateRegistry::load(&config.registry)
        .with_context(|| format!("Failed to load templates from {}", config.registry.display()))
}

fn load_fonts(config: &PlateConfig) -> Result<FontRegistry> {
    let mut fonts = FontRegistry::new();
    for dir in &config.fonts.dirs {
        let count = fonts.load_font_dir(dir);
        if count == 0 {
            warn!("No fonts found in {}", dir.display());
        }
    }
    for file in &config.fonts.files {
        fonts.load_font_file(file)?;
    }
    debug!("{} configured font faces", fonts.face_count());
    Ok(fonts)
}

fn open_session(config: &PlateConfig) -> Result<Session> {
    let registry = load_registry(config)?;
    let surface = RasterSurface::new(1, 1, load_fonts(config)?);
    Ok(Session::with_config(registry, surface, config.session_config()?))
}

fn cmd_list(config: &PlateConfig) -> Result<()> {
    let registry = load_registry(config)?;

    for template in registry.iter() {
        println!(
            "{:<16} {} ({} x {} px)",
            template.id, template.name, template.width, template.height
        );
        for (name, slot) in template.slots() {
            println!(
                "    {:<14} {} {}px (min {}px), max width {}px",
                name,
                slot.font_family,
                slot.font_size,
                slot.min_font_size(),
                slot.max_width
            );
        }
    }

    Ok(())
}

fn cmd_render(
    config: &PlateConfig,
    template: &str,
    values: &[(String, String)],
    output: Option<&Path>,
    preview: Option<&Path>,
) -> Result<()> {
    let mut session = open_session(config)?;
    session.select_template(template)?;

    let now = Instant::now();
    for (slot, value) in values {
        let known = session
            .selected_template()
            .map_or(false, |t| t.slot(slot).is_some());
        if !known {
            anyhow::bail!("Template '{}' has no slot '{}'", template, slot);
        }
        session.set_value(slot.as_str(), value.as_str(), now);
    }

    let outcome = session.render()?;
    match (&outcome, outcome.message()) {
        (RenderOutcome::Unfit { .. }, Some(message)) => anyhow::bail!(message),
        (_, Some(message)) => warn!("{}", message),
        _ => {}
    }

    let artifact = session.export()?;
    let path = match output {
        Some(path) if path.is_dir() => path.join(&artifact.file_name),
        Some(path) => path.to_path_buf(),
        None => config.render.output_dir.join(&artifact.file_name),
    };
    write_file(&path, &artifact.png)?;
    info!("Wrote {}", path.display());

    if let Some(preview_path) = preview {
        let png = session
            .preview()
            .map(Pixmap::encode_png)
            .transpose()?
            .context("No preview was rendered")?;
        write_file(preview_path, &png)?;
        info!("Wrote preview {}", preview_path.display());
    }

    Ok(())
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}

fn cmd_check(config: &PlateConfig) -> Result<()> {
    let registry = load_registry(config)?;
    let mut fonts = load_fonts(config)?;
    let mut failures = 0usize;

    for template in registry.iter() {
        match Pixmap::load(template.base_image.as_path()) {
            Ok(image) if image.dimensions() != (template.width, template.height) => warn!(
                "{}: base image is {}x{}, will be stretched to {}x{}",
                template.id,
                image.width(),
                image.height(),
                template.width,
                template.height
            ),
            Ok(_) => {}
            Err(err) => {
                failures += 1;
                println!("{}: {}", template.id, err);
            }
        }

        for (name, slot) in template.slots() {
            if let Err(err) = fonts.resolve(&slot.font_family, slot.font_weight) {
                failures += 1;
                println!("{}.{}: {}", template.id, name, err);
            }
        }
    }

    // Shaping must work with the first resolvable slot font
    let mut probe = RasterSurface::new(1, 1, fonts);
    if let Some((_, slot)) = registry.iter().flat_map(|t| t.slots()).next() {
        if probe
            .set_font(&FontSpec::for_slot(slot, slot.font_size))
            .is_ok()
        {
            let width = probe.measure_text("0123456789")?;
            info!("Probe text measures {:.1}px at {}px", width, slot.font_size);
        }
    }

    if failures > 0 {
        anyhow::bail!("{} problem(s) found in {} templates", failures, registry.len());
    }

    println!("{} templates OK", registry.len());
    Ok(())
}

fn cmd_init(cwd: &Path) -> Result<()> {
    let path = cwd.join(CONFIG_FILE);
    if path.exists() {
        anyhow::bail!("This directory already contains a {}", CONFIG_FILE);
    }

    fs::write(&path, PlateConfig::default().to_toml()?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Created {}", path.display());

    Ok(())
}
