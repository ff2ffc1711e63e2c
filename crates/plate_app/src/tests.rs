//! Compositor and session tests
//!
//! Run against a block-drawing surface: every char is `size * ratio` pixels
//! wide and text is painted as a solid `width x size` rectangle, so pixel
//! checks need no fonts.

use crate::*;
use plate_core::{Color, Point, Rect, Template, TemplateRegistry, TextSlotConfig};
use plate_image::Pixmap;
use plate_text::{FitStrategy, FontSpec, TextCanvas, TextError, TextMeasurer};
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const BLUE: [u8; 4] = [0, 0, 255, 255];
const WHITE: [u8; 4] = [255, 255, 255, 255];
/// Family the block surface refuses to resolve
const MISSING_FAMILY: &str = "Missing";

struct BlockSurface {
    pixmap: Pixmap,
    ratio: f32,
    font: Option<FontSpec>,
    fill: Color,
    measured: Vec<String>,
    drawn: Vec<(String, Point, f32)>,
}

impl BlockSurface {
    fn new(ratio: f32) -> Self {
        Self {
            pixmap: Pixmap::new(1, 1),
            ratio,
            font: None,
            fill: Color::BLACK,
            measured: Vec::new(),
            drawn: Vec::new(),
        }
    }

    fn width_of(&self, text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * self.ratio
    }
}

impl TextMeasurer for BlockSurface {
    fn set_font(&mut self, font: &FontSpec) -> plate_text::Result<()> {
        if font.family == MISSING_FAMILY {
            return Err(TextError::FontNotFound {
                family: font.family.clone(),
                weight: font.weight.to_number(),
            });
        }
        self.font = Some(font.clone());
        Ok(())
    }

    fn measure_text(&mut self, text: &str) -> plate_text::Result<f32> {
        self.measured.push(text.to_string());
        let size = self.font.as_ref().ok_or(TextError::NoActiveFont)?.size;
        Ok(self.width_of(text, size))
    }
}

impl TextCanvas for BlockSurface {
    fn set_fill_color(&mut self, color: Color) {
        self.fill = color;
    }

    fn fill_text(&mut self, text: &str, origin: Point) -> plate_text::Result<()> {
        let size = self.font.as_ref().ok_or(TextError::NoActiveFont)?.size;
        self.drawn.push((text.to_string(), origin, size));

        let width = self.width_of(text, size).round() as u32;
        let height = size.round() as u32;
        let mask = vec![255u8; (width * height) as usize];
        self.pixmap.fill_mask(
            &mask,
            width,
            height,
            origin.x.round() as i32,
            origin.y.round() as i32,
            self.fill,
        );
        Ok(())
    }
}

impl RenderSurface for BlockSurface {
    fn size(&self) -> (u32, u32) {
        self.pixmap.dimensions()
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.pixmap.resize(width, height);
    }

    fn clear(&mut self) {
        self.pixmap.clear();
    }

    fn draw_image(&mut self, image: &Pixmap, rect: Rect) {
        self.pixmap.draw_image(image, rect);
    }

    fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }
}

/// Matches the template size, so compositing copies it unchanged
fn base_image() -> Pixmap {
    Pixmap::from_rgba(BLUE.repeat(400 * 300), 400, 300).unwrap()
}

/// 400x300 template: `version` (prefix "v", 40px nominal, 28px min, 200px
/// wide) above `validFrom` (24px nominal, 120px wide)
fn template(base: impl Into<PathBuf>) -> Template {
    Template::new("b2b-a", "B2B A", base, 400, 300)
        .with_slot(
            "version",
            TextSlotConfig::new("Inter", 40.0, 200.0)
                .with_prefix("v")
                .with_position(20.0, 20.0)
                .with_min_font_size(28.0)
                .with_color(Color::WHITE)
                .with_label("Version"),
        )
        .with_slot(
            "validFrom",
            TextSlotConfig::new("Inter", 24.0, 120.0)
                .with_position(20.0, 200.0)
                .with_color(Color::WHITE)
                .with_label("Valid from"),
        )
}

fn values(pairs: &[(&str, &str)]) -> FxHashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn render(
    compositor: &mut Compositor<BlockSurface>,
    template: &Template,
    pairs: &[(&str, &str)],
) -> RenderOutcome {
    compositor
        .render_full_resolution(template, &base_image(), &values(pairs))
        .unwrap()
}

// Compositor

#[test]
fn test_short_value_fits_at_nominal() {
    let template = template("base.png");
    let mut compositor = Compositor::new(BlockSurface::new(0.5));

    let outcome = render(&mut compositor, &template, &[("version", "2.3.1")]);
    assert_eq!(outcome, RenderOutcome::Success { shrunk: false });
    assert_eq!(outcome.message(), None);
    assert_eq!(
        compositor.surface().drawn,
        vec![("v2.3.1".to_string(), Point::new(20.0, 20.0), 40.0)]
    );

    let pixmap = compositor.pixmap();
    assert_eq!(pixmap.dimensions(), (400, 300));
    assert_eq!(pixmap.pixel(21, 21), Some(WHITE));
    assert_eq!(pixmap.pixel(300, 250), Some(BLUE));
}

#[test]
fn test_long_value_shrinks_with_warning() {
    let template = template("base.png");
    let mut compositor = Compositor::new(BlockSurface::new(0.5));

    // 14 chars: 280px at 40px, fits at 28px (196px)
    let outcome = render(&mut compositor, &template, &[("version", "2.3.1-beta.12")]);
    assert_eq!(outcome, RenderOutcome::Success { shrunk: true });
    assert_eq!(outcome.message().as_deref(), Some(SHRUNK_MESSAGE));

    let (_, _, size) = &compositor.surface().drawn[0];
    assert_eq!(*size, 28.0);
    let pixmap = compositor.pixmap();
    assert_eq!(pixmap.pixel(21, 47), Some(WHITE));
    assert_eq!(pixmap.pixel(21, 48), Some(BLUE));
}

#[test]
fn test_too_long_value_is_unfit() {
    let template = template("base.png");
    let mut compositor = Compositor::new(BlockSurface::new(0.5));

    let outcome = render(
        &mut compositor,
        &template,
        &[("version", "9999.9999.9999-beta-extremely-long")],
    );
    assert_eq!(
        outcome,
        RenderOutcome::Unfit {
            slot: "version".to_string(),
            label: "Version".to_string(),
        }
    );
    assert_eq!(
        outcome.message().as_deref(),
        Some("Version is too long. Shorten the text.")
    );
    assert!(compositor.surface().drawn.is_empty());
}

#[test]
fn test_empty_values_are_omitted() {
    let template = template("base.png");
    let mut compositor = Compositor::new(BlockSurface::new(0.5));

    let outcome = render(
        &mut compositor,
        &template,
        &[("version", "   "), ("validFrom", "")],
    );
    assert_eq!(outcome, RenderOutcome::Success { shrunk: false });

    let surface = compositor.surface();
    assert!(surface.measured.is_empty());
    assert!(surface.drawn.is_empty());
    assert!(surface.pixmap().pixels().chunks(4).all(|p| p == BLUE.as_slice()));
}

#[test]
fn test_base_image_stretched_to_template() {
    let template = template("base.png");
    let mut compositor = Compositor::new(BlockSurface::new(0.5));
    let small = Pixmap::from_rgba(BLUE.repeat(4 * 3), 4, 3).unwrap();

    compositor
        .render_full_resolution(&template, &small, &values(&[]))
        .unwrap();
    let pixmap = compositor.pixmap();
    assert_eq!(pixmap.dimensions(), (400, 300));
    for (x, y) in [(0, 0), (399, 0), (0, 299), (399, 299)] {
        let p = pixmap.pixel(x, y).unwrap();
        assert!(p[2] > 250 && p[3] > 250, "{:?} at ({}, {})", p, x, y);
    }
}

#[test]
fn test_values_are_trimmed() {
    let template = template("base.png");
    let mut compositor = Compositor::new(BlockSurface::new(0.5));

    render(&mut compositor, &template, &[("version", "  2.3.1\n")]);
    assert_eq!(compositor.surface().drawn[0].0, "v2.3.1");
}

#[test]
fn test_slots_drawn_in_declaration_order() {
    let template = template("base.png");
    let mut compositor = Compositor::new(BlockSurface::new(0.5));

    render(
        &mut compositor,
        &template,
        &[("validFrom", "1.1.2025"), ("version", "2")],
    );
    let texts: Vec<&str> = compositor
        .surface()
        .drawn
        .iter()
        .map(|(text, _, _)| text.as_str())
        .collect();
    assert_eq!(texts, ["v2", "1.1.2025"]);
}

#[test]
fn test_unfit_keeps_earlier_slots_and_stops() {
    let template = template("base.png").with_slot(
        "note",
        TextSlotConfig::new("Inter", 20.0, 300.0).with_position(20.0, 250.0),
    );
    let mut compositor = Compositor::new(BlockSurface::new(0.5));

    let outcome = render(
        &mut compositor,
        &template,
        &[
            ("version", "2.3.1"),
            ("validFrom", "a very long date that cannot possibly fit"),
            ("note", "n"),
        ],
    );
    assert_eq!(
        outcome,
        RenderOutcome::Unfit {
            slot: "validFrom".to_string(),
            label: "Valid from".to_string(),
        }
    );

    let surface = compositor.surface();
    assert_eq!(surface.drawn.len(), 1);
    assert!(!surface.measured.iter().any(|text| text == "n"));
    assert_eq!(surface.pixmap().pixel(21, 21), Some(WHITE));
    assert_eq!(surface.pixmap().pixel(21, 201), Some(BLUE));
}

#[test]
fn test_render_is_idempotent() {
    let template = template("base.png");
    let mut compositor = Compositor::new(BlockSurface::new(0.5));
    let first = [("version", "2.3.1"), ("validFrom", "1.1.2025")];

    render(&mut compositor, &template, &first);
    let expected = compositor.pixmap().clone();

    render(&mut compositor, &template, &[("version", "10.0.0-rc.1")]);
    assert_ne!(compositor.pixmap(), &expected);

    render(&mut compositor, &template, &first);
    assert_eq!(compositor.pixmap().pixels(), expected.pixels());
}

#[test]
fn test_bisect_matches_linear() {
    let template = template("base.png");
    let mut linear = Compositor::new(BlockSurface::new(0.5));
    let mut bisect = Compositor::new(BlockSurface::new(0.5)).with_strategy(FitStrategy::Bisect);

    for value in ["2.3.1", "2.3.1-beta.12", "9999.9999.9999-beta-extremely-long"] {
        let pairs = [("version", value)];
        assert_eq!(
            render(&mut linear, &template, &pairs),
            render(&mut bisect, &template, &pairs)
        );
        assert_eq!(linear.pixmap(), bisect.pixmap());
    }
}

// Session

fn write_base(dir: &Path) -> PathBuf {
    let path = dir.join("base.png");
    std::fs::write(&path, base_image().encode_png().unwrap()).unwrap();
    path
}

fn session_with(template: Template) -> Session<BlockSurface> {
    let registry = TemplateRegistry::from_templates(vec![template]).unwrap();
    Session::with_config(
        registry,
        BlockSurface::new(0.5),
        SessionConfig {
            preview_max_width: 200,
            preview_max_height: 200,
            ..Default::default()
        },
    )
}

#[test]
fn test_select_renders_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_with(template(write_base(dir.path())));

    let outcome = session.select_template("b2b-a").unwrap();
    assert_eq!(outcome, RenderOutcome::Success { shrunk: false });
    assert_eq!(session.composite().dimensions(), (400, 300));
    assert_eq!(session.preview().map(Pixmap::dimensions), Some((200, 150)));
    assert_eq!(session.selected_template().map(|t| t.id.as_str()), Some("b2b-a"));
}

#[test]
fn test_select_unknown_template() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_with(template(write_base(dir.path())));

    let err = session.select_template("nope").unwrap_err();
    assert!(matches!(err, AppError::UnknownTemplate(id) if id == "nope"));
}

#[test]
fn test_missing_base_image_is_fatal_for_template() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_with(template(dir.path().join("missing.png")));

    let err = session.select_template("b2b-a").unwrap_err();
    assert!(matches!(err, AppError::BaseImage { ref template, .. } if template == "b2b-a"));
    assert!(session.selected_template().is_none());
    assert!(session.preview().is_none());
}

#[test]
fn test_edits_are_debounced() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_with(template(write_base(dir.path())));
    session.select_template("b2b-a").unwrap();

    let t0 = Instant::now();
    let ms = Duration::from_millis(1);
    session.set_value("version", "2", t0);
    session.set_value("version", "2.3", t0 + 50 * ms);
    session.set_value("version", "2.3.1", t0 + 100 * ms);
    assert!(session.is_render_pending());

    assert_eq!(session.tick(t0 + 200 * ms).unwrap(), None);
    assert_eq!(
        session.tick(t0 + 250 * ms).unwrap(),
        Some(RenderOutcome::Success { shrunk: false })
    );
    assert_eq!(session.tick(t0 + 500 * ms).unwrap(), None);

    // One pass for the whole burst, with the last value
    let drawn = &session.compositor().surface().drawn;
    assert_eq!(drawn.len(), 1);
    assert_eq!(drawn[0].0, "v2.3.1");
}

#[test]
fn test_set_value_without_template_does_not_schedule() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_with(template(write_base(dir.path())));

    session.set_value("version", "2.3.1", Instant::now());
    assert!(!session.is_render_pending());
    assert_eq!(session.value("version"), Some("2.3.1"));
}

#[test]
fn test_export_validation_messages() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_with(template(write_base(dir.path())));
    let now = Instant::now();

    let err = session.export().unwrap_err();
    assert_eq!(err.to_string(), "Select a template");

    session.select_template("b2b-a").unwrap();
    assert!(!session.can_export());
    assert_eq!(session.export().unwrap_err().to_string(), "Enter Version");

    session.set_value("version", "2.3.1", now);
    assert_eq!(session.export().unwrap_err().to_string(), "Enter Valid from");

    session.set_value("validFrom", "  ", now);
    assert_eq!(session.export().unwrap_err().to_string(), "Enter Valid from");
}

#[test]
fn test_export_produces_named_png() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_with(template(write_base(dir.path())));
    let now = Instant::now();

    session.select_template("b2b-a").unwrap();
    session.set_value("version", "2.3.1", now);
    session.set_value("validFrom", "1.1.2025", now);
    session.render().unwrap();
    assert!(session.can_export());

    let artifact = session.export().unwrap();
    assert_eq!(artifact.file_name, "b2b-a_2_3_1.png");

    let decoded = Pixmap::from_bytes(&artifact.png).unwrap();
    assert_eq!(decoded.dimensions(), (400, 300));
    assert_eq!(decoded.pixels(), session.composite().pixels());
}

#[test]
fn test_export_refuses_unfit_text() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_with(template(write_base(dir.path())));
    let now = Instant::now();

    session.select_template("b2b-a").unwrap();
    session.set_value("version", "9999.9999.9999-beta-extremely-long", now);
    session.set_value("validFrom", "1.1.2025", now);

    let err = session.export().unwrap_err();
    assert!(matches!(err, AppError::TooLong { ref slot, .. } if slot == "version"));
    assert_eq!(err.to_string(), "Version is too long. Shorten the text.");
    assert!(!session.can_export());
}

#[test]
fn test_unfit_keeps_previous_preview() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_with(template(write_base(dir.path())));
    let now = Instant::now();

    session.select_template("b2b-a").unwrap();
    session.set_value("version", "2.3.1", now);
    session.set_value("validFrom", "1.1.2025", now);
    session.render().unwrap();
    let preview = session.preview().cloned();
    assert!(preview.is_some());

    session.set_value("version", "9999.9999.9999-beta-extremely-long", now);
    let outcome = session.render().unwrap();
    assert!(!outcome.is_success());
    assert_eq!(session.preview().cloned(), preview);
    assert!(!session.can_export());
}

#[test]
fn test_failed_render_disables_export() {
    let dir = tempfile::tempdir().unwrap();
    let mut author =
        TextSlotConfig::new(MISSING_FAMILY, 20.0, 200.0).with_position(20.0, 260.0);
    author.required = false;
    let template = template(write_base(dir.path())).with_slot("author", author);

    let mut session = session_with(template);
    let now = Instant::now();
    session.select_template("b2b-a").unwrap();
    session.set_value("version", "2.3.1", now);
    session.set_value("validFrom", "1.1.2025", now);
    session.render().unwrap();
    assert!(session.can_export());
    let preview = session.preview().cloned();

    session.set_value("author", "Jane", now);
    let err = session.render().unwrap_err();
    assert!(matches!(err, AppError::Text(TextError::FontNotFound { .. })));
    assert!(session.last_outcome().is_none());
    assert!(!session.can_export());
    assert_eq!(session.preview().cloned(), preview);
}

#[test]
fn test_optional_slot_not_required_for_export() {
    let dir = tempfile::tempdir().unwrap();
    let mut template = template(write_base(dir.path()));
    let mut valid_from = template.slot("validFrom").cloned().unwrap();
    valid_from.required = false;
    template = template.with_slot("validFrom", valid_from);

    let mut session = session_with(template);
    session.select_template("b2b-a").unwrap();
    session.set_value("version", "1.0", Instant::now());

    assert_eq!(session.export().unwrap().file_name, "b2b-a_1_0.png");
}

#[test]
fn test_clear_template_drops_state() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_with(template(write_base(dir.path())));

    session.select_template("b2b-a").unwrap();
    session.set_value("version", "2.3.1", Instant::now());
    session.clear_template();

    assert!(session.selected_template().is_none());
    assert!(session.preview().is_none());
    assert!(session.last_outcome().is_none());
    assert!(!session.is_render_pending());
}
