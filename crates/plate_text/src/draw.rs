//! Slot text rendering
//!
//! Draws a fitted string at a slot's anchor. Without letter spacing the
//! whole string goes through one `fill_text` call, which keeps kerning and
//! ligatures. With letter spacing every character is drawn on its own and
//! the pen advances by the character's own width plus the spacing, so no
//! kerning applies between neighbours.

use crate::measure::{FontSpec, TextCanvas};
use crate::Result;
use plate_core::{Point, TextSlotConfig};

/// Draw `text` for `slot` at the fitted `font_size`
pub fn draw_slot_text<C: TextCanvas + ?Sized>(
    canvas: &mut C,
    text: &str,
    slot: &TextSlotConfig,
    font_size: f32,
) -> Result<()> {
    canvas.set_font(&FontSpec::for_slot(slot, font_size))?;
    canvas.set_fill_color(slot.color);

    let origin = Point::new(slot.x, slot.y);
    match slot.letter_spacing() {
        None => canvas.fill_text(text, origin),
        Some(spacing) => draw_spaced(canvas, text, origin, spacing),
    }
}

fn draw_spaced<C: TextCanvas + ?Sized>(
    canvas: &mut C,
    text: &str,
    origin: Point,
    spacing: f32,
) -> Result<()> {
    let mut pen_x = origin.x;
    let mut buf = [0u8; 4];
    for c in text.chars() {
        let glyph = c.encode_utf8(&mut buf);
        canvas.fill_text(glyph, Point::new(pen_x, origin.y))?;
        pen_x += canvas.measure_text(glyph)? + spacing;
    }
    Ok(())
}
