//! Text fit engine
//!
//! Picks the largest font size, stepping down one pixel at a time from the
//! slot's nominal size, at which a string's rendered width stays within the
//! slot's `max_width`. The minimum font size is tried and accepted if it
//! fits; no candidate below it is ever tried.
//!
//! Fitting mutates the measurer's active font. Callers must set the font
//! again before drawing.

use crate::measure::{FontSpec, TextMeasurer};
use crate::Result;
use plate_core::TextSlotConfig;
use std::str::FromStr;

/// Tolerance when comparing a candidate size with the minimum, so that a
/// minimum computed as `0.7 * nominal` does not reject its own integer value
const SIZE_EPSILON: f32 = 1e-3;

/// Outcome of fitting one string into one slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FitResult {
    /// Text fits at `font_size`; `shrunk` when that is below nominal
    Fits { font_size: f32, shrunk: bool },
    /// No size between minimum and nominal keeps the text within `max_width`
    Unfit,
    /// Empty text; nothing was measured
    Skipped,
}

impl FitResult {
    pub fn font_size(&self) -> Option<f32> {
        match self {
            FitResult::Fits { font_size, .. } => Some(*font_size),
            _ => None,
        }
    }

    pub fn is_shrunk(&self) -> bool {
        matches!(self, FitResult::Fits { shrunk: true, .. })
    }
}

/// Search order over the candidate sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitStrategy {
    /// Try every size from nominal downwards
    #[default]
    Linear,
    /// Binary search over the same candidates; assumes width grows with size
    Bisect,
}

impl FromStr for FitStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linear" => Ok(FitStrategy::Linear),
            "bisect" | "binary" => Ok(FitStrategy::Bisect),
            other => Err(format!(
                "unknown fit strategy '{}' (expected linear or bisect)",
                other
            )),
        }
    }
}

/// Fit `text` into `slot` with the linear search
pub fn fit_text<M: TextMeasurer + ?Sized>(
    measurer: &mut M,
    text: &str,
    slot: &TextSlotConfig,
) -> Result<FitResult> {
    fit_text_with(measurer, text, slot, FitStrategy::Linear)
}

/// Fit `text` into `slot` using `strategy`
///
/// `text` is the final string (prefix already applied). Errors only come
/// from the measurer; an unfit string is a regular [`FitResult::Unfit`].
pub fn fit_text_with<M: TextMeasurer + ?Sized>(
    measurer: &mut M,
    text: &str,
    slot: &TextSlotConfig,
    strategy: FitStrategy,
) -> Result<FitResult> {
    if text.is_empty() {
        return Ok(FitResult::Skipped);
    }

    let nominal = slot.font_size;
    let mut probe = |size: f32| -> Result<bool> {
        measurer.set_font(&FontSpec::for_slot(slot, size))?;
        let width = measurer.measure_text(text)?;
        tracing::trace!("fit '{}' at {}px: {}px / {}px", text, size, width, slot.max_width);
        Ok(width <= slot.max_width)
    };

    if probe(nominal)? {
        return Ok(FitResult::Fits {
            font_size: nominal,
            shrunk: false,
        });
    }

    // Candidates are nominal - k for k in 1..=steps
    let steps = (nominal - slot.min_font_size() + SIZE_EPSILON).floor();
    if steps < 1.0 {
        return Ok(FitResult::Unfit);
    }
    let steps = steps as u32;
    let candidate = |k: u32| nominal - k as f32;

    let found = match strategy {
        FitStrategy::Linear => {
            let mut found = None;
            for k in 1..=steps {
                if probe(candidate(k))? {
                    found = Some(k);
                    break;
                }
            }
            found
        }
        FitStrategy::Bisect => {
            if !probe(candidate(steps))? {
                None
            } else {
                let (mut lo, mut hi) = (1, steps);
                while lo < hi {
                    let mid = lo + (hi - lo) / 2;
                    if probe(candidate(mid))? {
                        hi = mid;
                    } else {
                        lo = mid + 1;
                    }
                }
                Some(lo)
            }
        }
    };

    Ok(match found {
        Some(k) => {
            let font_size = candidate(k);
            tracing::debug!(
                "Shrunk '{}' from {}px to {}px to fit {}px",
                text,
                nominal,
                font_size,
                slot.max_width
            );
            FitResult::Fits {
                font_size,
                shrunk: true,
            }
        }
        None => FitResult::Unfit,
    })
}
