//! Render scheduling
//!
//! Edits re-arm a single deadline instead of queueing renders, so a burst
//! of keystrokes collapses into one pass. Time is passed in by the caller;
//! nothing here reads the clock.

use std::time::{Duration, Instant};

/// Delay between the last edit and the render it triggers
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(150);

/// One-shot deadline that is pushed back on every `schedule`
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Arm (or re-arm) the deadline at `now + delay`, dropping any pending one
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True exactly once when `now` has reached the armed deadline
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
