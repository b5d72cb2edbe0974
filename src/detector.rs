//! Double-press timing gate.

use std::time::{Duration, Instant};

/// Emits a signal when two presses land within `interval` of each other.
///
/// After a signal the window is cleared, so a third quick press starts a new
/// pair instead of completing another one.
#[derive(Debug, Clone)]
pub struct DoublePressDetector {
    interval: Duration,
    last_press: Option<Instant>,
}

impl DoublePressDetector {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_press: None,
        }
    }

    /// Feed one press at `now`. Returns true on a qualifying double-press.
    pub fn on_press(&mut self, now: Instant) -> bool {
        match self.last_press {
            Some(last) if now.saturating_duration_since(last) <= self.interval => {
                self.last_press = None;
                true
            }
            _ => {
                self.last_press = Some(now);
                false
            }
        }
    }
}
