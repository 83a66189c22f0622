//! Time sources for the controller.
//!
//! The controller reads time for velocity samples and transition deadlines.
//! Production hosts use [`MonotonicClock`]; tests and scenario replay use a
//! [`ManualClock`] they advance explicitly.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// A source of milliseconds on a monotonic timeline
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Wall-clock time measured from construction
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Manually advanced clock.
///
/// Clones share the same time, so a test keeps one handle while the
/// controller owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, now_ms: f64) {
        self.now.set(now_ms);
    }

    pub fn advance(&self, delta_ms: f64) {
        self.now.set(self.now.get() + delta_ms.max(0.0));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}
