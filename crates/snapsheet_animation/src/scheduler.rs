//! Frame scheduler
//!
//! Cooperative stand-in for `requestAnimationFrame` and `setTimeout`. The
//! host drives it by calling [`FrameScheduler::tick`] once per frame; nothing
//! runs on another thread.

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

new_key_type! {
    pub struct TimerId;
}

struct Timer {
    deadline_ms: f64,
}

/// Work that became due during a [`FrameScheduler::tick`]
#[derive(Debug, Default)]
pub struct FrameTick {
    /// The single pending frame callback should run
    pub frame: bool,
    /// Timers whose deadline passed, earliest first
    pub expired: SmallVec<[TimerId; 2]>,
}

impl FrameTick {
    pub fn is_empty(&self) -> bool {
        !self.frame && self.expired.is_empty()
    }
}

/// Coalescing frame scheduler with one-shot timers
pub struct FrameScheduler {
    frame_requested: bool,
    timers: SlotMap<TimerId, Timer>,
    frames_run: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self {
            frame_requested: false,
            timers: SlotMap::with_key(),
            frames_run: 0,
        }
    }

    /// Request a frame callback.
    ///
    /// Returns `false` when a request is already outstanding; the existing
    /// request covers the caller.
    pub fn request_frame(&mut self) -> bool {
        if self.frame_requested {
            return false;
        }
        self.frame_requested = true;
        true
    }

    /// Drop the outstanding frame request, if any
    pub fn cancel_frame(&mut self) {
        self.frame_requested = false;
    }

    pub fn has_pending_frame(&self) -> bool {
        self.frame_requested
    }

    /// Arm a one-shot timer firing at `deadline_ms`
    pub fn set_timeout(&mut self, deadline_ms: f64) -> TimerId {
        self.timers.insert(Timer { deadline_ms })
    }

    /// Disarm a timer. Returns `false` if it already fired or was cleared.
    pub fn clear_timeout(&mut self, id: TimerId) -> bool {
        self.timers.remove(id).is_some()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Check if a frame or any timer is still outstanding
    pub fn has_pending_work(&self) -> bool {
        self.frame_requested || !self.timers.is_empty()
    }

    /// Number of frame callbacks handed out so far
    pub fn frames_run(&self) -> u64 {
        self.frames_run
    }

    /// Advance to `now_ms`, consuming the frame request and expired timers
    pub fn tick(&mut self, now_ms: f64) -> FrameTick {
        let frame = std::mem::take(&mut self.frame_requested);
        if frame {
            self.frames_run += 1;
        }

        let mut due: SmallVec<[(f64, TimerId); 2]> = self
            .timers
            .iter()
            .filter(|(_, timer)| timer.deadline_ms <= now_ms)
            .map(|(id, timer)| (timer.deadline_ms, id))
            .collect();
        due.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut expired = SmallVec::new();
        for (_, id) in due {
            self.timers.remove(id);
            expired.push(id);
        }

        if !expired.is_empty() {
            tracing::trace!("FrameScheduler: {} timer(s) expired at {:.1}ms", expired.len(), now_ms);
        }

        FrameTick { frame, expired }
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}
