//! Bottom sheet controller
//!
//! Owns the sheet's position, current snap and gesture state, and is the
//! only writer of the sheet surface's transform.
//!
//! # Input flow
//!
//! - Drags on the sheet go through `handle_drag_start` / `handle_drag_move`
//!   / `handle_drag_end`. Moves only update state and queue a transform; the
//!   write happens on the next [`SheetController::tick`], so any number of
//!   moves within one frame produce a single write.
//! - Scrolls over hosted content are first offered to
//!   [`SheetController::handle_content_scroll_intent`], which decides whether
//!   the content or the sheet consumes them.
//! - Releasing a drag picks a snap from the release velocity and position,
//!   then animates there. The snap callback fires once the host reports the
//!   transition finished, or when the safety timer gives up waiting.
//!
//! # Example
//!
//! ```
//! use snapsheet_core::{HeadlessHost, ManualClock, SheetController, SheetOptions, SnapConfiguration};
//!
//! let clock = ManualClock::new(0.0);
//! let host = HeadlessHost::new().with_viewport_height(800.0);
//! let snaps = SnapConfiguration::new([10.0, 50.0, 90.0]).unwrap();
//! let mut sheet = SheetController::new(SheetOptions::new(snaps).clock(clock.clone()), host).unwrap();
//!
//! sheet.handle_drag_start(500.0);
//! clock.advance(16.0);
//! sheet.handle_drag_move(200.0);
//! assert_eq!(sheet.position_percent(), 87.5);
//!
//! sheet.handle_drag_end();
//! assert_eq!(sheet.current_snap(), 90.0);
//! ```

use snapsheet_animation::{FrameScheduler, TransitionExecutor};

use crate::arbiter::{BoundaryArbiter, ScrollOwner};
use crate::clock::{Clock, MonotonicClock};
use crate::config::{SheetConfig, SheetTuning, SnapConfiguration};
use crate::error::{Result, SheetError};
use crate::events::SheetInput;
use crate::state::{DragSession, SheetEvent, SheetState};
use crate::surface::{SheetHost, SheetTransform};
use crate::velocity::VelocityEstimator;

/// Callback receiving the snap value after each completed snap
pub type SnapCallback = Box<dyn FnMut(f32)>;

/// Construction options for [`SheetController`]
pub struct SheetOptions {
    snaps: SnapConfiguration,
    tuning: SheetTuning,
    on_snap_change: Option<SnapCallback>,
    clock: Option<Box<dyn Clock>>,
}

impl SheetOptions {
    pub fn new(snaps: SnapConfiguration) -> Self {
        Self {
            snaps,
            tuning: SheetTuning::default(),
            on_snap_change: None,
            clock: None,
        }
    }

    pub fn from_config(config: SheetConfig) -> Self {
        Self::new(config.snap).tuning(config.tuning)
    }

    pub fn tuning(mut self, tuning: SheetTuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Called with the snap value each time a snap completes
    pub fn on_snap_change<F>(mut self, callback: F) -> Self
    where
        F: FnMut(f32) + 'static,
    {
        self.on_snap_change = Some(Box::new(callback));
        self
    }

    /// Time source; defaults to [`MonotonicClock`]
    pub fn clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }
}

/// The bottom sheet state machine and transform writer
pub struct SheetController {
    snaps: SnapConfiguration,
    tuning: SheetTuning,
    host: Box<dyn SheetHost>,
    clock: Box<dyn Clock>,
    on_snap_change: Option<SnapCallback>,

    state: SheetState,
    position_percent: f32,
    current_snap: f32,
    drag: Option<DragSession>,

    velocity: VelocityEstimator,
    arbiter: BoundaryArbiter,
    scheduler: FrameScheduler,
    executor: TransitionExecutor,
    /// Latest transform waiting for the next frame
    pending_transform: Option<SheetTransform>,
}

impl SheetController {
    pub fn new<H: SheetHost + 'static>(options: SheetOptions, host: H) -> Result<Self> {
        options.tuning.validate()?;
        let SheetOptions {
            snaps,
            tuning,
            on_snap_change,
            clock,
        } = options;

        Ok(Self {
            snaps,
            tuning,
            host: Box::new(host),
            clock: clock.unwrap_or_else(|| Box::new(MonotonicClock::new()) as Box<dyn Clock>),
            on_snap_change,
            state: SheetState::Idle,
            position_percent: snaps.initial(),
            current_snap: snaps.initial(),
            drag: None,
            velocity: VelocityEstimator::with_window(
                tuning.velocity_capacity,
                tuning.velocity_window,
            ),
            arbiter: BoundaryArbiter::new(tuning.scroll_epsilon, tuning.boundary_flip_distance),
            scheduler: FrameScheduler::new(),
            executor: TransitionExecutor::new(tuning.transition_limits()),
            pending_transform: None,
        })
    }

    // =========================================================================
    // Observables
    // =========================================================================

    pub fn state(&self) -> SheetState {
        self.state
    }

    pub fn position_percent(&self) -> f32 {
        self.position_percent
    }

    pub fn current_snap(&self) -> f32 {
        self.current_snap
    }

    pub fn snap_points(&self) -> &SnapConfiguration {
        &self.snaps
    }

    pub fn tuning(&self) -> &SheetTuning {
        &self.tuning
    }

    /// Resting at (or snapping to) the expanded snap
    pub fn is_expanded(&self) -> bool {
        self.state != SheetState::DraggingSheet
            && self.snaps.index_of(self.current_snap) == Some(2)
    }

    /// Velocity the next release would see, in percent per ms
    pub fn drag_velocity(&self) -> f32 {
        self.velocity.velocity()
    }

    /// Where the sheet appears on screen right now.
    ///
    /// While snapping this follows the transition's easing curve from the
    /// release position toward the target; otherwise it is
    /// [`position_percent`](Self::position_percent).
    pub fn displayed_position(&self) -> f32 {
        self.executor
            .position_at(self.clock.now_ms())
            .unwrap_or(self.position_percent)
    }

    /// Frame callbacks run so far
    pub fn frames_run(&self) -> u64 {
        self.scheduler.frames_run()
    }

    /// A transform is queued for the next frame
    pub fn has_pending_frame(&self) -> bool {
        self.scheduler.has_pending_frame()
    }

    /// Anything left for [`tick`](Self::tick) to do
    pub fn has_pending_work(&self) -> bool {
        self.scheduler.has_pending_work()
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Animate to `target`.
    ///
    /// Values that are not configured snap points are ignored. A snap still
    /// in flight completes (and reports) before this one starts.
    pub fn snap_to(&mut self, target: f32) {
        match self.snaps.resolve(target) {
            Some(target) => self.begin_snap(target),
            None => tracing::debug!("SheetController: ignoring snap_to({}), not a snap point", target),
        }
    }

    /// Like [`snap_to`](Self::snap_to) but reports unknown targets
    pub fn try_snap_to(&mut self, target: f32) -> Result<()> {
        let resolved = self
            .snaps
            .resolve(target)
            .ok_or(SheetError::UnknownSnapPoint(target))?;
        self.begin_snap(resolved);
        Ok(())
    }

    /// Snap `steps` stops up (positive) or down from the current snap
    pub fn snap_by(&mut self, steps: i32) {
        let target = self.snaps.step_from(self.current_snap, steps);
        self.begin_snap(target);
    }

    /// Jump to `percent` without animation.
    ///
    /// A snap still in flight completes first so its transition style does
    /// not animate the jump.
    pub fn set_position_immediately(&mut self, percent: f32) {
        if !percent.is_finite() {
            return;
        }
        self.settle_transition();
        self.position_percent = percent;
        if let Some(snap) = self.snaps.resolve(percent) {
            self.current_snap = snap;
        }
        self.schedule_transform_write();
    }

    // =========================================================================
    // Drag Input
    // =========================================================================

    pub fn handle_drag_start(&mut self, client_y: f32) {
        if !client_y.is_finite() {
            tracing::debug!("SheetController: ignoring drag start at non-finite y");
            return;
        }
        self.settle_transition();
        self.arbiter.clear_session();
        self.begin_drag(client_y);
    }

    pub fn handle_drag_move(&mut self, client_y: f32) {
        if self.state != SheetState::DraggingSheet || !client_y.is_finite() {
            return;
        }
        let Some(drag) = self.drag else {
            return;
        };
        let viewport = self.host.viewport_height();
        // NaN heights are rejected along with empty viewports
        if viewport.is_nan() || viewport <= 0.0 {
            return;
        }

        let delta_percent = (drag.start_y - client_y) / viewport * 100.0;
        let raw = drag.start_position + delta_percent;
        let position = self.snaps.rubber_band(raw, self.tuning.rubber_band_factor);

        tracing::trace!(
            "SheetController: drag y={:.1} raw={:.2}% position={:.2}%",
            client_y,
            raw,
            position
        );

        self.position_percent = position;
        self.velocity.add_sample(position, self.clock.now_ms());
        self.schedule_transform_write();
    }

    pub fn handle_drag_end(&mut self) {
        if self.state != SheetState::DraggingSheet {
            return;
        }
        self.drag = None;

        let velocity = self.velocity.velocity();
        let target = self.snaps.release_target(
            self.current_snap,
            self.position_percent,
            velocity,
            self.tuning.flick_velocity_threshold,
        );
        tracing::debug!(
            "SheetController: released at {:.2}% with v={:.4}%/ms, snapping {} -> {}",
            self.position_percent,
            velocity,
            self.current_snap,
            target
        );

        self.apply(SheetEvent::Release);
        self.begin_snap(target);
    }

    /// The platform cancelled the drag; return to the current snap
    pub fn handle_drag_cancel(&mut self) {
        if self.state != SheetState::DraggingSheet {
            return;
        }
        self.drag = None;
        self.apply(SheetEvent::Release);
        self.begin_snap(self.current_snap);
    }

    // =========================================================================
    // Content Arbitration
    // =========================================================================

    /// Decide whether a scroll of `delta_y` over the content scrolls the
    /// content or moves the sheet. `delta_y` is in finger sense: positive
    /// when the finger moves down. Wheel deltas must be negated first.
    /// Non-finite deltas are treated as no motion.
    pub fn handle_content_scroll_intent(&mut self, delta_y: f32, is_expanded: bool) -> ScrollOwner {
        let delta_y = if delta_y.is_finite() { delta_y } else { 0.0 };
        let metrics = self.host.content_metrics();
        let owner = self.arbiter.route(&mut self.state, metrics, delta_y, is_expanded);
        tracing::trace!("SheetController: scroll intent {:.1} -> {:?}", delta_y, owner);
        owner
    }

    /// Arm the content edge under a touch at `client_y`.
    ///
    /// Content only holds touches while the sheet is expanded.
    pub fn arm_boundary(&mut self, client_y: f32) -> bool {
        if !client_y.is_finite() {
            return false;
        }
        let metrics = self.host.content_metrics();
        let expanded = self.is_expanded();
        self.arbiter.arm(&mut self.state, metrics, client_y, expanded)
    }

    /// Check whether an armed touch has moved far enough to drag the sheet.
    /// On `true` a drag session starts at `client_y`; feed further motion to
    /// [`handle_drag_move`](Self::handle_drag_move).
    pub fn should_flip_from_boundary_to_drag(&mut self, client_y: f32) -> bool {
        if !client_y.is_finite() || !self.arbiter.should_flip(&mut self.state, client_y) {
            return false;
        }
        self.begin_drag(client_y);
        true
    }

    /// A content gesture ended without becoming a sheet drag
    pub fn handle_gesture_end(&mut self) {
        if self.state.is_content_gesture() {
            self.arbiter.reset(&mut self.state);
        } else {
            self.arbiter.clear_session();
        }
    }

    /// Route a normalized input event.
    ///
    /// Returns the routing decision for wheel input. A wheel gesture handed
    /// to the sheet moves it one snap toward the gesture.
    pub fn dispatch(&mut self, input: SheetInput) -> Option<ScrollOwner> {
        match input {
            SheetInput::PointerDown { client_y } => self.handle_drag_start(client_y),
            SheetInput::PointerMove { client_y } => self.handle_drag_move(client_y),
            SheetInput::PointerUp => {
                if self.state == SheetState::DraggingSheet {
                    self.handle_drag_end();
                } else {
                    self.handle_gesture_end();
                }
            }
            SheetInput::PointerCancel => {
                self.handle_drag_cancel();
                self.handle_gesture_end();
            }
            SheetInput::Wheel { .. } => {
                let delta = input.finger_delta().filter(|d| d.is_finite())?;
                let owner = self.handle_content_scroll_intent(delta, self.is_expanded());
                if owner == ScrollOwner::Sheet && delta != 0.0 && self.state != SheetState::Snapping {
                    let step = if delta > 0.0 { -1 } else { 1 };
                    let target = self.snaps.step_from(self.current_snap, step);
                    if target != self.current_snap {
                        self.begin_snap(target);
                    }
                }
                return Some(owner);
            }
        }
        None
    }

    // =========================================================================
    // Host Callbacks
    // =========================================================================

    /// Run the frame callback and expired timers. Call once per frame.
    pub fn tick(&mut self) {
        let now = self.clock.now_ms();
        let due = self.scheduler.tick(now);

        if due.frame {
            self.flush_transform();
        }

        for id in due.expired {
            let surface = self.host.sheet_surface();
            if let Some(target) = self.executor.on_timer(surface, id, now) {
                self.finish_snap(target);
            }
        }
    }

    /// The host's style transition on `property` finished
    pub fn handle_transition_end(&mut self, property: &str) {
        let surface = self.host.sheet_surface();
        if let Some(target) = self
            .executor
            .on_transition_end(&mut self.scheduler, surface, property)
        {
            self.finish_snap(target);
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn apply(&mut self, event: SheetEvent) {
        if let Some(next) = self.state.on_event(event) {
            if next != self.state {
                tracing::debug!("SheetController: {:?} --{:?}--> {:?}", self.state, event, next);
            }
            self.state = next;
        }
    }

    fn begin_drag(&mut self, client_y: f32) {
        self.drag = Some(DragSession {
            start_y: client_y,
            start_position: self.position_percent,
        });
        self.apply(SheetEvent::DragStart);
        self.velocity.reset();
        self.velocity
            .add_sample(self.position_percent, self.clock.now_ms());
    }

    fn begin_snap(&mut self, target: f32) {
        self.settle_transition();
        self.drag = None;
        self.arbiter.clear_session();

        let from = self.position_percent;
        self.apply(SheetEvent::SnapStart);
        self.current_snap = target;
        self.position_percent = target;

        // The snap writes directly; a queued drag transform must not land after it
        self.pending_transform = None;
        self.scheduler.cancel_frame();

        let now = self.clock.now_ms();
        let reduced_motion = self.host.prefers_reduced_motion();
        let (timing, _) = self.executor.begin(
            &mut self.scheduler,
            self.host.sheet_surface(),
            from,
            target,
            reduced_motion,
            now,
        );

        if let Some(surface) = self.host.sheet_surface() {
            surface.set_transform(SheetTransform::from_position(target));
        }

        tracing::debug!(
            "SheetController: snapping {:.2}% -> {}% over {:.0}ms",
            from,
            target,
            timing.duration_ms
        );
    }

    fn settle_transition(&mut self) {
        let surface = self.host.sheet_surface();
        if let Some(target) = self.executor.settle(&mut self.scheduler, surface) {
            self.finish_snap(target);
        }
    }

    fn finish_snap(&mut self, target: f32) {
        self.apply(SheetEvent::SnapComplete);
        tracing::debug!("SheetController: snap to {}% complete", target);
        if let Some(callback) = self.on_snap_change.as_mut() {
            callback(target);
        }
    }

    fn schedule_transform_write(&mut self) {
        self.pending_transform = Some(SheetTransform::from_position(self.position_percent));
        self.scheduler.request_frame();
    }

    fn flush_transform(&mut self) {
        let Some(transform) = self.pending_transform.take() else {
            return;
        };
        if let Some(surface) = self.host.sheet_surface() {
            surface.set_transform(transform);
        }
    }
}
