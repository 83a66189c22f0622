//! Snap transition executor
//!
//! A snap is animated by the host's style system (a CSS transition on the
//! transform property, or an equivalent). The executor picks the timing,
//! swaps the surface's transition style in, and resolves completion from
//! whichever arrives first: the host's transition-end notification or a
//! safety timer. The losing path is disarmed so completion is reported
//! exactly once.

use crate::easing::Easing;
use crate::scheduler::{FrameScheduler, TimerId};

/// Style property animated by snap transitions
pub const TRANSFORM_PROPERTY: &str = "transform";

/// Surface whose transition style can be swapped for the duration of a snap
pub trait StyleTarget {
    /// Current transition style, `None` when unset
    fn transition(&self) -> Option<String>;

    /// Replace the transition style (`None` clears it)
    fn set_transition(&mut self, transition: Option<&str>);
}

/// Duration bounds for snap transitions
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionLimits {
    /// Duration for a zero-distance snap
    pub min_duration_ms: f64,
    /// Duration once travel reaches the full viewport
    pub max_duration_ms: f64,
    /// Upper bound when the platform asks for reduced motion
    pub reduced_motion_max_ms: f64,
    /// Extra time past the duration before the safety timer forces completion
    pub safety_margin_ms: f64,
    /// Curve used when motion is not reduced
    pub easing: Easing,
}

impl Default for TransitionLimits {
    fn default() -> Self {
        Self {
            min_duration_ms: 180.0,
            max_duration_ms: 350.0,
            reduced_motion_max_ms: 120.0,
            safety_margin_ms: 60.0,
            easing: Easing::SHEET_EASE_OUT,
        }
    }
}

/// Resolved timing of one snap transition
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionTiming {
    pub duration_ms: f64,
    pub easing: Easing,
}

impl TransitionTiming {
    /// Timing for a snap travelling `distance_percent` of the viewport
    pub fn for_distance(distance_percent: f32, reduced_motion: bool, limits: &TransitionLimits) -> Self {
        let travel = (distance_percent.abs() / 100.0).clamp(0.0, 1.0) as f64;
        let duration_ms =
            limits.min_duration_ms + (limits.max_duration_ms - limits.min_duration_ms) * travel;

        if reduced_motion {
            Self {
                duration_ms: duration_ms.min(limits.reduced_motion_max_ms),
                easing: Easing::Linear,
            }
        } else {
            Self {
                duration_ms,
                easing: limits.easing,
            }
        }
    }

    /// CSS transition shorthand for `property`
    pub fn css(&self, property: &str) -> String {
        format!("{} {}ms {}", property, self.duration_ms.round(), self.easing)
    }

    /// Eased progress after `elapsed_ms`
    pub fn progress(&self, elapsed_ms: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        self.easing.apply((elapsed_ms / self.duration_ms) as f32)
    }
}

struct ActiveTransition {
    from: f32,
    target: f32,
    timing: TransitionTiming,
    previous_transition: Option<String>,
    safety_timer: TimerId,
    started_at_ms: f64,
}

/// Runs one snap transition at a time
pub struct TransitionExecutor {
    limits: TransitionLimits,
    active: Option<ActiveTransition>,
}

impl TransitionExecutor {
    pub fn new(limits: TransitionLimits) -> Self {
        Self {
            limits,
            active: None,
        }
    }

    pub fn limits(&self) -> &TransitionLimits {
        &self.limits
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Interpolated position of the in-flight transition at `now_ms`, as
    /// the host's style system would display it
    pub fn position_at(&self, now_ms: f64) -> Option<f32> {
        let active = self.active.as_ref()?;
        let progress = active.timing.progress(now_ms - active.started_at_ms);
        Some(active.from + (active.target - active.from) * progress)
    }

    /// Start animating from `from` to `target`.
    ///
    /// The caller writes the target transform right after this returns. Any
    /// transition still in flight must be settled first; one left behind is
    /// disarmed and its completion is returned in the second slot.
    pub fn begin<S: StyleTarget + ?Sized>(
        &mut self,
        scheduler: &mut FrameScheduler,
        surface: Option<&mut S>,
        from: f32,
        target: f32,
        reduced_motion: bool,
        now_ms: f64,
    ) -> (TransitionTiming, Option<f32>) {
        let superseded = self.active.take().map(|prev| {
            scheduler.clear_timeout(prev.safety_timer);
            prev
        });

        let timing = TransitionTiming::for_distance(target - from, reduced_motion, &self.limits);

        // The superseded transition's saved style is the one to restore later
        let previous_transition = match (&superseded, surface) {
            (Some(prev), Some(surface)) => {
                surface.set_transition(Some(&timing.css(TRANSFORM_PROPERTY)));
                prev.previous_transition.clone()
            }
            (None, Some(surface)) => {
                let previous = surface.transition();
                surface.set_transition(Some(&timing.css(TRANSFORM_PROPERTY)));
                previous
            }
            (Some(prev), None) => prev.previous_transition.clone(),
            (None, None) => None,
        };

        let safety_timer =
            scheduler.set_timeout(now_ms + timing.duration_ms + self.limits.safety_margin_ms);

        tracing::debug!(
            "TransitionExecutor: {:.1}% -> {:.1}% over {:.0}ms ({})",
            from,
            target,
            timing.duration_ms,
            timing.easing
        );

        self.active = Some(ActiveTransition {
            from,
            target,
            timing,
            previous_transition,
            safety_timer,
            started_at_ms: now_ms,
        });

        (timing, superseded.map(|prev| prev.target))
    }

    /// Host reported the end of a style transition on `property`.
    ///
    /// Returns the completed target when this resolved the active snap.
    pub fn on_transition_end<S: StyleTarget + ?Sized>(
        &mut self,
        scheduler: &mut FrameScheduler,
        surface: Option<&mut S>,
        property: &str,
    ) -> Option<f32> {
        if property != TRANSFORM_PROPERTY {
            return None;
        }
        let active = self.active.take()?;
        scheduler.clear_timeout(active.safety_timer);
        tracing::trace!("TransitionExecutor: resolved by transition end");
        Some(Self::restore(active, surface))
    }

    /// A scheduler timer fired. Returns the completed target when `id` was
    /// the active safety timer.
    pub fn on_timer<S: StyleTarget + ?Sized>(
        &mut self,
        surface: Option<&mut S>,
        id: TimerId,
        now_ms: f64,
    ) -> Option<f32> {
        if self.active.as_ref().map(|a| a.safety_timer) != Some(id) {
            return None;
        }
        let active = self.active.take()?;
        tracing::debug!(
            "TransitionExecutor: no transition end after {:.0}ms, forcing completion",
            now_ms - active.started_at_ms
        );
        Some(Self::restore(active, surface))
    }

    /// Complete the in-flight transition immediately
    pub fn settle<S: StyleTarget + ?Sized>(
        &mut self,
        scheduler: &mut FrameScheduler,
        surface: Option<&mut S>,
    ) -> Option<f32> {
        let active = self.active.take()?;
        scheduler.clear_timeout(active.safety_timer);
        tracing::trace!("TransitionExecutor: settled early at {:.1}%", active.target);
        Some(Self::restore(active, surface))
    }

    fn restore<S: StyleTarget + ?Sized>(active: ActiveTransition, surface: Option<&mut S>) -> f32 {
        if let Some(surface) = surface {
            surface.set_transition(active.previous_transition.as_deref());
        }
        active.target
    }
}

impl Default for TransitionExecutor {
    fn default() -> Self {
        Self::new(TransitionLimits::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeStyle {
        transition: Option<String>,
        writes: usize,
    }

    impl StyleTarget for FakeStyle {
        fn transition(&self) -> Option<String> {
            self.transition.clone()
        }

        fn set_transition(&mut self, transition: Option<&str>) {
            self.transition = transition.map(str::to_owned);
            self.writes += 1;
        }
    }

    #[test]
    fn test_duration_scales_with_distance() {
        let limits = TransitionLimits::default();
        let near = TransitionTiming::for_distance(0.0, false, &limits);
        let mid = TransitionTiming::for_distance(-50.0, false, &limits);
        let far = TransitionTiming::for_distance(140.0, false, &limits);

        assert_eq!(near.duration_ms, 180.0);
        assert_eq!(mid.duration_ms, 265.0);
        assert_eq!(far.duration_ms, 350.0);
        assert_eq!(far.easing, Easing::SHEET_EASE_OUT);
    }

    #[test]
    fn test_reduced_motion_is_short_and_linear() {
        let limits = TransitionLimits::default();
        let timing = TransitionTiming::for_distance(80.0, true, &limits);
        assert!(timing.duration_ms <= 120.0);
        assert_eq!(timing.easing, Easing::Linear);
        assert_eq!(timing.css(TRANSFORM_PROPERTY), "transform 120ms linear");
    }

    #[test]
    fn test_position_follows_easing_curve() {
        let mut scheduler = FrameScheduler::new();
        let mut executor = TransitionExecutor::default();
        assert_eq!(executor.position_at(0.0), None);

        let (timing, _) = executor.begin::<FakeStyle>(&mut scheduler, None, 50.0, 90.0, false, 0.0);
        assert_eq!(executor.position_at(0.0), Some(50.0));
        assert_eq!(executor.position_at(timing.duration_ms), Some(90.0));

        // Ease-out covers more than half the distance by the midpoint
        let midway = executor.position_at(timing.duration_ms / 2.0).unwrap();
        assert!(midway > 70.0 && midway < 90.0);

        executor.settle::<FakeStyle>(&mut scheduler, None);
        assert_eq!(executor.position_at(200.0), None);
    }

    #[test]
    fn test_reduced_motion_progress_is_linear() {
        let timing = TransitionTiming::for_distance(80.0, true, &TransitionLimits::default());
        assert_eq!(timing.progress(60.0), 0.5);
        assert_eq!(timing.progress(500.0), 1.0);
    }

    #[test]
    fn test_transition_end_completes_once_and_restores_style() {
        let mut scheduler = FrameScheduler::new();
        let mut executor = TransitionExecutor::default();
        let mut style = FakeStyle {
            transition: Some("opacity 200ms".to_string()),
            ..Default::default()
        };

        executor.begin(&mut scheduler, Some(&mut style), 50.0, 90.0, false, 0.0);
        assert!(style.transition.as_deref().unwrap().starts_with("transform 248ms"));

        // Other properties do not resolve the snap
        assert_eq!(executor.on_transition_end(&mut scheduler, Some(&mut style), "opacity"), None);

        let done = executor.on_transition_end(&mut scheduler, Some(&mut style), TRANSFORM_PROPERTY);
        assert_eq!(done, Some(90.0));
        assert_eq!(style.transition.as_deref(), Some("opacity 200ms"));

        // Safety timer was disarmed
        let tick = scheduler.tick(10_000.0);
        assert!(tick.expired.is_empty());
        assert_eq!(executor.on_transition_end(&mut scheduler, Some(&mut style), TRANSFORM_PROPERTY), None);
    }

    #[test]
    fn test_safety_timer_completes_stalled_transition() {
        let mut scheduler = FrameScheduler::new();
        let mut executor = TransitionExecutor::default();
        let mut style = FakeStyle::default();

        let (timing, _) = executor.begin(&mut scheduler, Some(&mut style), 10.0, 50.0, false, 1_000.0);

        let deadline = 1_000.0 + timing.duration_ms + 60.0;
        assert!(scheduler.tick(deadline - 1.0).expired.is_empty());

        let tick = scheduler.tick(deadline);
        assert_eq!(tick.expired.len(), 1);
        assert_eq!(executor.on_timer(Some(&mut style), tick.expired[0], deadline), Some(50.0));
        assert_eq!(style.transition, None);

        // A late transition end is ignored
        assert_eq!(executor.on_transition_end(&mut scheduler, Some(&mut style), TRANSFORM_PROPERTY), None);
    }

    #[test]
    fn test_missing_surface_still_completes() {
        let mut scheduler = FrameScheduler::new();
        let mut executor = TransitionExecutor::default();

        executor.begin::<FakeStyle>(&mut scheduler, None, 10.0, 90.0, false, 0.0);
        let tick = scheduler.tick(1_000.0);
        assert_eq!(executor.on_timer::<FakeStyle>(None, tick.expired[0], 1_000.0), Some(90.0));
    }

    #[test]
    fn test_settle_restores_prior_style() {
        let mut scheduler = FrameScheduler::new();
        let mut executor = TransitionExecutor::default();
        let mut style = FakeStyle {
            transition: Some("none".to_string()),
            ..Default::default()
        };

        executor.begin(&mut scheduler, Some(&mut style), 50.0, 90.0, false, 0.0);
        assert_eq!(executor.settle(&mut scheduler, Some(&mut style)), Some(90.0));
        assert_eq!(style.transition.as_deref(), Some("none"));
        assert!(!scheduler.has_pending_work());
        assert_eq!(executor.settle(&mut scheduler, Some(&mut style)), None);
    }

    #[test]
    fn test_begin_over_active_reports_superseded_target() {
        let mut scheduler = FrameScheduler::new();
        let mut executor = TransitionExecutor::default();
        let mut style = FakeStyle {
            transition: Some("none".to_string()),
            ..Default::default()
        };

        executor.begin(&mut scheduler, Some(&mut style), 50.0, 90.0, false, 0.0);
        let (_, superseded) = executor.begin(&mut scheduler, Some(&mut style), 90.0, 10.0, false, 5.0);
        assert_eq!(superseded, Some(90.0));
        assert_eq!(scheduler.pending_timers(), 1);

        let done = executor.on_transition_end(&mut scheduler, Some(&mut style), TRANSFORM_PROPERTY);
        assert_eq!(done, Some(10.0));
        assert_eq!(style.transition.as_deref(), Some("none"));
    }
}
