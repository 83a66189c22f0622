//! Content-vs-sheet routing.
//!
//! Once the sheet is fully expanded, hosted content receives scroll input
//! until it runs out of room. The first event that finds the content at an
//! edge is absorbed and arms that edge; only the next event in the same
//! direction is handed to the sheet. A single overscroll twitch therefore
//! never moves the sheet.
//!
//! Raw touch streams use [`BoundaryArbiter::arm`] and
//! [`BoundaryArbiter::should_flip`]: after arming, the finger has to travel a
//! further `flip_distance` toward the edge before the gesture becomes a sheet
//! drag. Motion back away from the edge disarms.

use serde::{Deserialize, Serialize};

use crate::boundary::{self, ScrollDirection, ScrollMetrics};
use crate::state::{Boundary, BoundaryArmSession, SheetEvent, SheetState};

/// Who consumes a scroll event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollOwner {
    Content,
    Sheet,
}

/// Edge a direction runs into
fn boundary_for(direction: ScrollDirection) -> Boundary {
    match direction {
        // Finger moving down: content heads for its top, sheet wants to collapse
        ScrollDirection::Down => Boundary::Top,
        ScrollDirection::Up => Boundary::Bottom,
    }
}

fn armed_state(boundary: Boundary) -> SheetState {
    match boundary {
        Boundary::Top => SheetState::ArmedAtTopBoundary,
        Boundary::Bottom => SheetState::ArmedAtBottomBoundary,
    }
}

fn apply(state: &mut SheetState, event: SheetEvent) {
    if let Some(next) = state.on_event(event) {
        if next != *state {
            tracing::debug!("BoundaryArbiter: {:?} --{:?}--> {:?}", state, event, next);
        }
        *state = next;
    }
}

/// Routes scroll input between hosted content and the sheet
#[derive(Debug, Clone)]
pub struct BoundaryArbiter {
    epsilon: f32,
    flip_distance: f32,
    session: Option<BoundaryArmSession>,
}

impl BoundaryArbiter {
    pub fn new(epsilon: f32, flip_distance: f32) -> Self {
        Self {
            epsilon,
            flip_distance,
            session: None,
        }
    }

    /// Active touch arm session
    pub fn session(&self) -> Option<&BoundaryArmSession> {
        self.session.as_ref()
    }

    /// Forget the touch arm session without touching the state
    pub fn clear_session(&mut self) {
        self.session = None;
    }

    /// Decide who consumes a scroll of `delta_y` (finger sense: positive
    /// means the finger moved down).
    pub fn route(
        &mut self,
        state: &mut SheetState,
        content: Option<ScrollMetrics>,
        delta_y: f32,
        is_expanded: bool,
    ) -> ScrollOwner {
        if *state == SheetState::DraggingSheet {
            return ScrollOwner::Sheet;
        }
        let Some(metrics) = content.filter(|_| is_expanded) else {
            return ScrollOwner::Sheet;
        };
        let Some(direction) = ScrollDirection::from_delta(delta_y) else {
            return ScrollOwner::Content;
        };
        if *state == SheetState::Snapping {
            // The sheet is settling; content keeps the event and state stays put
            return ScrollOwner::Content;
        }

        if boundary::can_scroll(&metrics, direction, self.epsilon) {
            self.session = None;
            apply(state, SheetEvent::ContentScrolled);
            return ScrollOwner::Content;
        }

        let boundary = boundary_for(direction);
        if *state == armed_state(boundary) {
            tracing::trace!("BoundaryArbiter: {:?} boundary already armed, sheet takes delta {:.1}", boundary, delta_y);
            return ScrollOwner::Sheet;
        }

        self.session = None;
        apply(state, SheetEvent::BoundaryHit(boundary));
        ScrollOwner::Content
    }

    /// Arm the edge the content currently rests on for a touch at `client_y`.
    ///
    /// Returns `false` when there is nothing to arm: the sheet is not
    /// expanded or is already moving, there is no content, or the content
    /// sits between its edges.
    pub fn arm(
        &mut self,
        state: &mut SheetState,
        content: Option<ScrollMetrics>,
        client_y: f32,
        is_expanded: bool,
    ) -> bool {
        if !is_expanded || matches!(*state, SheetState::DraggingSheet | SheetState::Snapping) {
            return false;
        }
        let Some(metrics) = content else {
            return false;
        };

        let boundary = match state.armed_boundary() {
            Some(boundary) => boundary,
            None if boundary::is_at_top(&metrics, self.epsilon) => Boundary::Top,
            None if boundary::is_at_bottom(&metrics, self.epsilon) => Boundary::Bottom,
            None => return false,
        };

        apply(state, SheetEvent::BoundaryHit(boundary));
        self.session = Some(BoundaryArmSession {
            boundary,
            armed_y: client_y,
        });
        tracing::trace!("BoundaryArbiter: armed {:?} at y={:.1}", boundary, client_y);
        true
    }

    /// Check whether the armed touch at `client_y` has travelled far enough
    /// toward its edge to become a sheet drag. On `true` the state is
    /// `DraggingSheet` and the arm session is gone.
    pub fn should_flip(&mut self, state: &mut SheetState, client_y: f32) -> bool {
        let Some(session) = self.session else {
            return false;
        };
        if state.armed_boundary() != Some(session.boundary) {
            self.session = None;
            return false;
        }

        let travel = client_y - session.armed_y;
        let toward_edge = match session.boundary {
            Boundary::Top => travel,
            Boundary::Bottom => -travel,
        };

        if toward_edge < 0.0 {
            self.session = None;
            apply(state, SheetEvent::Reversed);
            return false;
        }
        if toward_edge >= self.flip_distance {
            self.session = None;
            apply(state, SheetEvent::BoundaryFlip);
            return true;
        }
        false
    }

    /// The content gesture ended
    pub fn reset(&mut self, state: &mut SheetState) {
        self.session = None;
        apply(state, SheetEvent::GestureEnd);
    }
}

impl Default for BoundaryArbiter {
    fn default() -> Self {
        Self::new(boundary::DEFAULT_EPSILON, 10.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AT_TOP: ScrollMetrics = ScrollMetrics {
        scroll_top: 0.0,
        scroll_height: 2000.0,
        client_height: 600.0,
    };
    const MIDDLE: ScrollMetrics = ScrollMetrics {
        scroll_top: 700.0,
        scroll_height: 2000.0,
        client_height: 600.0,
    };
    const AT_BOTTOM: ScrollMetrics = ScrollMetrics {
        scroll_top: 1400.0,
        scroll_height: 2000.0,
        client_height: 600.0,
    };

    #[test]
    fn test_sheet_owns_input_unless_expanded() {
        let mut arbiter = BoundaryArbiter::default();
        let mut state = SheetState::Idle;
        assert_eq!(arbiter.route(&mut state, Some(MIDDLE), 5.0, false), ScrollOwner::Sheet);
        assert_eq!(arbiter.route(&mut state, None, 5.0, true), ScrollOwner::Sheet);
        assert_eq!(state, SheetState::Idle);
    }

    #[test]
    fn test_content_scrolls_when_it_has_room() {
        let mut arbiter = BoundaryArbiter::default();
        let mut state = SheetState::Idle;
        assert_eq!(arbiter.route(&mut state, Some(MIDDLE), 5.0, true), ScrollOwner::Content);
        assert_eq!(state, SheetState::ScrollingContent);
        assert_eq!(arbiter.route(&mut state, Some(MIDDLE), -5.0, true), ScrollOwner::Content);
        assert_eq!(state, SheetState::ScrollingContent);
    }

    #[test]
    fn test_first_boundary_event_is_absorbed() {
        let mut arbiter = BoundaryArbiter::default();
        let mut state = SheetState::Idle;

        assert_eq!(arbiter.route(&mut state, Some(AT_TOP), 5.0, true), ScrollOwner::Content);
        assert_eq!(state, SheetState::ArmedAtTopBoundary);

        assert_eq!(arbiter.route(&mut state, Some(AT_TOP), 5.0, true), ScrollOwner::Sheet);
        assert_eq!(state, SheetState::ArmedAtTopBoundary);
    }

    #[test]
    fn test_bottom_boundary_arms_on_expand_intent() {
        let mut arbiter = BoundaryArbiter::default();
        let mut state = SheetState::ScrollingContent;

        assert_eq!(arbiter.route(&mut state, Some(AT_BOTTOM), -8.0, true), ScrollOwner::Content);
        assert_eq!(state, SheetState::ArmedAtBottomBoundary);
        assert_eq!(arbiter.route(&mut state, Some(AT_BOTTOM), -8.0, true), ScrollOwner::Sheet);
    }

    #[test]
    fn test_reversal_returns_to_content() {
        let mut arbiter = BoundaryArbiter::default();
        let mut state = SheetState::Idle;

        arbiter.route(&mut state, Some(AT_TOP), 5.0, true);
        assert_eq!(state, SheetState::ArmedAtTopBoundary);

        // Finger turns around: content has room going the other way
        assert_eq!(arbiter.route(&mut state, Some(AT_TOP), -5.0, true), ScrollOwner::Content);
        assert_eq!(state, SheetState::ScrollingContent);

        // Back toward the edge: absorbed again before the sheet moves
        assert_eq!(arbiter.route(&mut state, Some(AT_TOP), 5.0, true), ScrollOwner::Content);
        assert_eq!(arbiter.route(&mut state, Some(AT_TOP), 5.0, true), ScrollOwner::Sheet);
    }

    #[test]
    fn test_dragging_sheet_keeps_input() {
        let mut arbiter = BoundaryArbiter::default();
        let mut state = SheetState::DraggingSheet;
        assert_eq!(arbiter.route(&mut state, Some(MIDDLE), 5.0, true), ScrollOwner::Sheet);
        assert_eq!(state, SheetState::DraggingSheet);
    }

    #[test]
    fn test_snapping_state_is_preserved() {
        let mut arbiter = BoundaryArbiter::default();
        let mut state = SheetState::Snapping;
        assert_eq!(arbiter.route(&mut state, Some(AT_TOP), 5.0, true), ScrollOwner::Content);
        assert_eq!(state, SheetState::Snapping);
    }

    #[test]
    fn test_touch_flip_needs_ten_pixels() {
        let mut arbiter = BoundaryArbiter::default();
        let mut state = SheetState::ScrollingContent;

        assert!(arbiter.arm(&mut state, Some(AT_TOP), 300.0, true));
        assert_eq!(state, SheetState::ArmedAtTopBoundary);

        assert!(!arbiter.should_flip(&mut state, 304.0));
        assert!(!arbiter.should_flip(&mut state, 309.5));
        assert_eq!(state, SheetState::ArmedAtTopBoundary);

        assert!(arbiter.should_flip(&mut state, 310.0));
        assert_eq!(state, SheetState::DraggingSheet);
        assert!(arbiter.session().is_none());

        // Session consumed
        assert!(!arbiter.should_flip(&mut state, 330.0));
    }

    #[test]
    fn test_touch_flip_bottom_edge_moves_up() {
        let mut arbiter = BoundaryArbiter::default();
        let mut state = SheetState::Idle;

        assert!(arbiter.arm(&mut state, Some(AT_BOTTOM), 500.0, true));
        assert_eq!(state, SheetState::ArmedAtBottomBoundary);
        assert!(!arbiter.should_flip(&mut state, 495.0));
        assert!(arbiter.should_flip(&mut state, 488.0));
    }

    #[test]
    fn test_touch_reversal_disarms() {
        let mut arbiter = BoundaryArbiter::default();
        let mut state = SheetState::Idle;

        arbiter.arm(&mut state, Some(AT_TOP), 300.0, true);
        assert!(!arbiter.should_flip(&mut state, 297.0));
        assert_eq!(state, SheetState::Idle);
        assert!(arbiter.session().is_none());
    }

    #[test]
    fn test_arm_requires_an_edge() {
        let mut arbiter = BoundaryArbiter::default();
        let mut state = SheetState::ScrollingContent;
        assert!(!arbiter.arm(&mut state, Some(MIDDLE), 300.0, true));
        assert!(!arbiter.arm(&mut state, None, 300.0, true));
        assert_eq!(state, SheetState::ScrollingContent);

        let mut dragging = SheetState::DraggingSheet;
        assert!(!arbiter.arm(&mut dragging, Some(AT_TOP), 300.0, true));
    }

    #[test]
    fn test_arm_requires_expanded_sheet() {
        let mut arbiter = BoundaryArbiter::default();
        let mut state = SheetState::Idle;
        assert!(!arbiter.arm(&mut state, Some(AT_TOP), 300.0, false));
        assert_eq!(state, SheetState::Idle);
        assert!(arbiter.session().is_none());
    }

    #[test]
    fn test_gesture_end_resets() {
        let mut arbiter = BoundaryArbiter::default();
        let mut state = SheetState::Idle;
        arbiter.arm(&mut state, Some(AT_TOP), 300.0, true);
        arbiter.reset(&mut state);
        assert_eq!(state, SheetState::Idle);
        assert!(arbiter.session().is_none());
    }
}
