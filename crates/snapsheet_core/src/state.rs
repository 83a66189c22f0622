//! Controller state machine
//!
//! One exclusive [`SheetState`] replaces independent dragging/armed flags.
//! Transitions are a pure `(state, event) -> Option<state>` table; callers
//! apply them with:
//!
//! ```ignore
//! if let Some(next) = state.on_event(SheetEvent::DragStart) {
//!     state = next;
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Scroll edge of the hosted content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Boundary {
    Top,
    Bottom,
}

/// What the controller is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetState {
    #[default]
    Idle,
    DraggingSheet,
    ScrollingContent,
    ArmedAtTopBoundary,
    ArmedAtBottomBoundary,
    Snapping,
}

/// Inputs to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetEvent {
    /// A sheet drag began
    DragStart,
    /// The dragging finger lifted
    Release,
    /// Content accepted a scroll
    ContentScrolled,
    /// Content could not scroll further toward this edge
    BoundaryHit(Boundary),
    /// Enough motion past an armed boundary to move the sheet
    BoundaryFlip,
    /// Motion turned away from the armed boundary
    Reversed,
    /// The content gesture ended
    GestureEnd,
    SnapStart,
    SnapComplete,
}

impl SheetState {
    /// The next state for `event`, or `None` when the event does not apply
    pub fn on_event(&self, event: SheetEvent) -> Option<Self> {
        use SheetEvent::*;
        use SheetState::*;
        match (self, event) {
            (_, DragStart) => Some(DraggingSheet),
            (_, SnapStart) => Some(Snapping),
            (Snapping, SnapComplete) => Some(Idle),
            (DraggingSheet, Release) => Some(Idle),

            (Idle | ScrollingContent | ArmedAtTopBoundary | ArmedAtBottomBoundary, ContentScrolled) => {
                Some(ScrollingContent)
            }
            (Idle | ScrollingContent | ArmedAtBottomBoundary, BoundaryHit(Boundary::Top)) => {
                Some(ArmedAtTopBoundary)
            }
            (Idle | ScrollingContent | ArmedAtTopBoundary, BoundaryHit(Boundary::Bottom)) => {
                Some(ArmedAtBottomBoundary)
            }
            (ArmedAtTopBoundary | ArmedAtBottomBoundary, BoundaryFlip) => Some(DraggingSheet),
            (
                ScrollingContent | ArmedAtTopBoundary | ArmedAtBottomBoundary,
                Reversed | GestureEnd,
            ) => Some(Idle),
            _ => None,
        }
    }

    /// The boundary this state is armed at
    pub fn armed_boundary(&self) -> Option<Boundary> {
        match self {
            SheetState::ArmedAtTopBoundary => Some(Boundary::Top),
            SheetState::ArmedAtBottomBoundary => Some(Boundary::Bottom),
            _ => None,
        }
    }

    /// Content currently owns the gesture (scrolling or holding a boundary)
    pub fn is_content_gesture(&self) -> bool {
        matches!(
            self,
            SheetState::ScrollingContent
                | SheetState::ArmedAtTopBoundary
                | SheetState::ArmedAtBottomBoundary
        )
    }
}

/// A sheet drag in progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub start_y: f32,
    pub start_position: f32,
}

/// A touch gesture held at a content boundary
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryArmSession {
    pub boundary: Boundary,
    pub armed_y: f32,
}
