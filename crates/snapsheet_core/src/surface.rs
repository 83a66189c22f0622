//! Host integration points
//!
//! The controller never touches a UI toolkit directly. Hosts hand it a
//! [`SheetHost`], which exposes the sheet surface (the one element whose
//! transform the controller writes), the hosted content's scroll metrics,
//! and the viewport height. Any of these may be missing before mount; the
//! controller then skips the write or check instead of failing.

use std::fmt;

use snapsheet_animation::StyleTarget;

use crate::boundary::ScrollMetrics;

/// Vertical offset of the sheet surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetTransform {
    /// `translateY` in percent of the surface's own height
    pub translate_y_percent: f32,
}

impl SheetTransform {
    /// Transform showing the sheet open to `position_percent` of the viewport
    pub fn from_position(position_percent: f32) -> Self {
        Self {
            translate_y_percent: 100.0 - position_percent,
        }
    }

    /// The position this transform displays
    pub fn position_percent(&self) -> f32 {
        100.0 - self.translate_y_percent
    }

    /// CSS `transform` value
    pub fn to_css(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SheetTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "translateY({}%)", self.translate_y_percent)
    }
}

/// The element the controller moves.
///
/// Transition style accessors come from [`StyleTarget`].
pub trait SheetSurface: StyleTarget {
    fn set_transform(&mut self, transform: SheetTransform);
}

/// Everything the controller needs from its host
pub trait SheetHost {
    /// The mounted sheet surface, `None` before mount
    fn sheet_surface(&mut self) -> Option<&mut dyn SheetSurface>;

    /// Scroll metrics of the hosted content, `None` when there is none
    fn content_metrics(&self) -> Option<ScrollMetrics>;

    /// Viewport height in pixels
    fn viewport_height(&self) -> f32;

    /// Platform asks for reduced motion
    fn prefers_reduced_motion(&self) -> bool {
        false
    }
}
