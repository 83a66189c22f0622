//! Scroll boundary probes
//!
//! Pure functions over a content element's scroll metrics. They are the only
//! source of truth for whether hosted content still has room to move.

use serde::{Deserialize, Serialize};

/// Default slack (px) absorbing sub-pixel scroll rounding
pub const DEFAULT_EPSILON: f32 = 3.0;

/// Scroll metrics reported by a content element
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollMetrics {
    pub scroll_top: f32,
    pub scroll_height: f32,
    pub client_height: f32,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f32, scroll_height: f32, client_height: f32) -> Self {
        Self {
            scroll_top,
            scroll_height,
            client_height,
        }
    }
}

/// Scroll metrics with the derived scroll limit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollInfo {
    pub scroll_top: f32,
    pub scroll_height: f32,
    pub client_height: f32,
    pub max_scroll_top: f32,
}

/// Direction of finger or wheel motion over the content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollDirection {
    /// Motion that reveals content further down
    Up,
    /// Motion that reveals content further up
    Down,
}

impl ScrollDirection {
    /// Direction of a finger-sense delta (positive = finger moving down).
    /// `None` for a zero delta.
    pub fn from_delta(delta_y: f32) -> Option<Self> {
        if delta_y > 0.0 {
            Some(ScrollDirection::Down)
        } else if delta_y < 0.0 {
            Some(ScrollDirection::Up)
        } else {
            None
        }
    }
}

pub fn scroll_info(metrics: &ScrollMetrics) -> ScrollInfo {
    ScrollInfo {
        scroll_top: metrics.scroll_top,
        scroll_height: metrics.scroll_height,
        client_height: metrics.client_height,
        max_scroll_top: (metrics.scroll_height - metrics.client_height).max(0.0),
    }
}

pub fn is_at_top(metrics: &ScrollMetrics, epsilon: f32) -> bool {
    metrics.scroll_top <= epsilon
}

pub fn is_at_bottom(metrics: &ScrollMetrics, epsilon: f32) -> bool {
    let info = scroll_info(metrics);
    info.scroll_top >= info.max_scroll_top - epsilon
}

/// Whether the content can still move in `direction`
pub fn can_scroll(metrics: &ScrollMetrics, direction: ScrollDirection, epsilon: f32) -> bool {
    match direction {
        ScrollDirection::Up => !is_at_bottom(metrics, epsilon),
        ScrollDirection::Down => !is_at_top(metrics, epsilon),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_info() {
        let info = scroll_info(&ScrollMetrics::new(120.0, 1000.0, 400.0));
        assert_eq!(info.max_scroll_top, 600.0);

        // Content shorter than the viewport never scrolls
        let info = scroll_info(&ScrollMetrics::new(0.0, 300.0, 400.0));
        assert_eq!(info.max_scroll_top, 0.0);
    }

    #[test]
    fn test_edges_absorb_subpixel_rounding() {
        let top = ScrollMetrics::new(2.5, 1000.0, 400.0);
        assert!(is_at_top(&top, DEFAULT_EPSILON));
        assert!(!is_at_bottom(&top, DEFAULT_EPSILON));

        let bottom = ScrollMetrics::new(597.6, 1000.0, 400.0);
        assert!(is_at_bottom(&bottom, DEFAULT_EPSILON));
        assert!(!is_at_top(&bottom, DEFAULT_EPSILON));

        let middle = ScrollMetrics::new(300.0, 1000.0, 400.0);
        assert!(!is_at_top(&middle, DEFAULT_EPSILON));
        assert!(!is_at_bottom(&middle, DEFAULT_EPSILON));
    }

    #[test]
    fn test_can_scroll() {
        let top = ScrollMetrics::new(0.0, 1000.0, 400.0);
        assert!(can_scroll(&top, ScrollDirection::Up, DEFAULT_EPSILON));
        assert!(!can_scroll(&top, ScrollDirection::Down, DEFAULT_EPSILON));

        let bottom = ScrollMetrics::new(600.0, 1000.0, 400.0);
        assert!(!can_scroll(&bottom, ScrollDirection::Up, DEFAULT_EPSILON));
        assert!(can_scroll(&bottom, ScrollDirection::Down, DEFAULT_EPSILON));

        let short = ScrollMetrics::new(0.0, 200.0, 400.0);
        assert!(!can_scroll(&short, ScrollDirection::Up, DEFAULT_EPSILON));
        assert!(!can_scroll(&short, ScrollDirection::Down, DEFAULT_EPSILON));
    }

    #[test]
    fn test_direction_from_delta() {
        assert_eq!(ScrollDirection::from_delta(5.0), Some(ScrollDirection::Down));
        assert_eq!(ScrollDirection::from_delta(-5.0), Some(ScrollDirection::Up));
        assert_eq!(ScrollDirection::from_delta(0.0), None);
    }
}
