//! Normalized input
//!
//! Touch, mouse and wheel events carry different payloads on every platform.
//! Host adapters reduce them to [`SheetInput`] before they reach the
//! controller, so the core never branches on device type.

use serde::{Deserialize, Serialize};

/// Device-independent input event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SheetInput {
    /// Finger or button pressed on the sheet's drag handle
    PointerDown { client_y: f32 },
    PointerMove { client_y: f32 },
    PointerUp,
    /// Platform took the pointer away (system gesture, focus loss)
    PointerCancel,
    /// Wheel or trackpad scroll, browser sign convention
    /// (positive reveals content further down)
    Wheel { delta_y: f32 },
}

impl SheetInput {
    /// Scroll delta in finger sense (positive = content pulled down)
    pub fn finger_delta(&self) -> Option<f32> {
        match *self {
            SheetInput::Wheel { delta_y } => Some(-delta_y),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wheel_is_inverted_to_finger_sense() {
        let input = SheetInput::Wheel { delta_y: 12.0 };
        assert_eq!(input.finger_delta(), Some(-12.0));
        assert_eq!(SheetInput::PointerMove { client_y: 240.0 }.finger_delta(), None);
    }

    #[test]
    fn test_deserialize_tagged() {
        let input: SheetInput =
            serde_json::from_str(r#"{"type": "pointer_down", "client_y": 500.0}"#).unwrap();
        assert_eq!(input, SheetInput::PointerDown { client_y: 500.0 });
    }
}
