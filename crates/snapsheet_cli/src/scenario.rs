//! Scenario definition for headless sheet replay.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use snapsheet_core::{ScrollMetrics, ScrollOwner, SheetInput, SheetState};

fn default_viewport_height() -> f32 {
    800.0
}

/// A host setup plus the sequence of steps to replay against it.
#[derive(Debug, Clone, Deserialize)]
pub struct SheetScenario {
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f32,
    /// Scroll metrics of hosted content, if the sheet hosts any
    #[serde(default)]
    pub content: Option<ScrollMetrics>,
    #[serde(default)]
    pub reduced_motion: bool,
    pub steps: Vec<ScenarioStep>,
}

impl SheetScenario {
    /// Load a scenario from JSON text.
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Load a scenario from file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("parsing scenario {}", path.display()))
    }
}

/// One replay step.
///
/// Input steps drive the controller; `wait` and `tick` advance the clock and
/// run frames; `assert_*` steps stop the run on mismatch.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioStep {
    DragStart {
        y: f32,
    },
    DragMove {
        y: f32,
    },
    DragEnd,
    DragCancel,
    /// Finger-sense content scroll; `expanded` defaults to the controller's view
    ScrollIntent {
        delta_y: f32,
        #[serde(default)]
        expanded: Option<bool>,
    },
    ArmBoundary {
        y: f32,
        #[serde(default)]
        expect: Option<bool>,
    },
    Flip {
        y: f32,
        #[serde(default)]
        expect: Option<bool>,
    },
    GestureEnd,
    /// Raw device input routed through the controller's dispatcher
    Input {
        event: SheetInput,
    },
    SnapTo {
        value: f32,
    },
    SetPosition {
        value: f32,
    },
    Wait {
        ms: u64,
    },
    Tick {
        frames: u32,
    },
    TransitionEnd {
        #[serde(default)]
        property: Option<String>,
    },
    SetScrollTop {
        value: f32,
    },
    SetMounted {
        mounted: bool,
    },
    AssertSnap {
        value: f32,
    },
    AssertState {
        state: SheetState,
    },
    AssertPosition {
        value: f32,
        #[serde(default)]
        tolerance: Option<f32>,
    },
    /// Checks where the sheet appears mid-transition
    AssertDisplayedPosition {
        value: f32,
        #[serde(default)]
        tolerance: Option<f32>,
    },
    /// Checks the most recent routing decision
    AssertRoute {
        expected: ScrollOwner,
    },
}

impl ScenarioStep {
    /// Step name as written in scenario files
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioStep::DragStart { .. } => "drag_start",
            ScenarioStep::DragMove { .. } => "drag_move",
            ScenarioStep::DragEnd => "drag_end",
            ScenarioStep::DragCancel => "drag_cancel",
            ScenarioStep::ScrollIntent { .. } => "scroll_intent",
            ScenarioStep::ArmBoundary { .. } => "arm_boundary",
            ScenarioStep::Flip { .. } => "flip",
            ScenarioStep::GestureEnd => "gesture_end",
            ScenarioStep::Input { .. } => "input",
            ScenarioStep::SnapTo { .. } => "snap_to",
            ScenarioStep::SetPosition { .. } => "set_position",
            ScenarioStep::Wait { .. } => "wait",
            ScenarioStep::Tick { .. } => "tick",
            ScenarioStep::TransitionEnd { .. } => "transition_end",
            ScenarioStep::SetScrollTop { .. } => "set_scroll_top",
            ScenarioStep::SetMounted { .. } => "set_mounted",
            ScenarioStep::AssertSnap { .. } => "assert_snap",
            ScenarioStep::AssertState { .. } => "assert_state",
            ScenarioStep::AssertPosition { .. } => "assert_position",
            ScenarioStep::AssertDisplayedPosition { .. } => "assert_displayed_position",
            ScenarioStep::AssertRoute { .. } => "assert_route",
        }
    }
}
