//! Scenario runner replaying steps against a headless sheet.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use snapsheet_core::{
    HeadlessHandle, HeadlessHost, ManualClock, ScrollOwner, SheetConfig, SheetController,
    SheetOptions,
};

use crate::report::{ReportStatus, SheetReport};
use crate::scenario::{ScenarioStep, SheetScenario};

const DEFAULT_POSITION_TOLERANCE: f32 = 0.01;

/// Controller, host and clock for one run
struct Replay {
    sheet: SheetController,
    host: HeadlessHandle,
    clock: ManualClock,
    snap_changes: Rc<RefCell<Vec<f32>>>,
    frame_interval_ms: f64,
    elapsed_ms: u64,
    last_route: Option<ScrollOwner>,
}

impl Replay {
    fn new(scenario: &SheetScenario, config: SheetConfig) -> Result<Self> {
        let mut host = HeadlessHost::new().with_viewport_height(scenario.viewport_height);
        if let Some(content) = scenario.content {
            host = host.with_content(content);
        }
        let handle = host.handle();
        handle.set_reduced_motion(scenario.reduced_motion);

        let clock = ManualClock::new(0.0);
        let snap_changes = Rc::new(RefCell::new(Vec::new()));
        let sink = snap_changes.clone();
        let frame_interval_ms = config.tuning.frame_interval_ms;

        let options = SheetOptions::from_config(config)
            .clock(clock.clone())
            .on_snap_change(move |snap| sink.borrow_mut().push(snap));
        let sheet = SheetController::new(options, host)?;

        Ok(Self {
            sheet,
            host: handle,
            clock,
            snap_changes,
            frame_interval_ms,
            elapsed_ms: 0,
            last_route: None,
        })
    }

    /// Run `frames` frames of `frame_interval_ms` each
    fn run_frames(&mut self, frames: u32) {
        for _ in 0..frames {
            self.clock.advance(self.frame_interval_ms);
            self.sheet.tick();
        }
        self.elapsed_ms += (frames as f64 * self.frame_interval_ms).round() as u64;
    }

    /// Advance `ms` of simulated time, one frame interval at a time
    fn wait(&mut self, ms: u64) {
        let mut remaining = ms as f64;
        while remaining > 0.0 {
            let step = remaining.min(self.frame_interval_ms);
            self.clock.advance(step);
            self.sheet.tick();
            remaining -= step;
        }
        self.elapsed_ms += ms;
    }

    /// Apply one step. `Err` carries the assertion failure message.
    fn apply(&mut self, step: &ScenarioStep) -> std::result::Result<(), String> {
        match step {
            ScenarioStep::DragStart { y } => self.sheet.handle_drag_start(*y),
            ScenarioStep::DragMove { y } => self.sheet.handle_drag_move(*y),
            ScenarioStep::DragEnd => self.sheet.handle_drag_end(),
            ScenarioStep::DragCancel => self.sheet.handle_drag_cancel(),
            ScenarioStep::ScrollIntent { delta_y, expanded } => {
                let expanded = expanded.unwrap_or_else(|| self.sheet.is_expanded());
                self.last_route = Some(self.sheet.handle_content_scroll_intent(*delta_y, expanded));
            }
            ScenarioStep::ArmBoundary { y, expect } => {
                let armed = self.sheet.arm_boundary(*y);
                check_expectation("arm_boundary", armed, *expect)?;
            }
            ScenarioStep::Flip { y, expect } => {
                let flipped = self.sheet.should_flip_from_boundary_to_drag(*y);
                check_expectation("flip", flipped, *expect)?;
            }
            ScenarioStep::GestureEnd => self.sheet.handle_gesture_end(),
            ScenarioStep::Input { event } => {
                if let Some(route) = self.sheet.dispatch(*event) {
                    self.last_route = Some(route);
                }
            }
            ScenarioStep::SnapTo { value } => self.sheet.snap_to(*value),
            ScenarioStep::SetPosition { value } => self.sheet.set_position_immediately(*value),
            ScenarioStep::Wait { ms } => self.wait(*ms),
            ScenarioStep::Tick { frames } => self.run_frames(*frames),
            ScenarioStep::TransitionEnd { property } => {
                let property = property.as_deref().unwrap_or("transform");
                self.sheet.handle_transition_end(property);
            }
            ScenarioStep::SetScrollTop { value } => self.host.set_scroll_top(*value),
            ScenarioStep::SetMounted { mounted } => self.host.set_mounted(*mounted),
            ScenarioStep::AssertSnap { value } => {
                let actual = self.sheet.current_snap();
                if (actual - value).abs() > snapsheet_core::SNAP_TOLERANCE {
                    return Err(format!("expected snap {value}, found {actual}"));
                }
            }
            ScenarioStep::AssertState { state } => {
                let actual = self.sheet.state();
                if actual != *state {
                    return Err(format!("expected state {state:?}, found {actual:?}"));
                }
            }
            ScenarioStep::AssertPosition { value, tolerance } => {
                let tolerance = tolerance.unwrap_or(DEFAULT_POSITION_TOLERANCE);
                let actual = self.sheet.position_percent();
                if (actual - value).abs() > tolerance {
                    return Err(format!(
                        "expected position {value}% (+/- {tolerance}), found {actual}%"
                    ));
                }
            }
            ScenarioStep::AssertDisplayedPosition { value, tolerance } => {
                let tolerance = tolerance.unwrap_or(DEFAULT_POSITION_TOLERANCE);
                let actual = self.sheet.displayed_position();
                if (actual - value).abs() > tolerance {
                    return Err(format!(
                        "expected displayed position {value}% (+/- {tolerance}), found {actual}%"
                    ));
                }
            }
            ScenarioStep::AssertRoute { expected } => match self.last_route {
                Some(actual) if actual == *expected => {}
                Some(actual) => {
                    return Err(format!("expected route {expected:?}, found {actual:?}"));
                }
                None => return Err("no routing decision recorded yet".to_string()),
            },
        }
        Ok(())
    }

    fn report(
        &self,
        status: ReportStatus,
        failure: Option<(usize, &ScenarioStep, String)>,
    ) -> SheetReport {
        let (failed_step_index, assertion, message) = match failure {
            Some((index, step, message)) => {
                (Some(index), Some(step.name().to_string()), Some(message))
            }
            None => (None, None, None),
        };
        SheetReport {
            status,
            failed_step_index,
            assertion,
            message,
            elapsed_ms: self.elapsed_ms,
            frames_run: self.sheet.frames_run(),
            snap_changes: self.snap_changes.borrow().clone(),
            transform_writes: self.host.transform_writes(),
            final_snap: self.sheet.current_snap(),
            final_state: self.sheet.state(),
        }
    }
}

fn check_expectation(
    step: &str,
    actual: bool,
    expected: Option<bool>,
) -> std::result::Result<(), String> {
    match expected {
        Some(expected) if expected != actual => {
            Err(format!("{step}: expected {expected}, controller returned {actual}"))
        }
        _ => Ok(()),
    }
}

/// Execute scenario JSON with the default sheet configuration.
pub fn run_scenario(input: &str) -> Result<SheetReport> {
    let scenario = SheetScenario::from_json(input)?;
    run_loaded_scenario(&scenario, SheetConfig::default())
}

/// Execute a pre-loaded scenario.
///
/// `Err` is reserved for setup failures; assertion failures come back as a
/// failed report.
pub fn run_loaded_scenario(scenario: &SheetScenario, config: SheetConfig) -> Result<SheetReport> {
    let mut replay = Replay::new(scenario, config)?;

    for (step_index, step) in scenario.steps.iter().enumerate() {
        tracing::debug!("scenario step {}: {:?}", step_index, step);
        if let Err(message) = replay.apply(step) {
            tracing::warn!("scenario failed at step {} ({}): {}", step_index, step.name(), message);
            return Ok(replay.report(ReportStatus::Failed, Some((step_index, step, message))));
        }
    }

    Ok(replay.report(ReportStatus::Passed, None))
}
