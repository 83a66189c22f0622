//! Snapsheet CLI
//!
//! Headless replay of gesture scenarios. A scenario describes the host
//! (viewport, hosted content) and a list of steps; the runner drives a
//! [`snapsheet_core::SheetController`] against a recording host with a
//! manual clock and produces a JSON report.

pub mod report;
pub mod runner;
pub mod scenario;

pub use report::{ReportStatus, SheetReport};
pub use runner::{run_loaded_scenario, run_scenario};
pub use scenario::{ScenarioStep, SheetScenario};
