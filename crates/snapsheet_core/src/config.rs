//! Snap configuration and physics tuning
//!
//! Both are plain data, deserializable from TOML (`sheet.toml`):
//!
//! ```toml
//! [snap]
//! points = [10.0, 50.0, 90.0]
//! initial = 50.0
//!
//! [tuning]
//! rubber_band_factor = 0.3
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use snapsheet_animation::TransitionLimits;

use crate::error::{Result, SheetError};

/// Two snap values closer than this are the same snap
pub const SNAP_TOLERANCE: f32 = 1e-3;

// ============================================================================
// Snap Configuration
// ============================================================================

/// The three resting positions of a sheet, in percent of viewport height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SnapConfigurationDef", into = "SnapConfigurationDef")]
pub struct SnapConfiguration {
    points: [f32; 3],
    initial: f32,
}

#[derive(Serialize, Deserialize)]
struct SnapConfigurationDef {
    points: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    initial: Option<f32>,
}

impl TryFrom<SnapConfigurationDef> for SnapConfiguration {
    type Error = SheetError;

    fn try_from(def: SnapConfigurationDef) -> Result<Self> {
        Self::from_slice(&def.points, def.initial)
    }
}

impl From<SnapConfiguration> for SnapConfigurationDef {
    fn from(config: SnapConfiguration) -> Self {
        Self {
            points: config.points.to_vec(),
            initial: Some(config.initial),
        }
    }
}

impl Default for SnapConfiguration {
    /// Collapsed 10%, half 50%, expanded 90%, starting at half
    fn default() -> Self {
        Self {
            points: [10.0, 50.0, 90.0],
            initial: 50.0,
        }
    }
}

impl SnapConfiguration {
    /// Validate ascending `[collapsed, half, expanded]`; initial snap is `half`
    pub fn new(points: [f32; 3]) -> Result<Self> {
        if points.iter().any(|p| !p.is_finite()) {
            return Err(SheetError::InvalidSnapPoints(format!(
                "values must be finite, got {points:?}"
            )));
        }
        if !(points[0] < points[1] && points[1] < points[2]) {
            return Err(SheetError::InvalidSnapPoints(format!(
                "values must be strictly ascending, got {points:?}"
            )));
        }
        Ok(Self {
            points,
            initial: points[1],
        })
    }

    /// Build from an arbitrary slice, rejecting anything but three values
    pub fn from_slice(points: &[f32], initial: Option<f32>) -> Result<Self> {
        let points: [f32; 3] = points.try_into().map_err(|_| {
            SheetError::InvalidSnapPoints(format!("expected 3 values, got {}", points.len()))
        })?;
        let config = Self::new(points)?;
        match initial {
            Some(initial) => config.with_initial(initial),
            None => Ok(config),
        }
    }

    /// Override the initial snap
    pub fn with_initial(mut self, initial: f32) -> Result<Self> {
        self.initial = self
            .resolve(initial)
            .ok_or(SheetError::InvalidInitialSnap(initial))?;
        Ok(self)
    }

    pub fn points(&self) -> [f32; 3] {
        self.points
    }

    pub fn initial(&self) -> f32 {
        self.initial
    }

    pub fn collapsed(&self) -> f32 {
        self.points[0]
    }

    pub fn half(&self) -> f32 {
        self.points[1]
    }

    pub fn expanded(&self) -> f32 {
        self.points[2]
    }

    /// Lowest travel limit
    pub fn min(&self) -> f32 {
        self.points[0]
    }

    /// Highest travel limit
    pub fn max(&self) -> f32 {
        self.points[2]
    }

    /// Index of the configured snap equal to `value`
    pub fn index_of(&self, value: f32) -> Option<usize> {
        self.points
            .iter()
            .position(|p| (p - value).abs() <= SNAP_TOLERANCE)
    }

    /// The configured snap equal to `value`, if any
    pub fn resolve(&self, value: f32) -> Option<f32> {
        self.index_of(value).map(|i| self.points[i])
    }

    pub fn contains(&self, value: f32) -> bool {
        self.index_of(value).is_some()
    }

    /// Configured snap with the smallest distance to `position`.
    /// Ties go to the lower snap.
    pub fn nearest(&self, position: f32) -> f32 {
        let mut best = self.points[0];
        for &point in &self.points[1..] {
            if (point - position).abs() < (best - position).abs() {
                best = point;
            }
        }
        best
    }

    /// Snap `steps` indices away from `current`, clamped to the ends.
    /// An unregistered `current` starts from its nearest snap.
    pub fn step_from(&self, current: f32, steps: i32) -> f32 {
        let index = self
            .index_of(current)
            .unwrap_or_else(|| self.index_of(self.nearest(current)).unwrap_or(1));
        let next = (index as i32 + steps).clamp(0, self.points.len() as i32 - 1);
        self.points[next as usize]
    }

    /// Pick the snap a released drag settles on.
    ///
    /// A flick (`|velocity| > threshold`, percent per ms) advances exactly one
    /// stop from `current` in the direction of motion. Anything slower snaps
    /// to whatever is nearest to `release_position`.
    pub fn release_target(
        &self,
        current: f32,
        release_position: f32,
        velocity: f32,
        threshold: f32,
    ) -> f32 {
        if velocity.abs() > threshold {
            let step = if velocity > 0.0 { 1 } else { -1 };
            self.step_from(current, step)
        } else {
            self.nearest(release_position)
        }
    }

    /// Damp overtravel past `[min, max]` by `factor`
    pub fn rubber_band(&self, raw: f32, factor: f32) -> f32 {
        let (min, max) = (self.min(), self.max());
        if raw > max {
            max + (raw - max) * factor
        } else if raw < min {
            min - (min - raw) * factor
        } else {
            raw
        }
    }
}

// ============================================================================
// Tuning
// ============================================================================

/// Physics and timing constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetTuning {
    /// Share of overtravel that still moves the sheet past its limits
    pub rubber_band_factor: f32,
    /// Release velocity (percent per ms) above which a drag counts as a flick
    pub flick_velocity_threshold: f32,
    /// Further motion (px) needed before an armed boundary becomes a drag
    pub boundary_flip_distance: f32,
    /// Slack (px) when deciding whether content sits at a scroll edge
    pub scroll_epsilon: f32,
    /// Samples kept by the velocity estimator
    pub velocity_capacity: usize,
    /// Most recent samples used for the velocity derivative
    pub velocity_window: usize,
    pub min_duration_ms: f64,
    pub max_duration_ms: f64,
    pub reduced_motion_max_ms: f64,
    pub safety_margin_ms: f64,
    /// Fixed tick used by hosts without a native frame callback
    pub frame_interval_ms: f64,
}

impl Default for SheetTuning {
    fn default() -> Self {
        Self {
            rubber_band_factor: 0.3,
            flick_velocity_threshold: 0.001,
            boundary_flip_distance: 10.0,
            scroll_epsilon: 3.0,
            velocity_capacity: 8,
            velocity_window: 3,
            min_duration_ms: 180.0,
            max_duration_ms: 350.0,
            reduced_motion_max_ms: 120.0,
            safety_margin_ms: 60.0,
            frame_interval_ms: 16.0,
        }
    }
}

impl SheetTuning {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.rubber_band_factor) {
            return Err(SheetError::InvalidTuning(format!(
                "rubber_band_factor must be within [0, 1], got {}",
                self.rubber_band_factor
            )));
        }
        if !(self.flick_velocity_threshold >= 0.0) {
            return Err(SheetError::InvalidTuning(
                "flick_velocity_threshold must be non-negative".to_string(),
            ));
        }
        if !(self.boundary_flip_distance >= 0.0) || !(self.scroll_epsilon >= 0.0) {
            return Err(SheetError::InvalidTuning(
                "boundary_flip_distance and scroll_epsilon must be non-negative".to_string(),
            ));
        }
        if self.velocity_window < 2 || self.velocity_capacity < self.velocity_window {
            return Err(SheetError::InvalidTuning(format!(
                "need 2 <= velocity_window ({}) <= velocity_capacity ({})",
                self.velocity_window, self.velocity_capacity
            )));
        }
        if !(self.min_duration_ms >= 0.0 && self.min_duration_ms <= self.max_duration_ms) {
            return Err(SheetError::InvalidTuning(format!(
                "need 0 <= min_duration_ms ({}) <= max_duration_ms ({})",
                self.min_duration_ms, self.max_duration_ms
            )));
        }
        if !(self.reduced_motion_max_ms >= 0.0 && self.safety_margin_ms >= 0.0) {
            return Err(SheetError::InvalidTuning(
                "reduced_motion_max_ms and safety_margin_ms must be non-negative".to_string(),
            ));
        }
        if !(self.frame_interval_ms > 0.0) {
            return Err(SheetError::InvalidTuning(
                "frame_interval_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Transition bounds derived from this tuning
    pub fn transition_limits(&self) -> TransitionLimits {
        TransitionLimits {
            min_duration_ms: self.min_duration_ms,
            max_duration_ms: self.max_duration_ms,
            reduced_motion_max_ms: self.reduced_motion_max_ms,
            safety_margin_ms: self.safety_margin_ms,
            ..Default::default()
        }
    }
}

// ============================================================================
// Config File
// ============================================================================

/// Top-level sheet configuration (sheet.toml)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetConfig {
    pub snap: SnapConfiguration,
    #[serde(default)]
    pub tuning: SheetTuning,
}

impl SheetConfig {
    pub fn new(snap: SnapConfiguration) -> Self {
        Self {
            snap,
            tuning: SheetTuning::default(),
        }
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: SheetConfig =
            toml::from_str(input).map_err(|e| SheetError::Config(e.to_string()))?;
        config.tuning.validate()?;
        Ok(config)
    }

    /// Load from a file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| SheetError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    /// Serialize to TOML text
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| SheetError::Config(e.to_string()))
    }
}
