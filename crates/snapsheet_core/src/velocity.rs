//! Release velocity estimation.
//!
//! Keeps a short window of time-stamped positions and differentiates over the
//! most recent few, so the final flick of a gesture decides the snap rather
//! than an average over the whole drag.

use smallvec::SmallVec;

/// Default number of retained samples
pub const DEFAULT_CAPACITY: usize = 8;

/// Default number of recent samples used for the derivative
pub const DEFAULT_WINDOW: usize = 3;

/// A position observed at a point in time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocitySample {
    pub time_ms: f64,
    pub value: f32,
}

/// Sliding-window velocity estimator
#[derive(Debug, Clone)]
pub struct VelocityEstimator {
    samples: SmallVec<[VelocitySample; DEFAULT_CAPACITY]>,
    capacity: usize,
    window: usize,
}

impl VelocityEstimator {
    pub fn new() -> Self {
        Self::with_window(DEFAULT_CAPACITY, DEFAULT_WINDOW)
    }

    /// Estimator keeping `capacity` samples, differentiating over the last `window`
    pub fn with_window(capacity: usize, window: usize) -> Self {
        let window = window.max(2);
        Self {
            samples: SmallVec::new(),
            capacity: capacity.max(window),
            window,
        }
    }

    /// Drop all samples
    pub fn reset(&mut self) {
        self.samples.clear();
    }

    /// Record `value` at `time_ms` on the caller's clock
    pub fn add_sample(&mut self, value: f32, time_ms: f64) {
        if self.samples.len() >= self.capacity {
            self.samples.remove(0);
        }
        self.samples.push(VelocitySample { time_ms, value });
    }

    /// Velocity in value units per millisecond.
    ///
    /// Zero with fewer than two samples or when no time has passed.
    pub fn velocity(&self) -> f32 {
        if self.samples.len() < 2 {
            return 0.0;
        }
        let recent = &self.samples[self.samples.len().saturating_sub(self.window)..];
        let (Some(first), Some(last)) = (recent.first(), recent.last()) else {
            return 0.0;
        };

        let dt = last.time_ms - first.time_ms;
        if dt <= 0.0 {
            return 0.0;
        }
        ((last.value - first.value) as f64 / dt) as f32
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[VelocitySample] {
        &self.samples
    }
}

impl Default for VelocityEstimator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Clock;

    #[test]
    fn test_needs_two_samples() {
        let mut estimator = VelocityEstimator::new();
        assert_eq!(estimator.velocity(), 0.0);
        estimator.add_sample(10.0, 0.0);
        assert_eq!(estimator.velocity(), 0.0);
        estimator.add_sample(20.0, 10.0);
        assert_eq!(estimator.velocity(), 1.0);
    }

    #[test]
    fn test_only_recent_samples_count() {
        let mut estimator = VelocityEstimator::new();
        // Slow drift followed by a sharp flick
        estimator.add_sample(0.0, 0.0);
        estimator.add_sample(1.0, 100.0);
        estimator.add_sample(2.0, 200.0);
        estimator.add_sample(3.0, 300.0);
        estimator.add_sample(13.0, 310.0);
        estimator.add_sample(23.0, 320.0);

        // (23 - 3) / (320 - 300)
        assert_eq!(estimator.velocity(), 1.0);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut estimator = VelocityEstimator::new();
        for i in 0..20 {
            estimator.add_sample(i as f32, i as f64);
        }
        assert_eq!(estimator.len(), DEFAULT_CAPACITY);
        assert_eq!(estimator.samples()[0].value, 12.0);
    }

    #[test]
    fn test_zero_time_span() {
        let mut estimator = VelocityEstimator::new();
        estimator.add_sample(10.0, 5.0);
        estimator.add_sample(40.0, 5.0);
        assert_eq!(estimator.velocity(), 0.0);
    }

    #[test]
    fn test_reset() {
        let mut estimator = VelocityEstimator::new();
        estimator.add_sample(10.0, 0.0);
        estimator.add_sample(40.0, 16.0);
        estimator.reset();
        assert!(estimator.is_empty());
        assert_eq!(estimator.velocity(), 0.0);
    }

    #[test]
    fn test_negative_velocity() {
        let mut estimator = VelocityEstimator::new();
        estimator.add_sample(50.0, 0.0);
        estimator.add_sample(40.0, 8.0);
        estimator.add_sample(30.0, 16.0);
        assert_eq!(estimator.velocity(), -1.25);
    }

    #[test]
    fn test_timestamps_come_from_caller() {
        let clock = crate::clock::ManualClock::new(1_000.0);
        let mut estimator = VelocityEstimator::new();
        estimator.add_sample(50.0, clock.now_ms());
        clock.advance(20.0);
        estimator.add_sample(60.0, clock.now_ms());

        assert_eq!(estimator.samples()[0].time_ms, 1_000.0);
        assert_eq!(estimator.velocity(), 0.5);
    }
}
