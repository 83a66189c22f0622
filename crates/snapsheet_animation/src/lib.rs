//! Snapsheet Animation
//!
//! Timing primitives for the sheet engine.
//!
//! # Features
//!
//! - **Easing**: CSS-compatible cubic bezier curves with a CSS serializer
//! - **Frame Scheduling**: At most one pending frame callback, plus cancellable timers
//! - **Snap Transitions**: Distance-scaled durations with a safety timeout so
//!   every transition completes exactly once

pub mod easing;
pub mod scheduler;
pub mod transition;

pub use easing::Easing;
pub use scheduler::{FrameScheduler, FrameTick, TimerId};
pub use transition::{StyleTarget, TransitionExecutor, TransitionLimits, TransitionTiming};
