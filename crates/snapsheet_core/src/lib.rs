//! Snapsheet Core
//!
//! Gesture arbitration and snap physics for a three-stop bottom sheet.
//!
//! # Features
//!
//! - **Snap Configuration**: Collapsed, half and expanded stops with rubber-band overtravel
//! - **Velocity Estimation**: Windowed finger velocity for flick detection
//! - **Boundary Arbitration**: Hands scroll input from nested content to the sheet
//!   only after the content hits an edge and the gesture keeps going
//! - **Sheet Controller**: The state machine tying drags, content scrolls and
//!   snap transitions together
//! - **Headless Host**: A recording host for tests and scenario replay
//!
//! The controller is single-threaded and cooperative. Hosts feed it input,
//! call [`SheetController::tick`] once per frame, and forward transition-end
//! notifications from their style system.

pub mod arbiter;
pub mod boundary;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod headless;
pub mod state;
pub mod surface;
pub mod velocity;

pub use arbiter::{BoundaryArbiter, ScrollOwner};
pub use boundary::{ScrollDirection, ScrollInfo, ScrollMetrics};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{SheetConfig, SheetTuning, SnapConfiguration, SNAP_TOLERANCE};
pub use controller::{SheetController, SheetOptions, SnapCallback};
pub use error::{Result, SheetError};
pub use events::SheetInput;
pub use headless::{HeadlessHandle, HeadlessHost, HeadlessSurface};
pub use state::{Boundary, BoundaryArmSession, DragSession, SheetEvent, SheetState};
pub use surface::{SheetHost, SheetSurface, SheetTransform};
pub use velocity::{VelocityEstimator, VelocitySample};

pub use snapsheet_animation::{Easing, TransitionLimits, TransitionTiming};
