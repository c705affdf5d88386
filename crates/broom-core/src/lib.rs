//! Locomotion control for a hovering broom.
//!
//! The controller turns per-frame analog controls (steering, throttle, brake)
//! and discrete triggers (gear shifts, emergency lift, height lock) into
//! velocity and acceleration commands for a rigid body that some external
//! physics engine integrates. Four gears select the movement model:
//!
//! | Gear | Model |
//! |---|---|
//! | 1 Forward | steered travel along the heading, ground hover, altitude hold |
//! | 2 Up | proportional climb toward a rising target height |
//! | 3 Down | proportional descent toward a falling target height |
//! | 4 Backward | as gear 1, against the heading |
//!
//! Nothing here depends on an engine. The host implements [`BroomBody`] and
//! [`GroundSensor`], calls [`BroomController::logic_tick`] once per frame and
//! [`BroomController::physics_tick`] once per fixed physics step.
//! [`world::FlatWorld`] is a self-contained host used for tuning and tests.

pub mod body;
pub mod config;
pub mod controller;
pub mod emergency;
pub mod error;
pub mod events;
pub mod gear;
pub mod horizontal;
pub mod hover;
pub mod input;
pub mod levitation;
pub mod math;
pub mod state;
pub mod telemetry;
pub mod tilt;
pub mod vertical;
pub mod world;

pub use body::{BroomBody, GroundSensor};
pub use config::BroomConfig;
pub use controller::BroomController;
pub use error::{ConfigError, Result};
pub use events::ControllerEvent;
pub use gear::{GearKind, GearMode, ShiftOutcome, ShiftRejection};
pub use input::ControlInput;
pub use state::{PhysicsCommands, VehicleState};
