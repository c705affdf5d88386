//! Mutable per-broom state owned by the controller.

use glam::{Quat, Vec3};

use crate::{config::BroomConfig, gear::Gearbox, horizontal, levitation::Levitation};

/// Controller state, created when the controller attaches to a body.
#[derive(Clone, Debug)]
pub struct VehicleState {
    /// Gear selection and shift cooldown.
    pub gearbox: Gearbox,
    /// Horizontal speed along the heading (m/s). Zero on vertical gears.
    pub horizontal_speed: f32,
    /// Heading as a clockwise bearing (radians). Zero faces -Z.
    pub heading: f32,
    /// Height the vertical gears steer toward.
    pub target_height: f32,
    /// Height the stabilizer holds on horizontal gears.
    pub stable_height: f32,
    /// Whether the target height is locked.
    pub is_height_locked: bool,
    /// Idle levitation oscillator.
    pub levitation: Levitation,
    /// Ground within the grounded probe range.
    pub is_grounded: bool,
    /// Moved since the last frame, or being driven.
    pub is_moving: bool,
    /// Position at the end of the previous logic tick.
    pub last_position: Vec3,
    /// Cosmetic model tilt.
    pub tilt: Quat,
    /// Diagnostics from the most recent physics tick.
    pub last_physics: PhysicsCommands,
}

impl VehicleState {
    /// State for a broom at rest at `position`, facing `yaw`.
    pub fn new(position: Vec3, yaw: f32, config: &BroomConfig) -> Self {
        let height = config.clamp_height(position.y);
        Self {
            gearbox: Gearbox::default(),
            horizontal_speed: 0.0,
            heading: horizontal::yaw_to_heading(yaw),
            target_height: height,
            stable_height: height,
            is_height_locked: false,
            levitation: Levitation::default(),
            is_grounded: false,
            is_moving: false,
            last_position: position,
            tilt: Quat::IDENTITY,
            last_physics: PhysicsCommands::default(),
        }
    }

    /// Lock the target and stable heights to `height`.
    pub fn lock_height(&mut self, height: f32, config: &BroomConfig) {
        let height = config.clamp_height(height);
        self.target_height = height;
        self.stable_height = height;
        self.is_height_locked = true;
    }
}

/// Commands issued during one physics tick, kept for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PhysicsCommands {
    /// Vertical acceleration from ground hover, or sink when nothing is below.
    pub hover: f32,
    /// Horizontal velocity written to the body (X, Z).
    pub horizontal_velocity: [f32; 2],
    /// Vertical velocity written by the height lock.
    pub vertical_velocity: Option<f32>,
    /// Altitude-restoring acceleration.
    pub stabilization: f32,
    /// Levitation acceleration.
    pub levitation: f32,
}

impl PhysicsCommands {
    /// Sum of vertical accelerations commanded this tick.
    pub fn vertical_acceleration(&self) -> f32 {
        self.hover + self.stabilization + self.levitation
    }
}
