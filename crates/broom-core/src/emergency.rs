//! Emergency controls, available in every gear.

use glam::Vec3;

use crate::{config::BroomConfig, input::ControlInput};

/// Multiplier on `lift_force` for the emergency impulse.
const EMERGENCY_LIFT_MULTIPLIER: f32 = 2.0;

/// What the emergency controls ask for this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EmergencyResponse {
    /// Upward impulse to apply, while the lift trigger is held.
    pub lift_impulse: Option<Vec3>,
    /// Lock the target height to the current height.
    pub lock_height: bool,
}

/// Upward impulse applied for each frame the lift trigger is held.
pub fn lift_impulse(config: &BroomConfig) -> Vec3 {
    Vec3::Y * config.lift_force * EMERGENCY_LIFT_MULTIPLIER
}

/// Evaluate the emergency triggers.
// TODO: rate-limit the held lift; at high frame rates it stacks very quickly.
pub fn evaluate(input: &ControlInput, config: &BroomConfig) -> EmergencyResponse {
    EmergencyResponse {
        lift_impulse: input.emergency_lift_held.then(|| lift_impulse(config)),
        lock_height: input.height_lock_pressed,
    }
}
