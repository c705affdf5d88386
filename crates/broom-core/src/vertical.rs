//! Vertical height-lock model for gears 2 and 3.

use crate::{config::BroomConfig, gear::GearMode};

/// Pedal position above which throttle or brake moves the target height.
pub const PEDAL_THRESHOLD: f32 = 0.1;

/// Move the target height with the pedals and clamp it into the height bounds.
///
/// On Up the throttle raises the target and the brake lowers it; Down swaps
/// the two. Horizontal gears leave the target unchanged (apart from clamping).
pub fn update_target_height(
    target: f32,
    gear: GearMode,
    throttle: f32,
    brake: f32,
    config: &BroomConfig,
    dt: f32,
) -> f32 {
    let (raise, lower) = match gear {
        GearMode::Up => (throttle, brake),
        GearMode::Down => (brake, throttle),
        GearMode::Forward | GearMode::Backward => (0.0, 0.0),
    };

    let mut target = target;
    if raise > PEDAL_THRESHOLD {
        target += raise * config.vertical_acceleration * dt;
    }
    if lower > PEDAL_THRESHOLD {
        target -= lower * config.vertical_acceleration * dt;
    }
    config.clamp_height(target)
}

/// Vertical velocity commanded by the proportional height lock.
pub fn lock_velocity(target: f32, height: f32, config: &BroomConfig) -> f32 {
    let limit = config.max_vertical_speed.abs();
    ((target - height) * config.vertical_acceleration)
        .max(-limit)
        .min(limit)
}
