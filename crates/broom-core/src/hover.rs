//! Ground hover and airborne altitude stabilization.

use glam::Vec3;

use crate::{body::GroundSensor, config::BroomConfig};

/// Height error below which the stabilizer stays quiet (m).
pub const STABILIZATION_DEAD_BAND: f32 = 0.1;

/// Whether ground lies within the grounded probe range below `position`.
pub fn is_grounded(sensor: &impl GroundSensor, position: Vec3, config: &BroomConfig) -> bool {
    sensor
        .probe_downward(position, config.grounded_probe_distance())
        .is_some()
}

/// Upward hover acceleration at a given ground distance.
///
/// Fades linearly from `lift_force` at contact to zero at `hover_height`, and
/// turns into a downward pull beyond it.
pub fn lift(distance: f32, config: &BroomConfig) -> f32 {
    config.lift_force * (1.0 - distance / config.hover_height)
}

/// Vertical acceleration from the ground-hover model.
///
/// Lift when the broom is grounded and the hover probe hits, a constant sink
/// when the probe finds nothing, and zero when airborne over distant ground.
pub fn hover_acceleration(
    sensor: &impl GroundSensor,
    position: Vec3,
    grounded: bool,
    config: &BroomConfig,
) -> f32 {
    match sensor.probe_downward(position, config.hover_probe_distance()) {
        Some(distance) if grounded => lift(distance, config),
        Some(_) => 0.0,
        None => -config.airborne_sink_acceleration,
    }
}

/// Stable height to hold on horizontal gears: the current height minus the
/// levitation offset, clamped into the height bounds.
pub fn stable_height(height: f32, levitation_offset: f32, config: &BroomConfig) -> f32 {
    config.clamp_height(height - levitation_offset)
}

/// Altitude-restoring acceleration, or `None` inside the dead band.
pub fn stabilization(stable_height: f32, height: f32, config: &BroomConfig) -> Option<f32> {
    let error = stable_height - height;
    (error.abs() > STABILIZATION_DEAD_BAND).then(|| error * config.height_stabilization_force)
}
