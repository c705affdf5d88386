//! Small numeric helpers shared by the movement models.

use glam::{Quat, Vec3};

/// Linear interpolation with the factor clamped to `[0, 1]`.
///
/// Used as frame-rate dependent exponential smoothing: `lerp(a, b, rate * dt)`.
pub fn lerp(current: f32, target: f32, t: f32) -> f32 {
    current + (target - current) * t.clamp(0.0, 1.0)
}

/// Forward direction for a yaw angle about +Y. Zero yaw faces -Z.
pub fn forward_from_yaw(yaw: f32) -> Vec3 {
    Quat::from_rotation_y(yaw) * Vec3::NEG_Z
}

/// Yaw angle of a rotation's forward direction, ignoring pitch and roll.
pub fn yaw_from_rotation(rotation: Quat) -> f32 {
    let forward = rotation * Vec3::NEG_Z;
    (-forward.x).atan2(-forward.z)
}
