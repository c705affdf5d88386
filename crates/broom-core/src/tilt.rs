//! Cosmetic lean of the visual model.

use glam::Quat;

use crate::config::BroomConfig;

/// Phase multiplier of the pitch wobble relative to the levitation timer.
const WOBBLE_RATE: f32 = 1.5;

/// Target model orientation for a steering input and levitation phase.
///
/// Rolls into the turn and pitches gently with the levitation bob.
pub fn target(steering: f32, levitation_timer: f32, config: &BroomConfig) -> Quat {
    let roll = (-steering * config.max_tilt_angle).to_radians();
    let pitch = ((levitation_timer * WOBBLE_RATE).sin() * config.levitation_tilt_angle).to_radians();
    Quat::from_rotation_x(pitch) * Quat::from_rotation_z(roll)
}

/// Ease the current orientation toward the target for this frame.
pub fn update(current: Quat, target: Quat, config: &BroomConfig, dt: f32) -> Quat {
    let t = (config.tilt_smoothness * dt).clamp(0.0, 1.0);
    current.lerp(target, t).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{EulerRot, Vec3};

    #[test]
    fn test_level_without_input() {
        let config = BroomConfig::default();
        let rotation = target(0.0, 0.0, &config);
        assert!(rotation.abs_diff_eq(Quat::IDENTITY, 1e-6));
    }

    #[test]
    fn test_full_right_rolls_thirty_degrees() {
        let config = BroomConfig::default();
        let rotation = target(1.0, 0.0, &config);
        let (_, _, roll) = rotation.to_euler(EulerRot::XYZ);
        assert!((roll + 30f32.to_radians()).abs() < 1e-4);

        // The right side of the model dips.
        assert!((rotation * Vec3::X).y < 0.0);
    }

    #[test]
    fn test_update_converges() {
        let config = BroomConfig::default();
        let goal = target(-1.0, 0.3, &config);
        let mut current = Quat::IDENTITY;
        for _ in 0..200 {
            current = update(current, goal, &config, 1.0 / 60.0);
        }
        assert!(current.abs_diff_eq(goal, 1e-3));
        assert!(current.is_normalized());
    }
}
