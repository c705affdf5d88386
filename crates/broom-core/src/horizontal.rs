//! Horizontal locomotion for gears 1 and 4.
//!
//! Pure functions; the controller owns the state they update.

use glam::{Vec2, Vec3};

use crate::{config::BroomConfig, gear::GearMode, math};

/// Brake pedal position above which braking overrides the throttle.
pub const BRAKE_THRESHOLD: f32 = 0.1;

/// Advance the heading by the steering input.
///
/// Headings are bearings: they grow clockwise seen from above, so positive
/// steering turns right. Zero faces -Z.
pub fn steer(heading: f32, steering: f32, config: &BroomConfig, dt: f32) -> f32 {
    heading + steering * config.steering_sensitivity * dt
}

/// Body yaw (counter-clockwise about +Y) for a heading.
pub fn heading_to_yaw(heading: f32) -> f32 {
    -heading
}

/// Heading for a body yaw.
pub fn yaw_to_heading(yaw: f32) -> f32 {
    -yaw
}

/// Unit travel direction for a heading.
pub fn forward(heading: f32) -> Vec3 {
    math::forward_from_yaw(heading_to_yaw(heading))
}

/// Ease the horizontal speed toward the throttle target, or toward zero while braking.
pub fn update_speed(speed: f32, throttle: f32, brake: f32, config: &BroomConfig, dt: f32) -> f32 {
    if brake > BRAKE_THRESHOLD {
        math::lerp(speed, 0.0, brake * 2.0 * dt)
    } else {
        let target = throttle * config.max_speed;
        math::lerp(speed, target, config.acceleration * dt)
    }
}

/// Horizontal velocity (X, Z) commanded for a gear.
///
/// Backward travels against the heading; vertical gears command zero.
pub fn velocity(gear: GearMode, heading: f32, speed: f32) -> Vec2 {
    let sign = match gear {
        GearMode::Forward => 1.0,
        GearMode::Backward => -1.0,
        GearMode::Up | GearMode::Down => return Vec2::ZERO,
    };
    let forward = forward(heading);
    Vec2::new(forward.x, forward.z) * speed * sign
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_steering_right_turns_clockwise() {
        let config = BroomConfig::default();
        let heading = steer(0.0, 1.0, &config, 0.1);
        assert!((heading - 0.2).abs() < 1e-6);

        // Turning right from facing -Z swings the nose toward +X.
        assert!(forward(heading).x > 0.0);
        assert!(math::yaw_from_rotation(glam::Quat::from_rotation_y(heading_to_yaw(heading))) < 0.0);
    }

    #[test]
    fn test_speed_approaches_max_monotonically() {
        let config = BroomConfig::default();
        let mut speed = 0.0;
        for _ in 0..50 {
            let next = update_speed(speed, 1.0, 0.0, &config, 0.1);
            assert!(next >= speed);
            assert!(next <= config.max_speed);
            speed = next;
        }
        assert!(config.max_speed - speed < 1e-3, "speed {speed}");
    }

    #[test]
    fn test_brake_overrides_throttle() {
        let config = BroomConfig::default();
        let speed = update_speed(10.0, 1.0, 1.0, &config, 0.1);
        assert!((speed - 8.0).abs() < 1e-5);

        // A feathered brake under the threshold is ignored.
        let speed = update_speed(10.0, 1.0, 0.05, &config, 0.1);
        assert!(speed > 10.0);
    }

    #[test]
    fn test_large_dt_does_not_overshoot() {
        let config = BroomConfig::default();
        assert_eq!(update_speed(0.0, 1.0, 0.0, &config, 10.0), config.max_speed);
        assert_eq!(update_speed(12.0, 0.0, 1.0, &config, 10.0), 0.0);
    }

    #[test]
    fn test_velocity_per_gear() {
        let forward = velocity(GearMode::Forward, 0.0, 5.0);
        assert!(forward.abs_diff_eq(Vec2::new(0.0, -5.0), 1e-6));

        let backward = velocity(GearMode::Backward, 0.0, 5.0);
        assert!(backward.abs_diff_eq(Vec2::new(0.0, 5.0), 1e-6));

        assert_eq!(velocity(GearMode::Up, 0.0, 5.0), Vec2::ZERO);
        assert_eq!(velocity(GearMode::Down, 1.0, 5.0), Vec2::ZERO);
    }

    proptest! {
        #[test]
        fn prop_heading_change_follows_steering(
            steering in -1.0f32..=1.0,
            sensitivity in 0.0f32..10.0,
            dt in 0.0f32..0.2,
        ) {
            let config = BroomConfig { steering_sensitivity: sensitivity, ..Default::default() };
            let delta = steer(0.0, steering, &config, dt);
            let expected = steering * sensitivity * dt;
            prop_assert!((delta - expected).abs() < 1e-5);
            prop_assert!(delta * steering >= 0.0);
        }

        #[test]
        fn prop_speed_stays_between_current_and_target(
            speed in 0.0f32..40.0,
            throttle in 0.0f32..=1.0,
            dt in 0.0f32..1.0,
        ) {
            let config = BroomConfig::default();
            let target = throttle * config.max_speed;
            let next = update_speed(speed, throttle, 0.0, &config, dt);
            prop_assert!(next >= speed.min(target) - 1e-4);
            prop_assert!(next <= speed.max(target) + 1e-4);
        }
    }
}
