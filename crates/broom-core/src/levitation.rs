//! Idle levitation: a slow vertical bob, damped while the broom is moving.

use glam::Vec3;

use crate::{config::BroomConfig, math};

/// Positional change per frame above which the broom counts as moving (m).
pub const MOVEMENT_DISTANCE_THRESHOLD: f32 = 0.01;

/// Horizontal speed above which the broom counts as moving (m/s).
pub const MOVEMENT_SPEED_THRESHOLD: f32 = 0.1;

/// Gain turning the levitation offset into an acceleration.
const OFFSET_ACCELERATION_GAIN: f32 = 2.0;

/// Whether the broom moved since the last frame or is being driven.
pub fn is_moving(last_position: Vec3, position: Vec3, horizontal_speed: f32) -> bool {
    last_position.distance(position) > MOVEMENT_DISTANCE_THRESHOLD
        || horizontal_speed.abs() > MOVEMENT_SPEED_THRESHOLD
}

/// Oscillator state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Levitation {
    /// Phase, advanced by `levitation_frequency` per second.
    pub timer: f32,
    /// Smoothed offset (m).
    pub current_offset: f32,
    /// Offset the smoothed value eases toward (m).
    pub target_offset: f32,
}

impl Levitation {
    /// Advance the oscillator by one logic tick.
    pub fn update(&mut self, moving: bool, config: &BroomConfig, dt: f32) {
        self.timer += dt * config.levitation_frequency;

        let damping = if moving {
            config.movement_levitation_reduction
        } else {
            1.0
        };
        self.target_offset = self.timer.sin() * config.levitation_amplitude * damping;
        self.current_offset = math::lerp(
            self.current_offset,
            self.target_offset,
            config.levitation_smoothness * dt,
        );
    }

    /// Upward acceleration from the current offset.
    pub fn acceleration(&self) -> f32 {
        self.current_offset * OFFSET_ACCELERATION_GAIN
    }
}
