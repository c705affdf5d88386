//! Per-frame control input.

use crate::gear::GearMode;

/// One frame's worth of control input.
///
/// Axis values are clamped to their valid ranges by the setters and by
/// [`ControlInput::sanitized`]; the controller always sanitizes before use.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ControlInput {
    /// Steering (-1 = full left, 1 = full right).
    pub steering: f32,
    /// Throttle pedal (0 to 1).
    pub throttle: f32,
    /// Brake pedal (0 to 1).
    pub brake: f32,
    /// Shift requests for gears 1 to 4.
    pub shift: [bool; GearMode::COUNT as usize],
    /// Emergency lift trigger is held.
    pub emergency_lift_held: bool,
    /// Height-lock trigger went down this frame.
    pub height_lock_pressed: bool,
}

impl ControlInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_steering(mut self, steering: f32) -> Self {
        self.steering = clamp_axis(steering, -1.0);
        self
    }

    pub fn with_throttle(mut self, throttle: f32) -> Self {
        self.throttle = clamp_axis(throttle, 0.0);
        self
    }

    pub fn with_brake(mut self, brake: f32) -> Self {
        self.brake = clamp_axis(brake, 0.0);
        self
    }

    /// Request a shift into `gear`.
    pub fn with_shift(mut self, gear: GearMode) -> Self {
        self.shift[usize::from(gear.index() - 1)] = true;
        self
    }

    pub fn with_emergency_lift(mut self, held: bool) -> Self {
        self.emergency_lift_held = held;
        self
    }

    pub fn with_height_lock(mut self, pressed: bool) -> Self {
        self.height_lock_pressed = pressed;
        self
    }

    /// Gear indices with an active shift request, in ascending order.
    pub fn requested_gears(&self) -> impl Iterator<Item = u8> + '_ {
        self.shift
            .iter()
            .zip(1u8..)
            .filter_map(|(&requested, index)| requested.then_some(index))
    }

    /// Clear the one-shot triggers once a logic tick has consumed them.
    pub fn clear_triggers(&mut self) {
        self.shift = [false; GearMode::COUNT as usize];
        self.height_lock_pressed = false;
    }

    /// Copy with axes clamped into range and non-finite values zeroed.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        Self {
            steering: clamp_axis(self.steering, -1.0),
            throttle: clamp_axis(self.throttle, 0.0),
            brake: clamp_axis(self.brake, 0.0),
            ..*self
        }
    }
}

fn clamp_axis(value: f32, min: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, 1.0)
    } else {
        0.0
    }
}
