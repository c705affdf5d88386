//! Collaborators the controller drives but does not own.
//!
//! The host provides a rigid body (integrated by its own physics engine) and
//! a downward ground probe. Implementations exist for the Bevy/Avian
//! integration and for the flat reference world in [`crate::world`].

use glam::Vec3;

/// A downward distance sensor.
pub trait GroundSensor {
    /// Distance from `origin` to the nearest surface straight below, or `None`
    /// if nothing is hit within `max_distance`.
    fn probe_downward(&self, origin: Vec3, max_distance: f32) -> Option<f32>;
}

/// The rigid body the broom controls.
///
/// Acceleration and impulse commands accumulate until the host integrates
/// the body; velocity commands overwrite the named components immediately.
pub trait BroomBody {
    /// World position.
    fn position(&self) -> Vec3;

    /// Current linear velocity.
    fn linear_velocity(&self) -> Vec3;

    /// Rotation about the world up axis (radians). Zero faces -Z.
    fn yaw(&self) -> f32;

    /// Set the rotation about the world up axis.
    fn set_yaw(&mut self, yaw: f32);

    /// Overwrite the X and Z velocity components, keeping Y.
    fn set_horizontal_velocity(&mut self, x: f32, z: f32);

    /// Overwrite the Y velocity component, keeping X and Z.
    fn set_vertical_velocity(&mut self, y: f32);

    /// Add a mass-independent acceleration for this physics step.
    fn apply_acceleration(&mut self, acceleration: Vec3);

    /// Add an instantaneous change of momentum.
    fn apply_impulse(&mut self, impulse: Vec3);
}

/// A sensor that never finds ground.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoGround;

impl GroundSensor for NoGround {
    fn probe_downward(&self, _origin: Vec3, _max_distance: f32) -> Option<f32> {
        None
    }
}

/// A sensor that reports a fixed distance, clipped by the probe range.
#[derive(Clone, Copy, Debug)]
pub struct FixedGround(pub f32);

impl GroundSensor for FixedGround {
    fn probe_downward(&self, _origin: Vec3, max_distance: f32) -> Option<f32> {
        (self.0 >= 0.0 && self.0 <= max_distance).then_some(self.0)
    }
}
