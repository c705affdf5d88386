//! A minimal flat-ground world for tuning and tests.
//!
//! Integrates a single point body with semi-implicit Euler, constant gravity
//! and a ground plane, and drives a [`BroomController`] the way an engine
//! would: one logic tick per frame, then as many fixed physics steps as the
//! frame time covers.

use glam::Vec3;

use crate::{
    body::{BroomBody, GroundSensor},
    controller::BroomController,
    input::ControlInput,
};

/// Standard gravity (m/s²).
pub const GRAVITY: f32 = 9.81;

/// An infinite horizontal ground plane.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlatGround {
    /// World Y of the surface.
    pub height: f32,
}

impl GroundSensor for FlatGround {
    fn probe_downward(&self, origin: Vec3, max_distance: f32) -> Option<f32> {
        let distance = origin.y - self.height;
        (0.0..=max_distance).contains(&distance).then_some(distance)
    }
}

/// A point-mass body that records commands until the next integration step.
#[derive(Clone, Debug)]
pub struct SimBody {
    /// Mass (kg); only impulses depend on it.
    pub mass: f32,
    /// Distance from the body origin to its underside (m).
    pub clearance: f32,
    position: Vec3,
    velocity: Vec3,
    yaw: f32,
    pending_acceleration: Vec3,
}

impl SimBody {
    pub fn new(position: Vec3) -> Self {
        Self {
            mass: 1.0,
            clearance: 0.25,
            position,
            velocity: Vec3::ZERO,
            yaw: 0.0,
            pending_acceleration: Vec3::ZERO,
        }
    }

    #[must_use]
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    #[must_use]
    pub fn with_yaw(mut self, yaw: f32) -> Self {
        self.yaw = yaw;
        self
    }

    /// Integrate one step: accumulated accelerations plus gravity, then ground contact.
    pub fn integrate(&mut self, gravity: f32, ground: &FlatGround, dt: f32) {
        let acceleration = self.pending_acceleration - Vec3::Y * gravity;
        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;
        self.pending_acceleration = Vec3::ZERO;

        let floor = ground.height + self.clearance;
        if self.position.y < floor {
            self.position.y = floor;
            self.velocity.y = self.velocity.y.max(0.0);
        }
    }
}

impl BroomBody for SimBody {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn linear_velocity(&self) -> Vec3 {
        self.velocity
    }

    fn yaw(&self) -> f32 {
        self.yaw
    }

    fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw;
    }

    fn set_horizontal_velocity(&mut self, x: f32, z: f32) {
        self.velocity.x = x;
        self.velocity.z = z;
    }

    fn set_vertical_velocity(&mut self, y: f32) {
        self.velocity.y = y;
    }

    fn apply_acceleration(&mut self, acceleration: Vec3) {
        self.pending_acceleration += acceleration;
    }

    fn apply_impulse(&mut self, impulse: Vec3) {
        self.velocity += impulse / self.mass.max(0.001);
    }
}

/// Turns variable frame times into a whole number of fixed steps.
#[derive(Clone, Debug)]
pub struct FixedStepper {
    step: f32,
    accumulator: f32,
    max_steps_per_frame: u32,
}

impl FixedStepper {
    /// Stepper running at `rate_hz` fixed steps per second.
    pub fn new(rate_hz: f32) -> Self {
        Self {
            step: 1.0 / rate_hz.max(1.0),
            accumulator: 0.0,
            max_steps_per_frame: 8,
        }
    }

    /// Fixed step length (s).
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Add a frame's time and return how many fixed steps to run.
    ///
    /// Time beyond `max_steps_per_frame` steps is dropped so a long stall
    /// cannot snowball.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.max(0.0);
        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_steps_per_frame {
            self.accumulator -= self.step;
            steps += 1;
        }
        if steps == self.max_steps_per_frame {
            self.accumulator = self.accumulator.min(self.step);
        }
        steps
    }
}

/// Flat ground, one body and a clock.
#[derive(Clone, Debug)]
pub struct FlatWorld {
    pub ground: FlatGround,
    pub body: SimBody,
    pub gravity: f32,
    stepper: FixedStepper,
    time: f32,
}

impl FlatWorld {
    /// A world with ground at Y = 0 and a body at `position`.
    pub fn new(position: Vec3, physics_rate_hz: f32) -> Self {
        Self {
            ground: FlatGround::default(),
            body: SimBody::new(position),
            gravity: GRAVITY,
            stepper: FixedStepper::new(physics_rate_hz),
            time: 0.0,
        }
    }

    /// Elapsed logic time (s).
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Fixed physics step length (s).
    pub fn physics_step(&self) -> f32 {
        self.stepper.step()
    }

    /// Height of the body above the ground surface.
    pub fn altitude(&self) -> f32 {
        self.body.position().y - self.ground.height
    }

    /// Run one frame: a logic tick, then the fixed physics steps it covers.
    ///
    /// Returns the number of physics steps taken.
    pub fn run_frame(
        &mut self,
        controller: &mut BroomController,
        input: &ControlInput,
        frame_dt: f32,
    ) -> u32 {
        self.time += frame_dt;
        controller.logic_tick(input, &mut self.body, &self.ground, self.time, frame_dt);

        let steps = self.stepper.advance(frame_dt);
        let step = self.stepper.step();
        for _ in 0..steps {
            controller.physics_tick(&mut self.body, &self.ground);
            self.body.integrate(self.gravity, &self.ground, step);
        }
        steps
    }
}
