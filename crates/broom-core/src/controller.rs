//! The broom controller: turns control input into body commands.
//!
//! Two entry points drive it each frame. [`BroomController::logic_tick`] runs
//! once per rendered frame with that frame's input and updates the gear,
//! heading, speed and height bookkeeping. [`BroomController::physics_tick`]
//! runs at the fixed physics rate and writes velocities and accelerations to
//! the body. The logic tick of a frame always runs before its physics ticks.

use std::collections::VecDeque;

use glam::{Quat, Vec3};
use tracing::{debug, info, trace};

use crate::{
    body::{BroomBody, GroundSensor},
    config::BroomConfig,
    emergency,
    events::ControllerEvent,
    gear::{GearMode, ShiftOutcome},
    horizontal, hover,
    input::ControlInput,
    levitation,
    state::{PhysicsCommands, VehicleState},
    tilt, vertical,
};

/// Events kept when the host never drains them; the oldest are dropped first.
const MAX_PENDING_EVENTS: usize = 256;

/// Locomotion controller for one broom.
#[derive(Clone, Debug)]
pub struct BroomController {
    config: BroomConfig,
    state: VehicleState,
    events: VecDeque<ControllerEvent>,
}

impl BroomController {
    /// Attach a controller to a body, starting in gear 1 at the body's
    /// current height and heading.
    ///
    /// `config` is expected to have passed [`BroomConfig::validate`].
    pub fn new(config: BroomConfig, body: &impl BroomBody) -> Self {
        let state = VehicleState::new(body.position(), body.yaw(), &config);
        Self {
            config,
            state,
            events: VecDeque::new(),
        }
    }

    /// Advance the controller by one frame of input.
    pub fn logic_tick(
        &mut self,
        input: &ControlInput,
        body: &mut impl BroomBody,
        sensor: &impl GroundSensor,
        now: f32,
        dt: f32,
    ) {
        let input = input.sanitized();
        let position = body.position();

        self.apply_steering(&input, body, dt);
        self.apply_throttle(&input, dt);
        self.apply_emergency_controls(&input, body, position);

        self.state.is_grounded = hover::is_grounded(sensor, position, &self.config);

        for index in input.requested_gears() {
            self.request_shift(index, now, position.y);
        }

        self.update_heights(&input, position, dt);

        self.state.is_moving = levitation::is_moving(
            self.state.last_position,
            position,
            self.state.horizontal_speed,
        );
        self.state.last_position = position;
        self.state
            .levitation
            .update(self.state.is_moving, &self.config, dt);

        trace!(
            gear = self.gear().index(),
            speed = self.state.horizontal_speed,
            target = self.state.target_height,
            stable = self.state.stable_height,
            grounded = self.state.is_grounded,
            "Broom logic tick"
        );
    }

    /// Apply this physics step's commands to the body.
    pub fn physics_tick(&mut self, body: &mut impl BroomBody, sensor: &impl GroundSensor) {
        let gear = self.gear();
        let position = body.position();
        let mut commands = PhysicsCommands::default();

        if gear.is_horizontal() {
            commands.hover = hover::hover_acceleration(
                sensor,
                position,
                self.state.is_grounded,
                &self.config,
            );
        }

        let velocity = horizontal::velocity(gear, self.state.heading, self.state.horizontal_speed);
        body.set_horizontal_velocity(velocity.x, velocity.y);
        commands.horizontal_velocity = velocity.to_array();

        if gear.is_vertical() {
            let vy = vertical::lock_velocity(self.state.target_height, position.y, &self.config);
            body.set_vertical_velocity(vy);
            commands.vertical_velocity = Some(vy);
        }

        if gear.is_horizontal() && !self.state.is_grounded {
            commands.stabilization =
                hover::stabilization(self.state.stable_height, position.y, &self.config)
                    .unwrap_or(0.0);
            commands.levitation = self.state.levitation.acceleration();
        }

        let acceleration = commands.vertical_acceleration();
        if acceleration != 0.0 {
            body.apply_acceleration(Vec3::Y * acceleration);
        }
        self.state.last_physics = commands;
    }

    /// Request a shift to the gear with the given 1-based index.
    ///
    /// Returns whether the gear changed. Rejected requests leave the state
    /// untouched apart from recording a [`ControllerEvent::ShiftRejected`].
    pub fn request_shift(&mut self, gear: u8, now: f32, height: f32) -> bool {
        let outcome = self.state.gearbox.request(
            gear,
            now,
            self.config.max_gear,
            self.config.gear_shift_cooldown,
        );

        match outcome {
            ShiftOutcome::Shifted { from, to } => {
                info!("Broom shifted to gear {to}");
                self.push_event(ControllerEvent::GearShifted {
                    from,
                    to,
                    time: now,
                });

                self.state.horizontal_speed = 0.0;
                if to.is_vertical() {
                    self.lock_height(height);
                } else {
                    self.state.is_height_locked = false;
                    self.state.stable_height = self.config.clamp_height(height);
                }
                true
            }
            ShiftOutcome::Rejected(reason) => {
                debug!("Broom shift to gear {gear} ignored: {reason}");
                self.push_event(ControllerEvent::ShiftRejected {
                    requested: gear,
                    reason,
                });
                false
            }
        }
    }

    /// Lock the target and stable heights to `height` without changing gear.
    pub fn lock_height(&mut self, height: f32) {
        self.state.lock_height(height, &self.config);
        info!("Broom height locked at {:.2}", self.state.target_height);
        self.push_event(ControllerEvent::HeightLocked {
            height: self.state.target_height,
        });
    }

    /// Take all events recorded since the last drain, oldest first.
    pub fn drain_events(&mut self) -> impl Iterator<Item = ControllerEvent> + '_ {
        self.events.drain(..)
    }

    /// Events recorded since the last drain, oldest first.
    pub fn pending_events(&self) -> impl Iterator<Item = &ControllerEvent> {
        self.events.iter()
    }

    pub fn config(&self) -> &BroomConfig {
        &self.config
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    pub fn speed(&self) -> f32 {
        self.state.horizontal_speed
    }

    pub fn is_grounded(&self) -> bool {
        self.state.is_grounded
    }

    pub fn gear(&self) -> GearMode {
        self.state.gearbox.current()
    }

    pub fn gear_description(&self) -> &'static str {
        self.gear().description()
    }

    /// Body height as of the most recent logic tick. Hosts wanting the live
    /// height read it from their body.
    pub fn observed_height(&self) -> f32 {
        self.state.last_position.y
    }

    pub fn target_height(&self) -> f32 {
        self.state.target_height
    }

    pub fn stable_height(&self) -> f32 {
        self.state.stable_height
    }

    pub fn is_moving(&self) -> bool {
        self.state.is_moving
    }

    pub fn is_height_locked(&self) -> bool {
        self.state.is_height_locked
    }

    pub fn levitation_offset(&self) -> f32 {
        self.state.levitation.current_offset
    }

    /// Heading as a clockwise bearing in radians; zero faces -Z.
    pub fn heading(&self) -> f32 {
        self.state.heading
    }

    /// Unit travel direction for gear 1.
    pub fn forward(&self) -> Vec3 {
        horizontal::forward(self.state.heading)
    }

    /// Orientation of the visual model relative to the body.
    pub fn tilt(&self) -> Quat {
        self.state.tilt
    }

    fn apply_steering(&mut self, input: &ControlInput, body: &mut impl BroomBody, dt: f32) {
        if self.gear().is_horizontal() {
            self.state.heading =
                horizontal::steer(self.state.heading, input.steering, &self.config, dt);
            body.set_yaw(horizontal::heading_to_yaw(self.state.heading));
        }

        let target = tilt::target(input.steering, self.state.levitation.timer, &self.config);
        self.state.tilt = tilt::update(self.state.tilt, target, &self.config, dt);
    }

    fn apply_throttle(&mut self, input: &ControlInput, dt: f32) {
        self.state.horizontal_speed = if self.gear().is_horizontal() {
            horizontal::update_speed(
                self.state.horizontal_speed,
                input.throttle,
                input.brake,
                &self.config,
                dt,
            )
        } else {
            0.0
        };
    }

    fn apply_emergency_controls(
        &mut self,
        input: &ControlInput,
        body: &mut impl BroomBody,
        position: Vec3,
    ) {
        let response = emergency::evaluate(input, &self.config);
        if let Some(impulse) = response.lift_impulse {
            body.apply_impulse(impulse);
            trace!("Broom emergency lift {impulse}");
            self.push_event(ControllerEvent::EmergencyLift {
                impulse: impulse.length(),
            });
        }
        if response.lock_height {
            self.lock_height(position.y);
        }
    }

    fn update_heights(&mut self, input: &ControlInput, position: Vec3, dt: f32) {
        let gear = self.gear();
        if gear.is_vertical() {
            self.state.target_height = vertical::update_target_height(
                self.state.target_height,
                gear,
                input.throttle,
                input.brake,
                &self.config,
                dt,
            );
            self.state.stable_height = self.state.target_height;
        } else {
            self.state.stable_height = hover::stable_height(
                position.y,
                self.state.levitation.current_offset,
                &self.config,
            );
        }
    }

    fn push_event(&mut self, event: ControllerEvent) {
        if self.events.len() == MAX_PENDING_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{FixedGround, NoGround};
    use crate::gear::ShiftRejection;

    /// Body that records the commands it receives without integrating them.
    #[derive(Debug, Default)]
    struct RecordingBody {
        position: Vec3,
        velocity: Vec3,
        yaw: f32,
        accelerations: Vec<Vec3>,
        impulses: Vec<Vec3>,
    }

    impl RecordingBody {
        fn at_height(y: f32) -> Self {
            Self {
                position: Vec3::new(0.0, y, 0.0),
                ..Default::default()
            }
        }
    }

    impl BroomBody for RecordingBody {
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
            self.accelerations.push(acceleration);
        }

        fn apply_impulse(&mut self, impulse: Vec3) {
            self.impulses.push(impulse);
        }
    }

    fn controller_at(y: f32) -> (BroomController, RecordingBody) {
        let body = RecordingBody::at_height(y);
        (BroomController::new(BroomConfig::default(), &body), body)
    }

    #[test]
    fn test_initial_state() {
        let (controller, _) = controller_at(10.0);
        assert_eq!(controller.gear(), GearMode::Forward);
        assert_eq!(controller.gear_description(), "Forward");
        assert_eq!(controller.target_height(), 10.0);
        assert_eq!(controller.stable_height(), 10.0);
        assert_eq!(controller.speed(), 0.0);
        assert!(!controller.is_height_locked());
    }

    #[test]
    fn test_shift_into_vertical_locks_height() {
        let (mut controller, mut body) = controller_at(12.5);
        let throttle = ControlInput::new().with_throttle(1.0);
        controller.logic_tick(&throttle, &mut body, &NoGround, 0.0, 0.1);
        assert!(controller.speed() > 0.0);

        let shift = ControlInput::new().with_shift(GearMode::Up);
        controller.logic_tick(&shift, &mut body, &NoGround, 1.0, 0.1);

        assert_eq!(controller.gear(), GearMode::Up);
        assert_eq!(controller.speed(), 0.0);
        assert!(controller.is_height_locked());
        assert_eq!(controller.target_height(), 12.5);
        assert_eq!(controller.stable_height(), 12.5);

        let events: Vec<_> = controller.drain_events().collect();
        assert!(matches!(
            events[0],
            ControllerEvent::GearShifted {
                from: GearMode::Forward,
                to: GearMode::Up,
                ..
            }
        ));
        assert!(matches!(events[1], ControllerEvent::HeightLocked { .. }));
        assert_eq!(controller.pending_events().count(), 0);
    }

    #[test]
    fn test_shift_back_to_horizontal_unlocks() {
        let (mut controller, mut body) = controller_at(8.0);
        assert!(controller.request_shift(3, 0.0, 8.0));
        body.position.y = 6.0;
        assert!(controller.request_shift(4, 1.0, 6.0));
        assert!(!controller.is_height_locked());
        assert_eq!(controller.stable_height(), 6.0);
        assert_eq!(controller.gear(), GearMode::Backward);
    }

    #[test]
    fn test_shift_inside_cooldown_is_ignored() {
        let (mut controller, _) = controller_at(10.0);
        assert!(controller.request_shift(2, 5.0, 10.0));
        assert!(!controller.request_shift(3, 5.2, 10.0));
        assert_eq!(controller.gear(), GearMode::Up);
        assert!(controller.pending_events().any(|e| matches!(
            e,
            ControllerEvent::ShiftRejected {
                requested: 3,
                reason: ShiftRejection::CoolingDown { .. }
            }
        )));
    }

    #[test]
    fn test_simultaneous_shifts_take_lowest_gear() {
        let (mut controller, mut body) = controller_at(10.0);
        let input = ControlInput::new()
            .with_shift(GearMode::Backward)
            .with_shift(GearMode::Down);
        controller.logic_tick(&input, &mut body, &NoGround, 0.0, 0.016);
        assert_eq!(controller.gear(), GearMode::Down);
    }

    #[test]
    fn test_max_gear_limits_shifts() {
        let body = RecordingBody::at_height(10.0);
        let config = BroomConfig {
            max_gear: 2,
            ..Default::default()
        };
        let mut controller = BroomController::new(config, &body);
        assert!(!controller.request_shift(4, 0.0, 10.0));
        assert!(controller.request_shift(2, 0.0, 10.0));
    }

    #[test]
    fn test_height_lock_is_idempotent() {
        let (mut controller, mut body) = controller_at(7.0);
        let lock = ControlInput::new().with_height_lock(true);
        controller.logic_tick(&lock, &mut body, &NoGround, 0.0, 0.016);
        let first = (controller.target_height(), controller.is_height_locked());
        controller.logic_tick(&lock, &mut body, &NoGround, 0.016, 0.016);
        let second = (controller.target_height(), controller.is_height_locked());
        assert_eq!(first, second);
        assert_eq!(first, (7.0, true));
        assert_eq!(controller.gear(), GearMode::Forward);
    }

    #[test]
    fn test_steering_rotates_body_on_horizontal_gears_only() {
        let (mut controller, mut body) = controller_at(10.0);
        let right = ControlInput::new().with_steering(1.0);
        controller.logic_tick(&right, &mut body, &NoGround, 0.0, 0.1);
        assert!((controller.heading() - 0.2).abs() < 1e-6);
        assert!((body.yaw + 0.2).abs() < 1e-6);

        controller.request_shift(2, 0.0, 10.0);
        controller.logic_tick(&right, &mut body, &NoGround, 0.1, 0.1);
        assert!((controller.heading() - 0.2).abs() < 1e-6);
        // The model still leans.
        assert!(!controller.tilt().abs_diff_eq(Quat::IDENTITY, 1e-4));
    }

    #[test]
    fn test_vertical_gear_climbs_and_commands_velocity() {
        let (mut controller, mut body) = controller_at(10.0);
        controller.request_shift(2, 0.0, 10.0);
        let climb = ControlInput::new().with_throttle(1.0);
        let dt = 0.1;
        for i in 0..20 {
            let before = controller.target_height();
            controller.logic_tick(&climb, &mut body, &NoGround, 1.0 + i as f32 * dt, dt);
            assert!((controller.target_height() - before - 0.8).abs() < 1e-4);
            assert_eq!(controller.speed(), 0.0);
        }

        controller.physics_tick(&mut body, &NoGround);
        // Target is 16 m above the body, so the command saturates.
        assert_eq!(body.velocity.y, 10.0);
        assert_eq!(body.velocity.x, 0.0);
        assert_eq!(body.velocity.z, 0.0);
        // No hover, sink, stabilization or levitation on vertical gears.
        assert!(body.accelerations.is_empty());
    }

    #[test]
    fn test_target_height_bounded_under_max_throttle() {
        let (mut controller, mut body) = controller_at(10.0);
        controller.request_shift(2, 0.0, 10.0);
        let climb = ControlInput::new().with_throttle(1.0);
        for i in 0..1000 {
            controller.logic_tick(&climb, &mut body, &NoGround, i as f32 * 0.1, 0.1);
            assert!(controller.target_height() <= 50.0);
        }
        assert_eq!(controller.target_height(), 50.0);
    }

    #[test]
    fn test_forward_gear_sets_horizontal_velocity() {
        let (mut controller, mut body) = controller_at(10.0);
        let input = ControlInput::new().with_throttle(1.0);
        for i in 0..50 {
            controller.logic_tick(&input, &mut body, &NoGround, i as f32 * 0.1, 0.1);
        }
        body.velocity.y = -3.0;
        controller.physics_tick(&mut body, &NoGround);
        assert!((body.velocity.z + controller.speed()).abs() < 1e-4);
        assert!(body.velocity.x.abs() < 1e-4);
        // Vertical velocity is left to gravity and forces.
        assert_eq!(body.velocity.y, -3.0);
    }

    #[test]
    fn test_grounded_hover_applies_lift_only() {
        let (mut controller, mut body) = controller_at(1.0);
        let ground = FixedGround(1.0);
        controller.logic_tick(&ControlInput::new(), &mut body, &ground, 0.0, 0.016);
        assert!(controller.is_grounded());

        controller.physics_tick(&mut body, &ground);
        let commands = controller.state().last_physics;
        assert!((commands.hover - 7.5).abs() < 1e-5);
        assert_eq!(commands.stabilization, 0.0);
        assert_eq!(commands.levitation, 0.0);
        assert_eq!(body.accelerations.len(), 1);
    }

    #[test]
    fn test_no_ground_sinks_and_levitates() {
        let (mut controller, mut body) = controller_at(20.0);
        // Advance the oscillator so the offset is non-zero.
        let idle = ControlInput::new();
        for i in 0..60 {
            let now = i as f32 / 60.0;
            controller.logic_tick(&idle, &mut body, &NoGround, now, 1.0 / 60.0);
        }
        assert!(!controller.is_grounded());
        controller.physics_tick(&mut body, &NoGround);
        let commands = controller.state().last_physics;
        assert_eq!(commands.hover, -0.5);
        assert!(commands.levitation != 0.0);
        assert!((commands.levitation - controller.levitation_offset() * 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_emergency_lift_every_held_frame() {
        let (mut controller, mut body) = controller_at(10.0);
        let lift = ControlInput::new().with_emergency_lift(true);
        for i in 0..3 {
            controller.logic_tick(&lift, &mut body, &NoGround, i as f32 * 0.016, 0.016);
        }
        assert_eq!(body.impulses, vec![Vec3::new(0.0, 30.0, 0.0); 3]);

        controller.logic_tick(&ControlInput::new(), &mut body, &NoGround, 0.1, 0.016);
        assert_eq!(body.impulses.len(), 3);
    }

    #[test]
    fn test_undrained_events_are_bounded() {
        let (mut controller, mut body) = controller_at(10.0);
        let lift = ControlInput::new().with_emergency_lift(true);
        for i in 0..1000 {
            controller.logic_tick(&lift, &mut body, &NoGround, i as f32 * 0.016, 0.016);
        }
        assert_eq!(controller.pending_events().count(), MAX_PENDING_EVENTS);
    }

    #[test]
    fn test_movement_detection() {
        let (mut controller, mut body) = controller_at(10.0);
        controller.logic_tick(&ControlInput::new(), &mut body, &NoGround, 0.0, 0.016);
        assert!(!controller.is_moving());

        body.position.x += 0.5;
        controller.logic_tick(&ControlInput::new(), &mut body, &NoGround, 0.016, 0.016);
        assert!(controller.is_moving());
        assert_eq!(controller.observed_height(), 10.0);

        body.position.y = 12.0;
        assert_eq!(controller.observed_height(), 10.0);
        controller.logic_tick(&ControlInput::new(), &mut body, &NoGround, 0.032, 0.016);
        assert_eq!(controller.observed_height(), 12.0);
    }

    #[test]
    fn test_unvalidated_height_bounds_do_not_panic() {
        let body = RecordingBody::at_height(10.0);
        let inverted = BroomConfig {
            min_height: 60.0,
            max_height: 50.0,
            ..BroomConfig::default()
        };
        let mut controller = BroomController::new(inverted, &body);
        assert_eq!(controller.target_height(), 50.0);

        let mut body = body;
        controller.request_shift(2, 0.0, 10.0);
        controller.logic_tick(&ControlInput::new().with_throttle(1.0), &mut body, &NoGround, 1.0, 0.1);
        controller.physics_tick(&mut body, &NoGround);
        assert_eq!(controller.target_height(), 50.0);
        assert!(body.velocity.y.is_finite());

        let nan_max = BroomConfig {
            max_height: f32::NAN,
            ..BroomConfig::default()
        };
        let controller = BroomController::new(nan_max, &body);
        assert_eq!(controller.target_height(), 10.0);
    }
}
