//! Broom systems: Avian3D adapters plus the logic and physics ticks.
//!
//! The logic tick runs in `PreUpdate` once input actions are updated, and the
//! physics tick in `FixedPreUpdate`, so a frame's logic always precedes its
//! fixed steps. Accelerations and impulses are applied as velocity changes.

use avian3d::prelude::*;
use bevy::prelude::*;
use broom_core::{BroomBody, ControllerEvent, GroundSensor, math};

use crate::components::{Broom, BroomControls, BroomModel, GameLayer};

/// Mass assumed for impulses when Avian has not computed one yet (kg).
const FALLBACK_MASS: f32 = 1.0;

/// A controller event, tagged with the broom that produced it.
#[derive(Message, Debug, Clone)]
pub struct BroomEvent {
    /// The broom entity.
    pub entity: Entity,
    /// What happened.
    pub event: ControllerEvent,
}

/// [`BroomBody`] over a broom's Avian components.
pub struct AvianBody<'a> {
    pub transform: &'a mut Transform,
    pub velocity: &'a mut LinearVelocity,
    /// Body mass, used to turn impulses into velocity changes.
    pub mass: f32,
    /// Fixed physics step, used to turn accelerations into velocity changes.
    pub dt: f32,
}

impl BroomBody for AvianBody<'_> {
    fn position(&self) -> Vec3 {
        self.transform.translation
    }

    fn linear_velocity(&self) -> Vec3 {
        self.velocity.0
    }

    fn yaw(&self) -> f32 {
        math::yaw_from_rotation(self.transform.rotation)
    }

    fn set_yaw(&mut self, yaw: f32) {
        self.transform.rotation = Quat::from_rotation_y(yaw);
    }

    fn set_horizontal_velocity(&mut self, x: f32, z: f32) {
        self.velocity.0.x = x;
        self.velocity.0.z = z;
    }

    fn set_vertical_velocity(&mut self, y: f32) {
        self.velocity.0.y = y;
    }

    fn apply_acceleration(&mut self, acceleration: Vec3) {
        self.velocity.0 += acceleration * self.dt;
    }

    fn apply_impulse(&mut self, impulse: Vec3) {
        self.velocity.0 += impulse / self.mass;
    }
}

/// Mass from Avian's computed mass, falling back when it is not usable yet.
pub fn body_mass(computed: Option<&ComputedMass>) -> f32 {
    computed
        .map(|mass| mass.value())
        .filter(|mass| *mass > 0.0 && mass.is_finite())
        .unwrap_or(FALLBACK_MASS)
}

/// [`GroundSensor`] casting rays against the ground layer.
pub struct SpatialGroundSensor<'a, 'w, 's> {
    spatial_query: &'a SpatialQuery<'w, 's>,
    filter: SpatialQueryFilter,
}

impl<'a, 'w, 's> SpatialGroundSensor<'a, 'w, 's> {
    /// A sensor for `entity` that ignores the entity's own colliders.
    pub fn new(spatial_query: &'a SpatialQuery<'w, 's>, entity: Entity) -> Self {
        let filter = SpatialQueryFilter::from_mask([GameLayer::Ground])
            .with_excluded_entities([entity]);
        Self {
            spatial_query,
            filter,
        }
    }
}

impl GroundSensor for SpatialGroundSensor<'_, '_, '_> {
    fn probe_downward(&self, origin: Vec3, max_distance: f32) -> Option<f32> {
        self.spatial_query
            .cast_ray(origin, Dir3::NEG_Y, max_distance, true, &self.filter)
            .map(|hit| hit.distance)
    }
}

/// Run the logic tick for every broom with this frame's controls.
#[allow(clippy::type_complexity)]
pub fn broom_logic_system(
    time: Res<Time>,
    fixed_time: Res<Time<Fixed>>,
    spatial_query: SpatialQuery,
    mut messages: MessageWriter<BroomEvent>,
    mut query: Query<(
        Entity,
        &mut Broom,
        &mut BroomControls,
        &mut Transform,
        &mut LinearVelocity,
        Option<&ComputedMass>,
    )>,
) {
    let now = time.elapsed_secs();
    let dt = time.delta_secs();

    for (entity, mut broom, mut controls, mut transform, mut velocity, mass) in &mut query {
        let sensor = SpatialGroundSensor::new(&spatial_query, entity);
        let mut body = AvianBody {
            transform: &mut *transform,
            velocity: &mut *velocity,
            mass: body_mass(mass),
            dt: fixed_time.timestep().as_secs_f32(),
        };

        let controller = broom.attach(&body);
        controller.logic_tick(&controls.0, &mut body, &sensor, now, dt);
        for event in controller.drain_events() {
            messages.write(BroomEvent { entity, event });
        }

        controls.0.clear_triggers();
    }
}

/// Apply the physics tick to every attached broom.
#[allow(clippy::type_complexity)]
pub fn broom_physics_system(
    time: Res<Time<Fixed>>,
    spatial_query: SpatialQuery,
    mut query: Query<(
        Entity,
        &mut Broom,
        &mut Transform,
        &mut LinearVelocity,
        Option<&ComputedMass>,
    )>,
) {
    let dt = time.delta_secs();

    for (entity, mut broom, mut transform, mut velocity, mass) in &mut query {
        let Some(controller) = broom.controller_mut() else {
            continue;
        };

        let sensor = SpatialGroundSensor::new(&spatial_query, entity);
        let mut body = AvianBody {
            transform: &mut *transform,
            velocity: &mut *velocity,
            mass: body_mass(mass),
            dt,
        };
        controller.physics_tick(&mut body, &sensor);
    }
}

/// Copy each broom's cosmetic tilt onto its model child.
pub fn apply_broom_model_tilt(
    brooms: Query<&Broom>,
    mut models: Query<(&ChildOf, &mut Transform), With<BroomModel>>,
) {
    for (child_of, mut transform) in &mut models {
        let Some(controller) = brooms.get(child_of.parent()).ok().and_then(Broom::controller)
        else {
            continue;
        };
        transform.rotation = controller.tilt();
    }
}
