//! Broom component definitions.

use avian3d::prelude::*;
use bevy::prelude::*;
use broom_core::{BroomBody, BroomConfig, BroomController, ControlInput};

/// Collider dimensions of a broom body (full extents, m).
const BROOM_COLLIDER_SIZE: Vec3 = Vec3::new(0.4, 0.4, 1.8);

/// Collision layers for broom physics.
///
/// The ground probe only hits [`GameLayer::Ground`], never broom bodies.
#[derive(PhysicsLayer, Clone, Copy, Debug, Default)]
pub enum GameLayer {
    /// Ground and terrain surfaces.
    #[default]
    Ground,
    /// Broom bodies.
    Broom,
}

/// A broom driven by a [`BroomController`].
///
/// The controller is attached on the first logic tick, from the body's
/// position and yaw at that moment.
#[derive(Component)]
#[require(BroomControls)]
pub struct Broom {
    config: BroomConfig,
    controller: Option<BroomController>,
}

impl Broom {
    pub fn new(config: BroomConfig) -> Self {
        Self {
            config,
            controller: None,
        }
    }

    pub fn config(&self) -> &BroomConfig {
        &self.config
    }

    /// The controller, once attached.
    pub fn controller(&self) -> Option<&BroomController> {
        self.controller.as_ref()
    }

    pub(crate) fn controller_mut(&mut self) -> Option<&mut BroomController> {
        self.controller.as_mut()
    }

    /// The controller, attaching it to `body` first if needed.
    pub(crate) fn attach(&mut self, body: &impl BroomBody) -> &mut BroomController {
        let config = &self.config;
        self.controller.get_or_insert_with(|| {
            tracing::info!(
                "Broom attached at height {:.2} in gear {}",
                body.position().y,
                broom_core::GearMode::default()
            );
            BroomController::new(config.clone(), body)
        })
    }
}

impl Default for Broom {
    fn default() -> Self {
        Self::new(BroomConfig::default())
    }
}

/// Control input for the current frame.
///
/// Written by the leafwing input system for brooms with an
/// `ActionState<BroomAction>`, or by the host for scripted brooms. One-shot
/// triggers are cleared after each logic tick.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct BroomControls(pub ControlInput);

/// Marker for the visual model child that receives the cosmetic tilt.
#[derive(Component, Reflect, Default, Clone)]
#[reflect(Component)]
pub struct BroomModel;

/// Components for a dynamic broom body at `transform`.
pub fn broom_bundle(config: BroomConfig, transform: Transform) -> impl Bundle {
    (
        Broom::new(config),
        transform,
        RigidBody::Dynamic,
        Collider::cuboid(
            BROOM_COLLIDER_SIZE.x,
            BROOM_COLLIDER_SIZE.y,
            BROOM_COLLIDER_SIZE.z,
        ),
        LockedAxes::ROTATION_LOCKED,
        CollisionLayers::new([GameLayer::Broom], [GameLayer::Ground, GameLayer::Broom]),
        LinearVelocity::default(),
    )
}
