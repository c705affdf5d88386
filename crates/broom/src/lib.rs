//! Bevy integration for the broom controller.
//!
//! [`BroomPlugin`] drives every entity carrying a [`Broom`] with the
//! engine-independent controller from `broom-core`: Avian3D supplies the rigid
//! body and the ground ray casts, and `leafwing-input-manager` supplies the
//! controls. The host adds Avian's `PhysicsPlugins` itself.
//!
//! ```ignore
//! app.add_plugins((PhysicsPlugins::default(), BroomPlugin::default()));
//! commands.spawn((
//!     broom_bundle(BroomConfig::default(), Transform::from_xyz(0.0, 2.0, 0.0)),
//!     default_broom_input_map(),
//! ));
//! ```

mod components;
mod debug;
mod input;
mod physics;

use bevy::prelude::*;
use leafwing_input_manager::{plugin::InputManagerSystem, prelude::*};

pub use broom_core;
pub use components::{Broom, BroomControls, BroomModel, GameLayer, broom_bundle};
pub use debug::{BroomDebugConfig, BroomDebugPlugin};
pub use input::{BroomAction, control_input, default_broom_input_map};
pub use physics::{AvianBody, BroomEvent, SpatialGroundSensor};

/// Plugin for broom locomotion.
pub struct BroomPlugin {
    /// Register [`BroomAction`] and refresh [`BroomControls`] from it. Hosts
    /// that script brooms directly can turn this off.
    pub input: bool,
}

impl Default for BroomPlugin {
    fn default() -> Self {
        Self { input: true }
    }
}

impl Plugin for BroomPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<BroomEvent>()
            .register_type::<BroomModel>()
            .add_systems(
                PreUpdate,
                physics::broom_logic_system.after(InputManagerSystem::Update),
            )
            .add_systems(FixedPreUpdate, physics::broom_physics_system)
            .add_systems(Update, physics::apply_broom_model_tilt);

        if self.input {
            app.add_plugins(InputManagerPlugin::<BroomAction>::default())
                .add_systems(
                    PreUpdate,
                    input::update_broom_controls
                        .after(InputManagerSystem::Update)
                        .before(physics::broom_logic_system),
                );
        }
    }
}
