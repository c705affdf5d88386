//! Debug visualization of broom controller state.

use bevy::prelude::*;

use crate::components::Broom;

/// Length of the travel-direction arrow per m/s of speed.
const ARROW_SCALE: f32 = 0.25;

/// Half-width of the height markers (m).
const MARKER_HALF_WIDTH: f32 = 0.75;

/// Gizmo visualization settings.
#[derive(Resource, Clone, Debug, Default)]
pub struct BroomDebugConfig {
    /// Draw gizmos for every broom.
    pub enabled: bool,
}

/// Plugin drawing broom gizmos while [`BroomDebugConfig::enabled`] is set.
pub struct BroomDebugPlugin;

impl Plugin for BroomDebugPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BroomDebugConfig>()
            .add_systems(Update, draw_broom_gizmos.run_if(debug_enabled));
    }
}

/// Run condition: gizmos are enabled.
pub fn debug_enabled(config: Res<BroomDebugConfig>) -> bool {
    config.enabled
}

/// Draw the hover probe, target and stable heights, levitation offset and
/// travel direction of each broom.
pub fn draw_broom_gizmos(mut gizmos: Gizmos, brooms: Query<(&Broom, &Transform)>) {
    for (broom, transform) in &brooms {
        let Some(controller) = broom.controller() else {
            continue;
        };
        let config = controller.config();
        let position = transform.translation;

        // Hover probe: green while grounded.
        let probe_color = if controller.is_grounded() {
            Color::srgb(0.2, 0.9, 0.2)
        } else {
            Color::srgb(0.9, 0.2, 0.2)
        };
        gizmos.line(
            position,
            position - Vec3::Y * config.hover_probe_distance(),
            probe_color,
        );

        let at_height = |y: f32| Vec3::new(position.x, y, position.z);
        let marker = Vec3::X * MARKER_HALF_WIDTH;

        let target = at_height(controller.target_height());
        gizmos.line(target - marker, target + marker, Color::srgb(0.95, 0.85, 0.1));

        let stable = at_height(controller.stable_height());
        gizmos.line(stable - marker, stable + marker, Color::srgb(0.1, 0.8, 0.9));

        gizmos.line(
            stable,
            stable + Vec3::Y * controller.levitation_offset(),
            Color::srgb(0.8, 0.2, 0.8),
        );

        if controller.speed() > 0.0 {
            let direction = if controller.gear() == broom_core::GearMode::Backward {
                -controller.forward()
            } else {
                controller.forward()
            };
            gizmos.arrow(
                position,
                position + direction * controller.speed() * ARROW_SCALE,
                Color::srgb(0.2, 0.4, 1.0),
            );
        }
    }
}
