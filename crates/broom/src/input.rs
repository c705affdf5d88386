//! Broom input actions.
//!
//! Declarative, rebindable bindings via `leafwing-input-manager`. Brooms that
//! carry an `ActionState<BroomAction>` have their [`BroomControls`] refreshed
//! from it every frame.

use bevy::prelude::*;
use broom_core::{ControlInput, GearMode};
use leafwing_input_manager::prelude::*;

use crate::components::BroomControls;

/// Actions for flying a broom.
#[derive(Actionlike, PartialEq, Eq, Hash, Clone, Copy, Debug, Reflect)]
pub enum BroomAction {
    /// Steering (-1 = left, 1 = right).
    #[actionlike(Axis)]
    Steer,
    /// Throttle pedal (W / right trigger).
    Throttle,
    /// Brake pedal (S / left trigger).
    Brake,
    /// Shift into gear 1.
    GearForward,
    /// Shift into gear 2.
    GearUp,
    /// Shift into gear 3.
    GearDown,
    /// Shift into gear 4.
    GearBackward,
    /// Emergency lift, applied while held (Space / south button).
    EmergencyLift,
    /// Lock the current height (X / west button).
    LockHeight,
}

impl BroomAction {
    /// The gear a shift action selects.
    pub fn gear(self) -> Option<GearMode> {
        match self {
            Self::GearForward => Some(GearMode::Forward),
            Self::GearUp => Some(GearMode::Up),
            Self::GearDown => Some(GearMode::Down),
            Self::GearBackward => Some(GearMode::Backward),
            _ => None,
        }
    }

    const SHIFTS: [BroomAction; 4] = [
        Self::GearForward,
        Self::GearUp,
        Self::GearDown,
        Self::GearBackward,
    ];
}

/// Create the default keyboard and gamepad input map for broom actions.
pub fn default_broom_input_map() -> InputMap<BroomAction> {
    InputMap::default()
        .with_axis(BroomAction::Steer, VirtualAxis::ad())
        .with_axis(BroomAction::Steer, GamepadControlAxis::LEFT_X)
        .with(BroomAction::Throttle, KeyCode::KeyW)
        .with(BroomAction::Throttle, GamepadButton::RightTrigger2)
        .with(BroomAction::Brake, KeyCode::KeyS)
        .with(BroomAction::Brake, GamepadButton::LeftTrigger2)
        .with(BroomAction::GearForward, KeyCode::Digit1)
        .with(BroomAction::GearUp, KeyCode::Digit2)
        .with(BroomAction::GearDown, KeyCode::Digit3)
        .with(BroomAction::GearBackward, KeyCode::Digit4)
        .with(BroomAction::EmergencyLift, KeyCode::Space)
        .with(BroomAction::EmergencyLift, GamepadButton::South)
        .with(BroomAction::LockHeight, KeyCode::KeyX)
        .with(BroomAction::LockHeight, GamepadButton::West)
}

/// Sample one frame of control input from an action state.
pub fn control_input(actions: &ActionState<BroomAction>) -> ControlInput {
    let mut input = ControlInput::new()
        .with_steering(actions.clamped_value(&BroomAction::Steer))
        .with_throttle(actions.button_value(&BroomAction::Throttle))
        .with_brake(actions.button_value(&BroomAction::Brake))
        .with_emergency_lift(actions.pressed(&BroomAction::EmergencyLift))
        .with_height_lock(actions.just_pressed(&BroomAction::LockHeight));

    for action in BroomAction::SHIFTS {
        if let Some(gear) = action.gear().filter(|_| actions.just_pressed(&action)) {
            input = input.with_shift(gear);
        }
    }
    input
}

/// Refresh broom controls from their action states.
pub fn update_broom_controls(mut query: Query<(&ActionState<BroomAction>, &mut BroomControls)>) {
    for (actions, mut controls) in &mut query {
        controls.0 = control_input(actions);
    }
}
