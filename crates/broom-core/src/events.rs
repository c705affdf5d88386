//! Notable controller transitions, recorded for the host to observe.

use std::fmt;

use crate::gear::{GearMode, ShiftRejection};

/// Something the controller did that a host may want to react to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControllerEvent {
    /// A gear shift was accepted.
    GearShifted {
        /// Gear before the shift.
        from: GearMode,
        /// Gear after the shift.
        to: GearMode,
        /// Logic time of the shift (s).
        time: f32,
    },
    /// A shift request was ignored.
    ShiftRejected {
        /// The 1-based gear index that was requested.
        requested: u8,
        /// Why the shift was ignored.
        reason: ShiftRejection,
    },
    /// The target height was locked to the current height.
    HeightLocked {
        /// The locked height.
        height: f32,
    },
    /// An emergency lift impulse was applied.
    EmergencyLift {
        /// Impulse magnitude.
        impulse: f32,
    },
}

impl fmt::Display for ControllerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GearShifted { from, to, .. } => write!(f, "shifted {from} -> {to}"),
            Self::ShiftRejected { requested, reason } => {
                write!(f, "shift to gear {requested} ignored: {reason}")
            }
            Self::HeightLocked { height } => write!(f, "height locked at {height:.2}"),
            Self::EmergencyLift { impulse } => write!(f, "emergency lift ({impulse:.1})"),
        }
    }
}
