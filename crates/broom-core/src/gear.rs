//! Gears and the shift state machine.
//!
//! Each gear selects one locomotion model. Per-gear metadata lives in a fixed
//! table indexed by [`GearMode`], so every gear always has an entry.

use std::fmt;

/// Which family of movement models a gear drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GearKind {
    /// Steered travel along the heading at a held altitude.
    Horizontal,
    /// Climb or descent toward a locked target height.
    Vertical,
}

/// The four broom gears.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum GearMode {
    /// Gear 1: move along the heading.
    #[default]
    Forward = 1,
    /// Gear 2: climb toward an increasing target height.
    Up = 2,
    /// Gear 3: descend toward a decreasing target height.
    Down = 3,
    /// Gear 4: move against the heading.
    Backward = 4,
}

/// Static metadata for a gear.
#[derive(Clone, Copy, Debug)]
pub struct GearInfo {
    /// Movement model family.
    pub kind: GearKind,
    /// Short human-readable description.
    pub description: &'static str,
}

const GEAR_TABLE: [GearInfo; GearMode::COUNT as usize] = [
    GearInfo {
        kind: GearKind::Horizontal,
        description: "Forward",
    },
    GearInfo {
        kind: GearKind::Vertical,
        description: "Up",
    },
    GearInfo {
        kind: GearKind::Vertical,
        description: "Down",
    },
    GearInfo {
        kind: GearKind::Horizontal,
        description: "Backward",
    },
];

impl GearMode {
    /// Number of gears.
    pub const COUNT: u8 = 4;

    /// All gears in index order.
    pub const ALL: [GearMode; GearMode::COUNT as usize] =
        [Self::Forward, Self::Up, Self::Down, Self::Backward];

    /// Look up a gear by its 1-based index.
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(Self::Forward),
            2 => Some(Self::Up),
            3 => Some(Self::Down),
            4 => Some(Self::Backward),
            _ => None,
        }
    }

    /// The 1-based gear index.
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Static metadata for this gear.
    pub fn info(self) -> &'static GearInfo {
        &GEAR_TABLE[usize::from(self.index() - 1)]
    }

    pub fn kind(self) -> GearKind {
        self.info().kind
    }

    pub fn description(self) -> &'static str {
        self.info().description
    }

    pub fn is_horizontal(self) -> bool {
        self.kind() == GearKind::Horizontal
    }

    pub fn is_vertical(self) -> bool {
        self.kind() == GearKind::Vertical
    }
}

impl fmt::Display for GearMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.index(), self.description())
    }
}

/// Why a shift request was ignored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShiftRejection {
    /// The requested index is not a gear, or is above the configured maximum.
    OutOfRange {
        /// The index that was requested.
        requested: u8,
    },
    /// The requested gear is already engaged.
    AlreadyEngaged,
    /// The previous shift was too recent.
    CoolingDown {
        /// Seconds until shifting is allowed again.
        remaining: f32,
    },
}

impl fmt::Display for ShiftRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { requested } => write!(f, "gear {requested} is out of range"),
            Self::AlreadyEngaged => write!(f, "gear already engaged"),
            Self::CoolingDown { remaining } => {
                write!(f, "shift cooldown active for another {remaining:.2}s")
            }
        }
    }
}

/// Result of a shift request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShiftOutcome {
    /// The gear changed.
    Shifted {
        /// Gear before the shift.
        from: GearMode,
        /// Gear after the shift.
        to: GearMode,
    },
    /// The request was ignored.
    Rejected(ShiftRejection),
}

/// Gear selection with a shift cooldown.
#[derive(Clone, Debug, Default)]
pub struct Gearbox {
    current: GearMode,
    /// Time of the last accepted shift; `None` until the first one.
    last_shift_time: Option<f32>,
}

impl Gearbox {
    pub fn current(&self) -> GearMode {
        self.current
    }

    pub fn last_shift_time(&self) -> Option<f32> {
        self.last_shift_time
    }

    /// Request a shift to the gear with the given 1-based index.
    ///
    /// The shift applies only if the gear exists and is within `max_gear`, is
    /// not already engaged, and more than `cooldown` seconds have passed since
    /// the last accepted shift.
    pub fn request(&mut self, index: u8, now: f32, max_gear: u8, cooldown: f32) -> ShiftOutcome {
        let Some(target) = GearMode::from_index(index).filter(|g| g.index() <= max_gear) else {
            return ShiftOutcome::Rejected(ShiftRejection::OutOfRange { requested: index });
        };

        if target == self.current {
            return ShiftOutcome::Rejected(ShiftRejection::AlreadyEngaged);
        }

        if let Some(last) = self.last_shift_time {
            let elapsed = now - last;
            if elapsed <= cooldown {
                return ShiftOutcome::Rejected(ShiftRejection::CoolingDown {
                    remaining: cooldown - elapsed,
                });
            }
        }

        let from = self.current;
        self.current = target;
        self.last_shift_time = Some(now);
        ShiftOutcome::Shifted { from, to: target }
    }
}
