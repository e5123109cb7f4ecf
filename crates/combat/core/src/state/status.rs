//! Externally computed status inputs.
//!
//! The status system that applies and expires effects is a collaborator; the
//! combat core only folds the currently active set into the snapshot.

use bitflags::bitflags;

use crate::combat::ResistTable;

/// Stable identifier of a status effect definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusId(pub u16);

bitflags! {
    /// Action gates. In a snapshot the set bits are the *permitted* actions;
    /// on a status they are the actions the status *blocks*.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ActionGates: u8 {
        const ATTACK = 1 << 0;
        const CAST = 1 << 1;
        const BANDAGE = 1 << 2;
        const MOVE = 1 << 3;
    }
}

impl ActionGates {
    pub const fn can_attack(self) -> bool {
        self.contains(Self::ATTACK)
    }

    pub const fn can_cast(self) -> bool {
        self.contains(Self::CAST)
    }

    pub const fn can_bandage(self) -> bool {
        self.contains(Self::BANDAGE)
    }

    pub const fn can_move(self) -> bool {
        self.contains(Self::MOVE)
    }
}

/// One active status as seen by the combat core.
///
/// Multipliers follow `final = base * multiplier` (1.0 neutral, <1.0 faster).
/// Percent fields are whole percentage points.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ActiveStatus {
    pub id: StatusId,
    pub blocks: ActionGates,
    pub swing_multiplier: f32,
    pub cast_multiplier: f32,
    pub bandage_multiplier: f32,
    pub hit_delta_pct: i32,
    pub defense_delta_pct: i32,
    pub damage_increase_pct: i32,
    pub resist_pct: ResistTable<i32>,
    /// Forces the unarmed profile while active.
    pub disarms: bool,
    /// Stun-class: interrupts channels whose policy honours stuns.
    pub stun: bool,
}

impl ActiveStatus {
    pub fn new(id: StatusId) -> Self {
        Self {
            id,
            blocks: ActionGates::empty(),
            swing_multiplier: 1.0,
            cast_multiplier: 1.0,
            bandage_multiplier: 1.0,
            hit_delta_pct: 0,
            defense_delta_pct: 0,
            damage_increase_pct: 0,
            resist_pct: ResistTable::default(),
            disarms: false,
            stun: false,
        }
    }

    pub fn blocking(mut self, gates: ActionGates) -> Self {
        self.blocks |= gates;
        self
    }

    pub fn with_swing_multiplier(mut self, multiplier: f32) -> Self {
        self.swing_multiplier = multiplier;
        self
    }

    pub fn with_bandage_multiplier(mut self, multiplier: f32) -> Self {
        self.bandage_multiplier = multiplier;
        self
    }

    pub fn with_cast_multiplier(mut self, multiplier: f32) -> Self {
        self.cast_multiplier = multiplier;
        self
    }

    pub fn disarming(mut self) -> Self {
        self.disarms = true;
        self
    }

    /// Stun-class status: blocks everything and interrupts channels.
    pub fn stunning(mut self) -> Self {
        self.stun = true;
        self.blocks = ActionGates::all();
        self
    }
}

impl Default for ActiveStatus {
    fn default() -> Self {
        Self::new(StatusId(0))
    }
}
