//! The per-actor combat snapshot.

use super::{ProcProfile, WeaponProfile};
use crate::combat::{DamageType, ResistTable};
use crate::state::ActionGates;

/// Immutable bundle of every combat-relevant aggregate for one actor.
///
/// Produced only by [`super::recompute`]. All fractional fields are already
/// capped; consumers never re-clamp. Time multipliers follow
/// `final = base * multiplier`.
#[derive(Clone, Debug, PartialEq)]
pub struct CombatSnapshot {
    /// Permitted actions after status gating.
    pub gates: ActionGates,
    pub hit_delta: f32,
    pub defense_delta: f32,
    pub damage_increase: f32,
    /// Swing reduction from affixes, in `[0, cap]`.
    pub swing_affix_bonus: f32,
    /// Product of status swing multipliers, floored and ceiled.
    pub swing_status_multiplier: f32,
    pub cast_multiplier: f32,
    pub bandage_multiplier: f32,
    /// `clamp01(DEX / divisor) * dex_cap`.
    pub dex_bonus: f32,
    pub resists: ResistTable<f32>,
    pub weapon: WeaponProfile,
    pub procs: ProcProfile,
    /// The attacker lacks the weapon's required skill.
    pub unskilled: bool,
    /// A stun-class status is active.
    pub stunned: bool,
}

impl CombatSnapshot {
    pub fn resist(&self, channel: DamageType) -> f32 {
        self.resists.get(channel)
    }

    pub fn can_attack(&self) -> bool {
        self.gates.can_attack()
    }

    pub fn can_cast(&self) -> bool {
        self.gates.can_cast()
    }

    pub fn can_bandage(&self) -> bool {
        self.gates.can_bandage()
    }

    pub fn can_move(&self) -> bool {
        self.gates.can_move()
    }
}

impl Default for CombatSnapshot {
    /// Placeholder held before the first recompute. Permits nothing.
    fn default() -> Self {
        Self {
            gates: ActionGates::empty(),
            hit_delta: 0.0,
            defense_delta: 0.0,
            damage_increase: 0.0,
            swing_affix_bonus: 0.0,
            swing_status_multiplier: 1.0,
            cast_multiplier: 1.0,
            bandage_multiplier: 1.0,
            dex_bonus: 0.0,
            resists: ResistTable::splat(0.0),
            weapon: WeaponProfile::default(),
            procs: ProcProfile::default(),
            unskilled: false,
            stunned: false,
        }
    }
}
