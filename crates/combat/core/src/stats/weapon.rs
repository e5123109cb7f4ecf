//! Resolved weapon and proc profiles.

use arrayvec::ArrayVec;

use crate::combat::DamageType;
use crate::config::CombatConfig;
use crate::env::{Handedness, SpellId, WeaponData};
use crate::state::{ItemHandle, SkillKind, VitalKind};

/// Where the active weapon profile came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WeaponSource {
    Equipped(ItemHandle),
    Unarmed,
    /// Unarmed because a status disarmed the actor.
    Disarmed,
}

/// The weapon an actor is currently swinging.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeaponProfile {
    pub source: WeaponSource,
    pub handedness: Handedness,
    pub damage_type: DamageType,
    pub min_damage: u32,
    pub max_damage: u32,
    pub swing_ms: u32,
    pub stamina_cost: u32,
    pub skill: SkillKind,
    pub required_skill: u16,
    pub ammo: Option<ItemHandle>,
    /// Effective reach, with the melee default already applied.
    pub range: f32,
}

impl WeaponProfile {
    pub fn from_data(source: WeaponSource, data: &WeaponData, melee_reach: f32) -> Self {
        Self {
            source,
            handedness: data.handedness,
            damage_type: data.damage_type,
            min_damage: data.min_damage,
            max_damage: data.max_damage.max(data.min_damage),
            swing_ms: data.swing_ms,
            stamina_cost: data.stamina_cost,
            skill: data.skill,
            required_skill: data.required_skill,
            ammo: data.ammo,
            range: data.range.unwrap_or(melee_reach),
        }
    }

    pub fn unarmed(config: &CombatConfig) -> Self {
        Self::from_data(WeaponSource::Unarmed, &config.unarmed, config.melee_reach)
    }

    pub fn is_ranged(&self) -> bool {
        self.ammo.is_some()
    }

    pub fn equipped_item(&self) -> Option<ItemHandle> {
        match self.source {
            WeaponSource::Equipped(handle) => Some(handle),
            _ => None,
        }
    }
}

impl Default for WeaponProfile {
    fn default() -> Self {
        Self::unarmed(&CombatConfig::default())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellProc {
    pub spell: SpellId,
    /// Independent Bernoulli chance per successful hit, in `[0, 1]`.
    pub chance: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LeachProc {
    pub vital: VitalKind,
    /// Fraction of final damage dealt restored to the attacker, in `[0, 1]`.
    pub fraction: f32,
}

/// On-hit effects. Sourced only from the active weapon instance.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcProfile {
    pub spells: ArrayVec<SpellProc, { CombatConfig::MAX_AFFIXES }>,
    pub leaches: ArrayVec<LeachProc, { CombatConfig::MAX_AFFIXES }>,
}

impl ProcProfile {
    pub fn is_empty(&self) -> bool {
        self.spells.is_empty() && self.leaches.is_empty()
    }
}
