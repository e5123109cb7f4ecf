//! Combat tunables.
//!
//! Every number the pipeline uses lives here so content can retune combat
//! without code changes. Percentages are whole points; durations are
//! milliseconds.

use crate::affix::AffixCountTable;
use crate::ai::BehaviorParams;
use crate::channel::InterruptPolicy;
use crate::combat::DamageType;
use crate::env::{Handedness, WeaponData};
use crate::state::{ItemHandle, SkillKind};

/// Hard caps applied after aggregation, in whole percentage points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CapTable {
    pub resist_pct: i32,
    pub hit_delta_pct: i32,
    pub defense_delta_pct: i32,
    pub damage_increase_pct: i32,
    pub swing_affix_pct: i32,
}

impl Default for CapTable {
    fn default() -> Self {
        Self {
            resist_pct: 70,
            hit_delta_pct: 45,
            defense_delta_pct: 45,
            damage_increase_pct: 100,
            swing_affix_pct: 60,
        }
    }
}

/// Swing timing: `max(floor, base * (1 - dex) * (1 - affix) * status)`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SwingConfig {
    /// Absolute minimum swing time. No modifier goes below it.
    pub floor_ms: u32,
    /// DEX at which the attribute bonus saturates.
    pub dex_divisor: u16,
    /// Largest swing reduction DEX alone can provide, as a fraction.
    pub dex_cap: f32,
    /// Bounds for the product of status swing multipliers.
    pub status_multiplier_min: f32,
    pub status_multiplier_max: f32,
}

impl Default for SwingConfig {
    fn default() -> Self {
        Self {
            floor_ms: 1250,
            dex_divisor: 150,
            dex_cap: 0.25,
            status_multiplier_min: 0.25,
            status_multiplier_max: 4.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WearConfig {
    /// Durability lost by the attacker's weapon per successful hit.
    pub weapon_per_hit: u16,
    /// Durability lost by one worn armor piece per damage packet received.
    pub armor_per_hit: u16,
}

impl Default for WearConfig {
    fn default() -> Self {
        Self {
            weapon_per_hit: 1,
            armor_per_hit: 1,
        }
    }
}

/// Bandage action parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BandageConfig {
    /// Consumable spent per attempt.
    pub item: ItemHandle,
    /// Self-application time before the bandage multiplier.
    pub self_ms: u32,
    /// Time when bandaging someone else.
    pub other_ms: u32,
    pub range: f32,
    pub heal_min: u32,
    pub heal_max: u32,
    /// Healing skill points per extra point healed.
    pub skill_divisor: u16,
    pub interrupts: InterruptPolicy,
}

impl Default for BandageConfig {
    fn default() -> Self {
        Self {
            item: ItemHandle(900),
            self_ms: 5000,
            other_ms: 3000,
            range: 2.0,
            heal_min: 10,
            heal_max: 20,
            skill_divisor: 5,
            interrupts: InterruptPolicy::ALWAYS,
        }
    }
}

/// Spell channeling parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpellcastConfig {
    /// Range used when a spell declares none.
    pub default_range: f32,
    pub interrupts: InterruptPolicy,
}

impl Default for SpellcastConfig {
    fn default() -> Self {
        Self {
            default_range: 10.0,
            interrupts: InterruptPolicy {
                on_damage: true,
                on_move: true,
                on_stun: true,
            },
        }
    }
}

/// Complete combat configuration. `Default` is a playable setup.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CombatConfig {
    /// Length of one simulation step.
    pub tick_ms: u32,
    /// Hit chance before any delta, as a fraction.
    pub base_hit_chance: f32,
    /// Hit chance removed when the attacker lacks the weapon's required skill.
    pub unskilled_hit_penalty_pct: i32,
    pub caps: CapTable,
    pub swing: SwingConfig,
    pub wear: WearConfig,
    /// Engagement window refreshed by every hostile action.
    pub disengage_ms: u32,
    /// Reach used by weapons without an explicit range.
    pub melee_reach: f32,
    pub bandage: BandageConfig,
    pub spellcast: SpellcastConfig,
    /// Profile used when no weapon is equipped or the actor is disarmed.
    pub unarmed: WeaponData,
    pub affix_counts: AffixCountTable,
    pub monster: BehaviorParams,
}

impl CombatConfig {
    // ===== compile-time constants used as type parameters =====
    /// Global cap on affixes per item instance.
    pub const MAX_AFFIXES: usize = 5;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_TICK_MS: u32 = 100;
    pub const DEFAULT_BASE_HIT_CHANCE: f32 = 0.75;
    pub const DEFAULT_DISENGAGE_MS: u32 = 10_000;
    pub const DEFAULT_MELEE_REACH: f32 = 1.5;

    pub fn new() -> Self {
        Self {
            tick_ms: Self::DEFAULT_TICK_MS,
            base_hit_chance: Self::DEFAULT_BASE_HIT_CHANCE,
            unskilled_hit_penalty_pct: 25,
            caps: CapTable::default(),
            swing: SwingConfig::default(),
            wear: WearConfig::default(),
            disengage_ms: Self::DEFAULT_DISENGAGE_MS,
            melee_reach: Self::DEFAULT_MELEE_REACH,
            bandage: BandageConfig::default(),
            spellcast: SpellcastConfig::default(),
            unarmed: WeaponData {
                handedness: Handedness::OneHanded,
                damage_type: DamageType::Physical,
                min_damage: 1,
                max_damage: 4,
                swing_ms: 2500,
                stamina_cost: 2,
                skill: SkillKind::Wrestling,
                required_skill: 0,
                ammo: None,
                range: None,
            },
            affix_counts: AffixCountTable::default(),
            monster: BehaviorParams::default(),
        }
    }

    pub fn with_tick_ms(mut self, tick_ms: u32) -> Self {
        self.tick_ms = tick_ms.max(1);
        self
    }

    pub fn with_disengage_ms(mut self, disengage_ms: u32) -> Self {
        self.disengage_ms = disengage_ms;
        self
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}
