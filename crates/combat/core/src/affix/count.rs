//! Affix count resolution: context → `Nmax` → one uniform draw.

use crate::config::CombatConfig;
use crate::env::RngOracle;
use crate::state::ModifierState;

/// Loot rarity tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RarityTier {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

/// Where an affix roll comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AffixContext {
    /// Loot generation: `Nmax` comes from the rarity tier.
    Loot { tier: RarityTier },
    /// Crafting enhancement: `Nmax` comes from the crafter's skill value.
    Enhancement { skill: u16 },
}

/// One step of the enhancement mapping: at `min_skill` and above, `nmax` applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillStep {
    pub min_skill: u16,
    pub nmax: u8,
}

/// Authored tables behind `Nmax`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AffixCountTable {
    /// Indexed by [`RarityTier`] declaration order.
    pub rarity: [u8; 5],
    /// Piecewise skill mapping, ascending by `min_skill`. Skills below the
    /// first step map to 0.
    pub enhancement: Vec<SkillStep>,
}

impl Default for AffixCountTable {
    fn default() -> Self {
        Self {
            rarity: [0, 1, 2, 3, 4],
            enhancement: vec![
                SkillStep { min_skill: 20, nmax: 1 },
                SkillStep { min_skill: 40, nmax: 2 },
                SkillStep { min_skill: 60, nmax: 3 },
                SkillStep { min_skill: 80, nmax: 4 },
                SkillStep { min_skill: 100, nmax: 5 },
            ],
        }
    }
}

impl AffixCountTable {
    /// Deterministic `Nmax` for a context, clamped to the global cap.
    pub fn nmax(&self, context: AffixContext) -> usize {
        let raw = match context {
            AffixContext::Loot { tier } => self.rarity[tier as usize],
            AffixContext::Enhancement { skill } => self
                .enhancement
                .iter()
                .take_while(|step| skill >= step.min_skill)
                .last()
                .map_or(0, |step| step.nmax),
        };
        (raw as usize).min(CombatConfig::MAX_AFFIXES)
    }
}

/// Outcome of a count roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AffixCount {
    pub count: usize,
    pub state: ModifierState,
}

/// Draws a count uniformly in `[0, Nmax]`.
///
/// Zero yields [`ModifierState::NoBonusModifiers`], never an empty magical item.
pub fn resolve_count(
    table: &AffixCountTable,
    context: AffixContext,
    rng: &dyn RngOracle,
    seed: u64,
) -> AffixCount {
    let nmax = table.nmax(context);
    let count = (rng.range(seed, 0, nmax as u32) as usize).min(CombatConfig::MAX_AFFIXES);
    AffixCount {
        count,
        state: ModifierState::for_count(count),
    }
}
