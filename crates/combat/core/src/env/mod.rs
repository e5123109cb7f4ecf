//! Traits describing read-only collaborators.
//!
//! Oracles expose authored catalogs, the deterministic RNG and the external
//! legality decision. [`CombatEnv`] bundles borrowed oracles for one tick;
//! [`Oracles`] owns them for the lifetime of an engine.
mod catalog;
mod legality;
mod rng;
mod snapshot;

use std::sync::Arc;

pub use catalog::{
    AffixDefinition, AffixOracle, AffixStat, ArmorData, Handedness, ItemDefinition, ItemKind,
    ItemOracle, SpellDefinition, SpellId, SpellOracle, StackPolicy, WeaponData,
};
pub use legality::{AllowAll, AttackLegality, LegalityOracle};
pub use rng::{PcgRng, RngOracle, RollKey, RollKind, compute_seed};
pub use snapshot::CatalogSnapshot;

/// Borrowed oracle bundle handed to pure pipeline functions.
#[derive(Clone, Copy)]
pub struct CombatEnv<'a> {
    pub items: &'a dyn ItemOracle,
    pub affixes: &'a dyn AffixOracle,
    pub spells: &'a dyn SpellOracle,
    pub legality: &'a dyn LegalityOracle,
    pub rng: &'a dyn RngOracle,
    /// World seed mixed into every roll.
    pub game_seed: u64,
}

impl<'a> CombatEnv<'a> {
    pub fn roll_seed(&self, key: RollKey) -> u64 {
        key.seed(self.game_seed)
    }
}

/// Owned oracle set held by the composition root.
#[derive(Clone)]
pub struct Oracles {
    pub items: Arc<dyn ItemOracle>,
    pub affixes: Arc<dyn AffixOracle>,
    pub spells: Arc<dyn SpellOracle>,
    pub legality: Arc<dyn LegalityOracle>,
    pub rng: Arc<dyn RngOracle>,
    pub game_seed: u64,
}

impl Oracles {
    /// One catalog serving all three lookups, PCG rolls and the given legality.
    pub fn from_catalog<C, L>(catalog: C, legality: L, game_seed: u64) -> Self
    where
        C: ItemOracle + AffixOracle + SpellOracle + 'static,
        L: LegalityOracle + 'static,
    {
        let catalog = Arc::new(catalog);
        Self {
            items: catalog.clone(),
            affixes: catalog.clone(),
            spells: catalog,
            legality: Arc::new(legality),
            rng: Arc::new(PcgRng),
            game_seed,
        }
    }

    pub fn with_legality<L: LegalityOracle + 'static>(mut self, legality: L) -> Self {
        self.legality = Arc::new(legality);
        self
    }

    pub fn env(&self) -> CombatEnv<'_> {
        CombatEnv {
            items: self.items.as_ref(),
            affixes: self.affixes.as_ref(),
            spells: self.spells.as_ref(),
            legality: self.legality.as_ref(),
            rng: self.rng.as_ref(),
            game_seed: self.game_seed,
        }
    }
}

impl core::fmt::Debug for Oracles {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Oracles")
            .field("game_seed", &self.game_seed)
            .finish_non_exhaustive()
    }
}
