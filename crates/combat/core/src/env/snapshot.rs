//! In-memory catalog backed by ordered maps.

use std::collections::BTreeMap;

use super::{
    AffixDefinition, AffixOracle, ItemDefinition, ItemOracle, SpellDefinition, SpellId,
    SpellOracle,
};
use crate::state::{AffixId, ItemHandle};

/// Complete catalog snapshot implementing every catalog oracle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CatalogSnapshot {
    items: BTreeMap<ItemHandle, ItemDefinition>,
    affixes: BTreeMap<AffixId, AffixDefinition>,
    spells: BTreeMap<SpellId, SpellDefinition>,
}

impl CatalogSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(
        items: impl IntoIterator<Item = ItemDefinition>,
        affixes: impl IntoIterator<Item = AffixDefinition>,
        spells: impl IntoIterator<Item = SpellDefinition>,
    ) -> Self {
        Self {
            items: items.into_iter().map(|d| (d.handle, d)).collect(),
            affixes: affixes.into_iter().map(|d| (d.id, d)).collect(),
            spells: spells.into_iter().map(|d| (d.id, d)).collect(),
        }
    }

    pub fn with_item(mut self, definition: ItemDefinition) -> Self {
        self.items.insert(definition.handle, definition);
        self
    }

    pub fn with_affix(mut self, definition: AffixDefinition) -> Self {
        self.affixes.insert(definition.id, definition);
        self
    }

    pub fn with_spell(mut self, definition: SpellDefinition) -> Self {
        self.spells.insert(definition.id, definition);
        self
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn affix_count(&self) -> usize {
        self.affixes.len()
    }

    pub fn spell_count(&self) -> usize {
        self.spells.len()
    }
}

impl ItemOracle for CatalogSnapshot {
    fn definition(&self, handle: ItemHandle) -> Option<ItemDefinition> {
        self.items.get(&handle).cloned()
    }
}

impl AffixOracle for CatalogSnapshot {
    fn affix(&self, id: AffixId) -> Option<AffixDefinition> {
        self.affixes.get(&id).copied()
    }

    fn all_affixes(&self) -> Vec<AffixDefinition> {
        self.affixes.values().copied().collect()
    }
}

impl SpellOracle for CatalogSnapshot {
    fn spell(&self, id: SpellId) -> Option<SpellDefinition> {
        self.spells.get(&id).copied()
    }
}
