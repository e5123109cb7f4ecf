//! Item, affix and spell catalog loader.

use std::collections::BTreeSet;
use std::path::Path;

use combat_core::{AffixDefinition, CatalogSnapshot, ItemDefinition, ItemKind, SpellDefinition};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Catalog structure for RON files.
///
/// Each section is optional so catalogs can be split across files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogFile {
    pub items: Vec<ItemDefinition>,
    pub affixes: Vec<AffixDefinition>,
    pub spells: Vec<SpellDefinition>,
}

impl CatalogFile {
    /// Rejects duplicate ids and malformed ranges.
    pub fn validate(&self) -> LoadResult<()> {
        let mut handles = BTreeSet::new();
        for item in &self.items {
            if !handles.insert(item.handle) {
                anyhow::bail!("duplicate item {}", item.handle);
            }
            if let ItemKind::Weapon(data) = &item.kind {
                if data.min_damage > data.max_damage {
                    anyhow::bail!("item {}: min_damage exceeds max_damage", item.handle);
                }
                if data.swing_ms == 0 {
                    anyhow::bail!("item {}: swing_ms must be positive", item.handle);
                }
            }
        }

        let mut affix_ids = BTreeSet::new();
        for affix in &self.affixes {
            if !affix_ids.insert(affix.id) {
                anyhow::bail!("duplicate affix {}", affix.id);
            }
            if affix.min > affix.max {
                anyhow::bail!("affix {}: min exceeds max", affix.id);
            }
        }

        let mut spell_ids = BTreeSet::new();
        for spell in &self.spells {
            if !spell_ids.insert(spell.id) {
                anyhow::bail!("duplicate spell {}", spell.id);
            }
            if spell.min_damage > spell.max_damage {
                anyhow::bail!("spell {}: min_damage exceeds max_damage", spell.id);
            }
        }
        Ok(())
    }

    /// Appends another file's definitions.
    pub fn merge(&mut self, other: CatalogFile) {
        self.items.extend(other.items);
        self.affixes.extend(other.affixes);
        self.spells.extend(other.spells);
    }

    pub fn into_snapshot(self) -> CatalogSnapshot {
        CatalogSnapshot::from_parts(self.items, self.affixes, self.spells)
    }
}

/// Loader for catalogs from RON files.
pub struct CatalogLoader;

impl CatalogLoader {
    /// Load a single catalog file.
    pub fn load(path: &Path) -> LoadResult<CatalogSnapshot> {
        Self::load_all(&[path])
    }

    /// Load and merge several catalog files. Ids must be unique across all of them.
    pub fn load_all(paths: &[&Path]) -> LoadResult<CatalogSnapshot> {
        let mut merged = CatalogFile::default();
        for path in paths {
            merged.merge(Self::read(path)?);
        }
        merged.validate()?;

        let snapshot = merged.into_snapshot();
        tracing::info!(
            target: "content::catalog",
            items = snapshot.item_count(),
            affixes = snapshot.affix_count(),
            spells = snapshot.spell_count(),
            "catalog loaded"
        );
        Ok(snapshot)
    }

    fn read(path: &Path) -> LoadResult<CatalogFile> {
        let content = read_file(path)?;
        ron::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse catalog RON at {}: {}", path.display(), e)
        })
    }
}
