//! Stacking-aware aggregation of rolled affixes.

use std::collections::BTreeMap;

use tracing::debug;

use crate::combat::ResistTable;
use crate::env::{AffixOracle, AffixStat, SpellId, StackPolicy};
use crate::state::{AffixId, AffixInstance, VitalKind};

/// Per-stat totals after stacking, in whole percentage points. Uncapped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AffixTotals {
    pub hit_chance: i32,
    pub defense_chance: i32,
    pub damage_increase: i32,
    pub swing_speed: i32,
    pub resists: ResistTable<i32>,
    /// Proc chances in first-seen order.
    pub hit_spells: Vec<(SpellId, i32)>,
    pub leaches: Vec<(VitalKind, i32)>,
}

impl AffixTotals {
    fn add(&mut self, stat: AffixStat, value: i32) {
        match stat {
            AffixStat::HitChance => self.hit_chance += value,
            AffixStat::DefenseChance => self.defense_chance += value,
            AffixStat::DamageIncrease => self.damage_increase += value,
            AffixStat::SwingSpeed => self.swing_speed += value,
            AffixStat::Resist(channel) => {
                self.resists.set(channel, self.resists.get(channel) + value)
            }
            AffixStat::HitSpell(spell) => accumulate(&mut self.hit_spells, spell, value),
            AffixStat::Leach(vital) => accumulate(&mut self.leaches, vital, value),
        }
    }
}

fn accumulate<K: PartialEq>(entries: &mut Vec<(K, i32)>, key: K, value: i32) {
    match entries.iter_mut().find(|(k, _)| *k == key) {
        Some((_, total)) => *total += value,
        None => entries.push((key, value)),
    }
}

/// Answers aggregate questions about affix lists against the catalog.
///
/// Stacking is resolved here, per affix id, at aggregation time. Different
/// ids that touch the same stat are then summed.
#[derive(Clone, Copy)]
pub struct AffixResolver<'a> {
    catalog: &'a dyn AffixOracle,
}

impl<'a> AffixResolver<'a> {
    pub fn new(catalog: &'a dyn AffixOracle) -> Self {
        Self { catalog }
    }

    /// Sum of every instance of `id`.
    pub fn sum<'i>(&self, affixes: impl IntoIterator<Item = &'i AffixInstance>, id: AffixId) -> i32 {
        affixes
            .into_iter()
            .filter(|a| a.id == id)
            .map(|a| a.magnitude)
            .sum()
    }

    /// Largest instance of `id`, if any.
    pub fn highest<'i>(
        &self,
        affixes: impl IntoIterator<Item = &'i AffixInstance>,
        id: AffixId,
    ) -> Option<i32> {
        affixes
            .into_iter()
            .filter(|a| a.id == id)
            .map(|a| a.magnitude)
            .max()
    }

    /// Clamps an aggregated value into `[floor, cap]`.
    pub fn clamp(value: i32, floor: i32, cap: i32) -> i32 {
        value.clamp(floor, cap.max(floor))
    }

    /// Combines each id's instances by its declared policy. Input order is
    /// the slot order, which `NoStack` relies on. Unknown ids are skipped.
    pub fn aggregate<'i>(
        &self,
        affixes: impl IntoIterator<Item = &'i AffixInstance>,
    ) -> BTreeMap<AffixId, i32> {
        let mut combined: BTreeMap<AffixId, i32> = BTreeMap::new();
        for instance in affixes {
            let Some(definition) = self.catalog.affix(instance.id) else {
                debug!(target: "combat::affix", affix = %instance.id, "unknown affix skipped");
                continue;
            };
            match (definition.stacking, combined.get_mut(&instance.id)) {
                (_, None) => {
                    combined.insert(instance.id, instance.magnitude);
                }
                (StackPolicy::Sum, Some(total)) => *total += instance.magnitude,
                (StackPolicy::HighestOnly, Some(best)) => *best = (*best).max(instance.magnitude),
                (StackPolicy::NoStack, Some(_)) => {}
            }
        }
        combined
    }

    /// Stacked totals grouped by the stat each affix modifies.
    pub fn totals<'i>(&self, affixes: impl IntoIterator<Item = &'i AffixInstance>) -> AffixTotals {
        let mut totals = AffixTotals::default();
        for (id, value) in self.aggregate(affixes) {
            if let Some(definition) = self.catalog.affix(id) {
                totals.add(definition.stat, value);
            }
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::DamageType;
    use crate::env::{AffixDefinition, CatalogSnapshot};

    const HCI: AffixId = AffixId(1);
    const FIRE_RESIST: AffixId = AffixId(2);
    const SSI: AffixId = AffixId(3);
    const FIRE_RESIST_MINOR: AffixId = AffixId(4);

    fn catalog() -> CatalogSnapshot {
        CatalogSnapshot::new()
            .with_affix(AffixDefinition::new(HCI, AffixStat::HitChance, 1, 15))
            .with_affix(
                AffixDefinition::new(FIRE_RESIST, AffixStat::Resist(DamageType::Fire), 1, 15)
                    .stacking(StackPolicy::HighestOnly),
            )
            .with_affix(
                AffixDefinition::new(SSI, AffixStat::SwingSpeed, 5, 30)
                    .stacking(StackPolicy::NoStack),
            )
            .with_affix(AffixDefinition::new(
                FIRE_RESIST_MINOR,
                AffixStat::Resist(DamageType::Fire),
                1,
                10,
            ))
    }

    #[test]
    fn policies_apply_per_id() {
        let catalog = catalog();
        let resolver = AffixResolver::new(&catalog);
        let affixes = [
            AffixInstance::new(HCI, 5),
            AffixInstance::new(HCI, 7),
            AffixInstance::new(FIRE_RESIST, 4),
            AffixInstance::new(FIRE_RESIST, 9),
            AffixInstance::new(SSI, 20),
            AffixInstance::new(SSI, 30),
        ];
        let combined = resolver.aggregate(&affixes);
        assert_eq!(combined[&HCI], 12);
        assert_eq!(combined[&FIRE_RESIST], 9);
        assert_eq!(combined[&SSI], 20);
    }

    #[test]
    fn distinct_ids_on_same_stat_sum() {
        let catalog = catalog();
        let resolver = AffixResolver::new(&catalog);
        let affixes = [
            AffixInstance::new(FIRE_RESIST, 4),
            AffixInstance::new(FIRE_RESIST, 9),
            AffixInstance::new(FIRE_RESIST_MINOR, 3),
        ];
        let totals = resolver.totals(&affixes);
        assert_eq!(totals.resists.get(DamageType::Fire), 12);
    }

    #[test]
    fn sum_highest_and_clamp() {
        let catalog = catalog();
        let resolver = AffixResolver::new(&catalog);
        let affixes = [AffixInstance::new(HCI, 5), AffixInstance::new(HCI, 7)];
        assert_eq!(resolver.sum(&affixes, HCI), 12);
        assert_eq!(resolver.highest(&affixes, HCI), Some(7));
        assert_eq!(resolver.highest(&affixes, SSI), None);
        assert_eq!(AffixResolver::clamp(120, 0, 70), 70);
        assert_eq!(AffixResolver::clamp(-5, 0, 70), 0);
    }
}
