//! Affix rolling for freshly generated items.

use crate::affix::{AffixContext, AffixCountTable, resolve_count};
use crate::env::{AffixDefinition, CombatEnv, RollKey, RollKind};
use crate::state::{ActorId, AffixInstance, AffixList, EquipSlot, ModifierState};

/// Freshly rolled affixes for one item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RolledAffixes {
    pub affixes: AffixList,
    pub state: ModifierState,
}

/// Rolls a full affix list for an item worn in `slot`.
///
/// Count first, then distinct slot-eligible ids, then one magnitude per id
/// within the catalog range. Proc affixes only roll on weapons. Every draw is
/// keyed by `(roller, sequence)` so the result is reproducible.
pub fn roll_affixes(
    env: &CombatEnv<'_>,
    table: &AffixCountTable,
    context: AffixContext,
    slot: EquipSlot,
    roller: ActorId,
    sequence: u64,
) -> RolledAffixes {
    let key = RollKey::new(roller, RollKind::AffixCount, sequence);
    let count = resolve_count(table, context, env.rng, env.roll_seed(key));

    let mut pool: Vec<AffixDefinition> = env
        .affixes
        .all_affixes()
        .into_iter()
        .filter(|d| d.slots.contains(slot.mask()))
        .filter(|d| slot == EquipSlot::Weapon || !d.stat.is_proc())
        .collect();

    let picks = count.count.min(pool.len());
    let mut affixes = AffixList::new();
    for i in 0..picks {
        let pick_key = RollKey::new(roller, RollKind::AffixPick, sequence).indexed(i as u16);
        let last = (pool.len() - 1) as u32;
        let j = env.rng.range(env.roll_seed(pick_key), i as u32, last) as usize;
        pool.swap(i, j);

        let chosen = pool[i];
        let magnitude_key =
            RollKey::new(roller, RollKind::AffixMagnitude, sequence).indexed(i as u16);
        let magnitude = env
            .rng
            .range_i32(env.roll_seed(magnitude_key), chosen.min, chosen.max);
        affixes.push(AffixInstance::new(chosen.id, magnitude));
    }

    RolledAffixes {
        state: ModifierState::for_count(affixes.len()),
        affixes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affix::RarityTier;
    use crate::env::{AffixStat, AllowAll, CatalogSnapshot, Oracles, SpellId};
    use crate::state::{AffixId, SlotMask};

    fn oracles() -> Oracles {
        let catalog = CatalogSnapshot::new()
            .with_affix(AffixDefinition::new(AffixId(1), AffixStat::HitChance, 1, 15))
            .with_affix(AffixDefinition::new(AffixId(2), AffixStat::DefenseChance, 1, 15))
            .with_affix(AffixDefinition::new(AffixId(3), AffixStat::DamageIncrease, 5, 35))
            .with_affix(
                AffixDefinition::new(AffixId(4), AffixStat::HitSpell(SpellId(1)), 10, 40)
                    .on_slots(SlotMask::WEAPON),
            )
            .with_affix(
                AffixDefinition::new(AffixId(5), AffixStat::SwingSpeed, 5, 20)
                    .on_slots(SlotMask::WEAPON | SlotMask::JEWELRY),
            );
        Oracles::from_catalog(catalog, AllowAll, 42)
    }

    #[test]
    fn rolls_are_distinct_and_in_range() {
        let oracles = oracles();
        let env = oracles.env();
        let table = AffixCountTable::default();
        for sequence in 0..200 {
            let rolled = roll_affixes(
                &env,
                &table,
                AffixContext::Loot {
                    tier: RarityTier::Legendary,
                },
                EquipSlot::Weapon,
                ActorId(1),
                sequence,
            );
            let mut ids: Vec<_> = rolled.affixes.iter().map(|a| a.id).collect();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), rolled.affixes.len());
            for affix in &rolled.affixes {
                let def = env.affixes.affix(affix.id).expect("catalog affix");
                assert!((def.min..=def.max).contains(&affix.magnitude));
            }
        }
    }

    #[test]
    fn armor_never_rolls_weapon_only_affixes() {
        let oracles = oracles();
        let env = oracles.env();
        let table = AffixCountTable::default();
        for sequence in 0..200 {
            let rolled = roll_affixes(
                &env,
                &table,
                AffixContext::Enhancement { skill: 100 },
                EquipSlot::Torso,
                ActorId(2),
                sequence,
            );
            assert!(rolled.affixes.len() <= 3);
            assert!(
                rolled
                    .affixes
                    .iter()
                    .all(|a| a.id != AffixId(4) && a.id != AffixId(5))
            );
        }
    }

    #[test]
    fn same_inputs_same_roll() {
        let oracles = oracles();
        let env = oracles.env();
        let table = AffixCountTable::default();
        let context = AffixContext::Loot {
            tier: RarityTier::Epic,
        };
        let a = roll_affixes(&env, &table, context, EquipSlot::Ring, ActorId(9), 5);
        let b = roll_affixes(&env, &table, context, EquipSlot::Ring, ActorId(9), 5);
        assert_eq!(a, b);
    }
}
