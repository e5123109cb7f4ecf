//! Snapshot recompute.
//!
//! # Order
//!
//! ```text
//! baselines/caps → attributes → weapon profile → item affixes (stacking)
//!     → status gates and multipliers → hard caps → publish
//! ```
//!
//! Statuses are folded once up front, so the disarm flag is known before
//! the weapon profile and the weapon's affixes are picked. Status gates and
//! multipliers are still applied after the affixes are summed.

use tracing::warn;

use super::swing::dex_bonus;
use super::{CombatSnapshot, LeachProc, ProcProfile, SpellProc, WeaponProfile, WeaponSource};
use crate::affix::{AffixResolver, AffixTotals};
use crate::combat::ResistTable;
use crate::config::{CapTable, CombatConfig};
use crate::env::CombatEnv;
use crate::state::{
    ActionGates, ActiveStatus, ActorRecord, Attributes, EquipSlot, Equipment, ItemInstance,
    Skills,
};

/// Everything the aggregator reads for one actor.
#[derive(Clone, Copy, Debug)]
pub struct ActorInputs<'a> {
    pub attributes: &'a Attributes,
    pub skills: &'a Skills,
    pub equipment: &'a Equipment,
    pub statuses: &'a [ActiveStatus],
}

impl<'a> ActorInputs<'a> {
    pub fn of(record: &'a ActorRecord) -> Self {
        Self {
            attributes: &record.attributes,
            skills: &record.skills,
            equipment: &record.equipment,
            statuses: &record.statuses,
        }
    }
}

/// Folded status inputs.
struct StatusTotals {
    blocked: ActionGates,
    swing: f32,
    cast: f32,
    bandage: f32,
    hit: i32,
    defense: i32,
    damage_increase: i32,
    resists: ResistTable<i32>,
    disarmed: bool,
    stunned: bool,
}

impl StatusTotals {
    /// Blocking flags OR together; multipliers multiply from a neutral 1.0.
    fn fold(statuses: &[ActiveStatus]) -> Self {
        let mut totals = Self {
            blocked: ActionGates::empty(),
            swing: 1.0,
            cast: 1.0,
            bandage: 1.0,
            hit: 0,
            defense: 0,
            damage_increase: 0,
            resists: ResistTable::default(),
            disarmed: false,
            stunned: false,
        };
        for status in statuses {
            totals.blocked |= status.blocks;
            totals.swing *= neutral_if_unset(status.swing_multiplier);
            totals.cast *= neutral_if_unset(status.cast_multiplier);
            totals.bandage *= neutral_if_unset(status.bandage_multiplier);
            totals.hit += status.hit_delta_pct;
            totals.defense += status.defense_delta_pct;
            totals.damage_increase += status.damage_increase_pct;
            totals.resists.add(&status.resist_pct);
            totals.disarmed |= status.disarms;
            totals.stunned |= status.stun;
        }
        if totals.stunned {
            totals.blocked = ActionGates::all();
        }
        totals
    }
}

/// A zero or negative multiplier carries no information; treat it as neutral.
fn neutral_if_unset(multiplier: f32) -> f32 {
    if multiplier > 0.0 { multiplier } else { 1.0 }
}

fn pct(value: i32) -> f32 {
    value as f32 / 100.0
}

/// Builds a fresh snapshot. Pure given its inputs.
pub fn recompute(
    inputs: &ActorInputs<'_>,
    env: &CombatEnv<'_>,
    config: &CombatConfig,
) -> CombatSnapshot {
    let caps: &CapTable = &config.caps;

    let dex = dex_bonus(inputs.attributes, &config.swing);

    let statuses = StatusTotals::fold(inputs.statuses);
    let weapon = resolve_weapon(inputs.equipment, statuses.disarmed, env, config);

    let resolver = AffixResolver::new(env.affixes);
    let worn = inputs
        .equipment
        .iter()
        .filter(|(slot, _)| !(statuses.disarmed && *slot == EquipSlot::Weapon))
        .flat_map(|(_, item)| item.active_affixes());
    let items = resolver.totals(worn);

    let procs = match (weapon.source, inputs.equipment.weapon()) {
        (WeaponSource::Equipped(_), Some(item)) => {
            proc_profile(&resolver.totals(item.active_affixes()))
        }
        _ => ProcProfile::default(),
    };

    let mut resist_pct = armor_resists(inputs.equipment, env);
    resist_pct.add(&items.resists);
    resist_pct.add(&statuses.resists);
    let resists = resist_pct.map(|_, total| pct(AffixResolver::clamp(total, 0, caps.resist_pct)));

    let swing_cfg = &config.swing;
    let unskilled = inputs.skills.get(weapon.skill) < weapon.required_skill;

    CombatSnapshot {
        gates: ActionGates::all().difference(statuses.blocked),
        hit_delta: pct(AffixResolver::clamp(
            items.hit_chance + statuses.hit,
            -caps.hit_delta_pct,
            caps.hit_delta_pct,
        )),
        defense_delta: pct(AffixResolver::clamp(
            items.defense_chance + statuses.defense,
            -caps.defense_delta_pct,
            caps.defense_delta_pct,
        )),
        damage_increase: pct(AffixResolver::clamp(
            items.damage_increase + statuses.damage_increase,
            -100,
            caps.damage_increase_pct,
        )),
        swing_affix_bonus: pct(AffixResolver::clamp(
            items.swing_speed,
            0,
            caps.swing_affix_pct.min(100),
        )),
        swing_status_multiplier: statuses
            .swing
            .clamp(swing_cfg.status_multiplier_min, swing_cfg.status_multiplier_max),
        cast_multiplier: statuses
            .cast
            .clamp(swing_cfg.status_multiplier_min, swing_cfg.status_multiplier_max),
        bandage_multiplier: statuses
            .bandage
            .clamp(swing_cfg.status_multiplier_min, swing_cfg.status_multiplier_max),
        dex_bonus: dex,
        resists,
        weapon,
        procs,
        unskilled,
        stunned: statuses.stunned,
    }
}

fn resolve_weapon(
    equipment: &Equipment,
    disarmed: bool,
    env: &CombatEnv<'_>,
    config: &CombatConfig,
) -> WeaponProfile {
    if disarmed {
        return WeaponProfile::from_data(
            WeaponSource::Disarmed,
            &config.unarmed,
            config.melee_reach,
        );
    }
    let Some(item) = equipment.weapon() else {
        return WeaponProfile::unarmed(config);
    };
    match env.items.definition(item.handle) {
        Some(definition) => match definition.weapon_data() {
            Some(data) => WeaponProfile::from_data(
                WeaponSource::Equipped(item.handle),
                data,
                config.melee_reach,
            ),
            None => {
                warn!(target: "combat::stats", item = %item.handle, "non-weapon in weapon slot");
                WeaponProfile::unarmed(config)
            }
        },
        None => {
            warn!(target: "combat::stats", item = %item.handle, "weapon missing from catalog");
            WeaponProfile::unarmed(config)
        }
    }
}

/// Base resistances from intact armor, in percentage points.
fn armor_resists(equipment: &Equipment, env: &CombatEnv<'_>) -> ResistTable<i32> {
    let mut total = ResistTable::default();
    for (_, item) in equipment.armor() {
        if let Some(resists) = intact_armor_resists(item, env) {
            total.add(&resists);
        }
    }
    total
}

fn intact_armor_resists(item: &ItemInstance, env: &CombatEnv<'_>) -> Option<ResistTable<i32>> {
    if item.is_broken() {
        return None;
    }
    env.items
        .definition(item.handle)
        .and_then(|d| d.armor_data().map(|a| a.resists))
}

fn proc_profile(weapon: &AffixTotals) -> ProcProfile {
    let mut profile = ProcProfile::default();
    for &(spell, chance) in &weapon.hit_spells {
        if chance > 0 && !profile.spells.is_full() {
            profile.spells.push(SpellProc {
                spell,
                chance: pct(chance.min(100)),
            });
        }
    }
    for &(vital, leach) in &weapon.leaches {
        if leach > 0 && !profile.leaches.is_full() {
            profile.leaches.push(LeachProc {
                vital,
                fraction: pct(leach.min(100)),
            });
        }
    }
    profile
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::DamageType;
    use crate::env::{
        AffixDefinition, AffixStat, AllowAll, ArmorData, CatalogSnapshot, ItemDefinition, Oracles,
        SpellId, WeaponData,
    };
    use crate::state::{
        AffixId, AffixInstance, AffixList, ItemHandle, ModifierState, StatusId, VitalKind,
    };

    const SWORD: ItemHandle = ItemHandle(1);
    const HELM: ItemHandle = ItemHandle(2);
    const RING: ItemHandle = ItemHandle(3);

    const HCI: AffixId = AffixId(1);
    const FIRE: AffixId = AffixId(2);
    const LIGHTNING: AffixId = AffixId(3);
    const LIFE_LEACH: AffixId = AffixId(4);
    const SSI: AffixId = AffixId(5);

    fn oracles() -> Oracles {
        let catalog = CatalogSnapshot::new()
            .with_item(ItemDefinition::weapon(SWORD, WeaponData::melee(5, 9, 2000, 10)))
            .with_item(ItemDefinition::armor(
                HELM,
                EquipSlot::Head,
                ArmorData::default().with_resist(DamageType::Fire, 60),
            ))
            .with_item(ItemDefinition::jewelry(RING, EquipSlot::Ring))
            .with_affix(AffixDefinition::new(HCI, AffixStat::HitChance, 1, 50))
            .with_affix(AffixDefinition::new(
                FIRE,
                AffixStat::Resist(DamageType::Fire),
                1,
                30,
            ))
            .with_affix(AffixDefinition::new(
                LIGHTNING,
                AffixStat::HitSpell(SpellId(7)),
                1,
                50,
            ))
            .with_affix(AffixDefinition::new(
                LIFE_LEACH,
                AffixStat::Leach(VitalKind::Health),
                1,
                50,
            ))
            .with_affix(AffixDefinition::new(SSI, AffixStat::SwingSpeed, 1, 90));
        Oracles::from_catalog(catalog, AllowAll, 1)
    }

    fn item(handle: ItemHandle, affixes: &[(AffixId, i32)]) -> ItemInstance {
        let list: AffixList = affixes
            .iter()
            .map(|&(id, m)| AffixInstance::new(id, m))
            .collect();
        ItemInstance::new(handle)
            .with_durability(10)
            .with_affixes(list, ModifierState::Magical)
    }

    fn snapshot(equipment: &Equipment, statuses: &[ActiveStatus]) -> CombatSnapshot {
        let oracles = oracles();
        let attributes = Attributes::new(50, 0, 50);
        let skills = Skills::default();
        let inputs = ActorInputs {
            attributes: &attributes,
            skills: &skills,
            equipment,
            statuses,
        };
        recompute(&inputs, &oracles.env(), &CombatConfig::default())
    }

    #[test]
    fn resist_is_capped() {
        let mut equipment = Equipment::empty();
        equipment.equip(EquipSlot::Head, item(HELM, &[(FIRE, 30)]));
        let snap = snapshot(&equipment, &[]);
        assert_eq!(snap.resist(DamageType::Fire), 0.70);
    }

    #[test]
    fn broken_items_contribute_nothing() {
        let mut helm = item(HELM, &[(FIRE, 5)]);
        helm.wear(10);
        let mut ring = item(RING, &[(HCI, 10)]);
        ring.wear(10);
        let mut equipment = Equipment::empty();
        equipment.equip(EquipSlot::Head, helm);
        equipment.equip(EquipSlot::Ring, ring);

        let snap = snapshot(&equipment, &[]);
        assert_eq!(snap.resist(DamageType::Fire), 0.0);
        assert_eq!(snap.hit_delta, 0.0);
    }

    #[test]
    fn procs_only_come_from_the_weapon() {
        let mut equipment = Equipment::empty();
        equipment.equip(
            EquipSlot::Weapon,
            item(SWORD, &[(LIGHTNING, 25), (LIFE_LEACH, 30)]),
        );
        equipment.equip(EquipSlot::Ring, item(RING, &[(LIGHTNING, 40)]));

        let snap = snapshot(&equipment, &[]);
        assert_eq!(snap.procs.spells.len(), 1);
        assert_eq!(snap.procs.spells[0].chance, 0.25);
        assert_eq!(snap.procs.leaches[0].fraction, 0.30);
    }

    #[test]
    fn disarm_swaps_profile_and_drops_weapon_affixes() {
        let mut equipment = Equipment::empty();
        equipment.equip(EquipSlot::Weapon, item(SWORD, &[(HCI, 20), (LIGHTNING, 25)]));
        let disarm = ActiveStatus::new(StatusId(1)).disarming();

        let snap = snapshot(&equipment, &[disarm]);
        assert_eq!(snap.weapon.source, WeaponSource::Disarmed);
        assert_eq!(snap.hit_delta, 0.0);
        assert!(snap.procs.is_empty());
    }

    #[test]
    fn statuses_gate_and_multiply() {
        let slow = ActiveStatus::new(StatusId(1))
            .with_swing_multiplier(1.5)
            .blocking(ActionGates::CAST);
        let haste = ActiveStatus::new(StatusId(2)).with_swing_multiplier(0.5);

        let snap = snapshot(&Equipment::empty(), &[slow, haste]);
        assert!(snap.can_attack());
        assert!(!snap.can_cast());
        assert!((snap.swing_status_multiplier - 0.75).abs() < 1e-6);
    }

    #[test]
    fn stun_blocks_everything() {
        let stun = ActiveStatus::new(StatusId(3)).stunning();
        let snap = snapshot(&Equipment::empty(), &[stun]);
        assert!(snap.stunned);
        assert!(snap.gates.is_empty());
    }

    #[test]
    fn swing_affix_bonus_is_capped() {
        let mut equipment = Equipment::empty();
        equipment.equip(EquipSlot::Weapon, item(SWORD, &[(SSI, 90)]));
        let snap = snapshot(&equipment, &[]);
        assert_eq!(snap.swing_affix_bonus, 0.60);
    }
}
