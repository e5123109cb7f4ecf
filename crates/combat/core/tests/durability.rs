mod common;

use combat_core::{
    AffixDefinition, AffixId, AffixInstance, AffixStat, AllowAll, ArmorData, CatalogSnapshot,
    CombatConfig, CombatEngine, CombatError, CombatEvent, DamageType, Durability, EquipSlot,
    Equipment, ItemDefinition, ItemHandle, ItemInstance, ModifierState, Oracles, Position,
};

use common::{AXE, BRITTLE, SEED, SWORD, armed, catalog, fighter, sure_hit};

const PLATE: ItemHandle = ItemHandle(40);
const ACCURACY: AffixId = AffixId(1);

fn engine() -> CombatEngine {
    let catalog: CatalogSnapshot = catalog()
        .with_item(
            ItemDefinition::armor(
                PLATE,
                EquipSlot::Torso,
                ArmorData::default().with_resist(DamageType::Physical, 20),
            )
            .with_durability(1),
        )
        .with_affix(AffixDefinition::new(ACCURACY, AffixStat::HitChance, 1, 15));
    CombatEngine::new(
        CombatConfig::default(),
        Oracles::from_catalog(catalog, AllowAll, SEED),
    )
}

fn broken(events: &[CombatEvent]) -> Vec<(combat_core::ActorId, ItemHandle)> {
    events
        .iter()
        .filter_map(|e| match e {
            CombatEvent::ItemBroken { owner, item, .. } => Some((*owner, *item)),
            _ => None,
        })
        .collect()
}

#[test]
fn weapon_breaks_once_and_repair_restores_it() {
    let mut engine = engine();
    let attacker = armed(1, Position::ORIGIN, 100, BRITTLE).with_statuses(vec![sure_hit()]);
    let a = attacker.id;
    engine.on_spawn(attacker).unwrap();
    engine.on_spawn(fighter(2, Position::new(1.0, 0.0), 500)).unwrap();
    engine.arm_attack(a, combat_core::ActorId(2)).unwrap();

    engine.advance(20);
    assert!(broken(&engine.drain_events()).is_empty());
    engine.advance(20);
    assert_eq!(broken(&engine.drain_events()), vec![(a, BRITTLE)]);
    engine.advance(60);
    assert!(broken(&engine.drain_events()).is_empty());

    let weapon = engine.actor(a).unwrap().equipment.weapon().unwrap();
    assert!(weapon.is_broken());
    assert_eq!(engine.repair(a, EquipSlot::Weapon, 5).unwrap(), 2);
    assert!(!engine.actor(a).unwrap().equipment.weapon().unwrap().is_broken());
}

#[test]
fn broken_armor_stops_resisting() {
    let mut engine = engine();
    let mut equipment = Equipment::empty();
    equipment.equip(EquipSlot::Torso, ItemInstance::new(PLATE));
    let defender = fighter(2, Position::new(1.0, 0.0), 500).with_equipment(equipment);
    let d = defender.id;
    engine
        .on_spawn(armed(1, Position::ORIGIN, 100, AXE).with_statuses(vec![sure_hit()]))
        .unwrap();
    engine.on_spawn(defender).unwrap();
    assert!(engine.snapshot(d).unwrap().resist(DamageType::Physical) > 0.0);

    engine.arm_attack(combat_core::ActorId(1), d).unwrap();
    engine.advance(20);
    let events = engine.drain_events();
    assert_eq!(broken(&events), vec![(d, PLATE)]);
    // the breaking blow itself was still mitigated
    assert_eq!(engine.actor(d).unwrap().vitals.hp.current, 500 - 64);
    assert_eq!(engine.snapshot(d).unwrap().resist(DamageType::Physical), 0.0);
}

#[test]
fn equip_validates_slot_and_sanitizes_affixes() {
    let mut engine = engine();
    engine.on_spawn(fighter(1, Position::ORIGIN, 100)).unwrap();
    let a = combat_core::ActorId(1);

    assert_eq!(
        engine
            .equip(a, EquipSlot::Head, ItemInstance::new(AXE))
            .unwrap_err(),
        CombatError::SlotMismatch {
            item: AXE,
            slot: EquipSlot::Head
        }
    );
    assert_eq!(
        engine
            .equip(a, EquipSlot::Weapon, ItemInstance::new(ItemHandle(999)))
            .unwrap_err(),
        CombatError::ItemNotFound(ItemHandle(999))
    );
    assert_eq!(
        engine.unequip(a, EquipSlot::Ring).unwrap_err(),
        CombatError::EmptySlot {
            actor: a,
            slot: EquipSlot::Ring
        }
    );

    let affixes = [
        AffixInstance::new(ACCURACY, 40),
        AffixInstance::new(AffixId(77), 5),
    ]
    .into_iter()
    .collect();
    let sword = ItemInstance::new(AXE).with_affixes(affixes, ModifierState::Magical);
    assert!(engine.equip(a, EquipSlot::Weapon, sword).unwrap().is_none());

    let worn = engine.actor(a).unwrap().equipment.weapon().unwrap();
    assert_eq!(worn.active_affixes(), &[AffixInstance::new(ACCURACY, 15)]);
    assert!((engine.snapshot(a).unwrap().hit_delta - 0.15).abs() < 1e-6);

    let removed = engine.unequip(a, EquipSlot::Weapon).unwrap();
    assert_eq!(removed.handle, AXE);
    assert_eq!(engine.snapshot(a).unwrap().hit_delta, 0.0);
}

#[test]
fn equip_clamps_durability_above_its_maximum() {
    let mut engine = engine();
    engine.on_spawn(fighter(1, Position::ORIGIN, 100)).unwrap();
    let a = combat_core::ActorId(1);

    let mut sword = ItemInstance::new(SWORD);
    sword.durability = Some(Durability {
        current: 10,
        maximum: 5,
    });
    engine.equip(a, EquipSlot::Weapon, sword).unwrap();

    let worn = engine.actor(a).unwrap().equipment.weapon().unwrap();
    assert_eq!(worn.durability, Some(Durability::new(5)));
    assert_eq!(engine.repair(a, EquipSlot::Weapon, 3).unwrap(), 0);
}
