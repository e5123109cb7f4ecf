#![allow(dead_code)]

use combat_core::{
    ActiveStatus, ActorId, ActorRecord, AllowAll, Attributes, Backpack, CatalogSnapshot,
    CombatConfig, CombatEngine, CombatEvent, DamageType, EquipSlot, Equipment, ItemDefinition,
    ItemHandle, ItemInstance, ItemKind, Oracles, Position, SpellDefinition, SpellId, StatusId,
    Vitals, WeaponData,
};

pub const SWORD: ItemHandle = ItemHandle(1);
pub const AXE: ItemHandle = ItemHandle(2);
pub const BRITTLE: ItemHandle = ItemHandle(3);

pub const BANDAGE: ItemHandle = ItemHandle(900);
pub const FIREBOLT: SpellId = SpellId(1);

pub const SEED: u64 = 0x5eed;

pub fn catalog() -> CatalogSnapshot {
    CatalogSnapshot::new()
        .with_item(ItemDefinition::weapon(
            SWORD,
            WeaponData::melee(5, 10, 2000, 10),
        ))
        .with_item(ItemDefinition::weapon(
            AXE,
            WeaponData::melee(80, 80, 2000, 0),
        ))
        .with_item(
            ItemDefinition::weapon(BRITTLE, WeaponData::melee(1, 1, 2000, 0)).with_durability(2),
        )
        .with_item(ItemDefinition::stackable(BANDAGE, ItemKind::Bandage, 100))
        .with_spell(SpellDefinition::bolt(FIREBOLT, DamageType::Fire, 15, 15).with_cost(10, 1500))
}

pub fn engine() -> CombatEngine {
    engine_with_seed(SEED)
}

pub fn engine_with_seed(seed: u64) -> CombatEngine {
    CombatEngine::new(
        CombatConfig::default(),
        Oracles::from_catalog(catalog(), AllowAll, seed),
    )
}

/// Zero DEX so swing times equal the weapon's base.
pub fn fighter(id: u32, at: Position, hp: u32) -> ActorRecord {
    ActorRecord::new(ActorId(id), at, Vitals::full(hp, 100, 50))
        .with_attributes(Attributes::new(50, 0, 50))
}

pub fn armed(id: u32, at: Position, hp: u32, weapon: ItemHandle) -> ActorRecord {
    let mut equipment = Equipment::empty();
    equipment.equip(EquipSlot::Weapon, ItemInstance::new(weapon));
    fighter(id, at, hp).with_equipment(equipment)
}

pub fn with_bandages(record: ActorRecord, count: u16) -> ActorRecord {
    let mut backpack = Backpack::new();
    backpack.add(ItemInstance::stack_of(BANDAGE, count));
    record.with_backpack(backpack)
}

/// Saturates the hit chance so every swing lands.
pub fn sure_hit() -> ActiveStatus {
    let mut status = ActiveStatus::new(StatusId(77));
    status.hit_delta_pct = 100;
    status
}

pub fn swings(events: &[CombatEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, CombatEvent::Hit { .. } | CombatEvent::Miss { .. }))
        .count()
}

pub fn kills(events: &[CombatEvent]) -> Vec<(ActorId, ActorId)> {
    events
        .iter()
        .filter_map(|e| match e {
            CombatEvent::ActorKilled { killer, victim, .. } => Some((*killer, *victim)),
            _ => None,
        })
        .collect()
}
