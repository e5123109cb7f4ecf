//! Durability loss on hit.

use crate::env::RngOracle;
use crate::state::{EquipSlot, Equipment, ItemHandle};

/// One wear application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Wear {
    pub slot: EquipSlot,
    pub item: ItemHandle,
    /// This application broke the item.
    pub broke: bool,
}

/// Wears the equipped weapon, if it has durability.
pub fn wear_weapon(equipment: &mut Equipment, amount: u16) -> Option<Wear> {
    let item = equipment.get_mut(EquipSlot::Weapon)?;
    if item.durability.is_none() || item.is_broken() {
        return None;
    }
    let broke = item.wear(amount);
    Some(Wear {
        slot: EquipSlot::Weapon,
        item: item.handle,
        broke,
    })
}

/// Wears one intact armor piece chosen uniformly by `seed`.
pub fn wear_random_armor(
    equipment: &mut Equipment,
    amount: u16,
    rng: &dyn RngOracle,
    seed: u64,
) -> Option<Wear> {
    let candidates: Vec<EquipSlot> = equipment
        .armor()
        .filter(|(_, item)| item.durability.is_some() && !item.is_broken())
        .map(|(slot, _)| slot)
        .collect();
    if candidates.is_empty() {
        return None;
    }
    let pick = rng.range(seed, 0, candidates.len() as u32 - 1) as usize;
    let slot = candidates[pick];
    let item = equipment.get_mut(slot)?;
    let broke = item.wear(amount);
    Some(Wear {
        slot,
        item: item.handle,
        broke,
    })
}
