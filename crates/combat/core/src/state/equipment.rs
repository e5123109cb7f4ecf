//! Worn equipment and carried consumables.

use std::collections::BTreeMap;

use bitflags::bitflags;

use super::{ItemHandle, ItemInstance};

/// Equipment slots. Declaration order is the deterministic aggregation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EquipSlot {
    Weapon,
    Head,
    Torso,
    Arms,
    Hands,
    Legs,
    Neck,
    Ring,
}

impl EquipSlot {
    pub const fn is_armor(self) -> bool {
        matches!(
            self,
            Self::Head | Self::Torso | Self::Arms | Self::Hands | Self::Legs
        )
    }

    pub const fn is_jewelry(self) -> bool {
        matches!(self, Self::Neck | Self::Ring)
    }

    pub const fn mask(self) -> SlotMask {
        match self {
            Self::Weapon => SlotMask::WEAPON,
            Self::Head => SlotMask::HEAD,
            Self::Torso => SlotMask::TORSO,
            Self::Arms => SlotMask::ARMS,
            Self::Hands => SlotMask::HANDS,
            Self::Legs => SlotMask::LEGS,
            Self::Neck => SlotMask::NECK,
            Self::Ring => SlotMask::RING,
        }
    }
}

bitflags! {
    /// Set of slots an affix may roll on.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct SlotMask: u16 {
        const WEAPON = 1 << 0;
        const HEAD = 1 << 1;
        const TORSO = 1 << 2;
        const ARMS = 1 << 3;
        const HANDS = 1 << 4;
        const LEGS = 1 << 5;
        const NECK = 1 << 6;
        const RING = 1 << 7;

        const ARMOR = Self::HEAD.bits() | Self::TORSO.bits() | Self::ARMS.bits()
            | Self::HANDS.bits() | Self::LEGS.bits();
        const JEWELRY = Self::NECK.bits() | Self::RING.bits();
    }
}

/// Items currently worn by an actor, keyed by slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Equipment {
    slots: BTreeMap<EquipSlot, ItemInstance>,
}

impl Equipment {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Equips an item, returning whatever previously occupied the slot.
    pub fn equip(&mut self, slot: EquipSlot, item: ItemInstance) -> Option<ItemInstance> {
        self.slots.insert(slot, item)
    }

    pub fn unequip(&mut self, slot: EquipSlot) -> Option<ItemInstance> {
        self.slots.remove(&slot)
    }

    pub fn get(&self, slot: EquipSlot) -> Option<&ItemInstance> {
        self.slots.get(&slot)
    }

    pub fn get_mut(&mut self, slot: EquipSlot) -> Option<&mut ItemInstance> {
        self.slots.get_mut(&slot)
    }

    pub fn weapon(&self) -> Option<&ItemInstance> {
        self.get(EquipSlot::Weapon)
    }

    /// All worn items in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (EquipSlot, &ItemInstance)> {
        self.slots.iter().map(|(slot, item)| (*slot, item))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EquipSlot, &mut ItemInstance)> {
        self.slots.iter_mut().map(|(slot, item)| (*slot, item))
    }

    /// Worn armor pieces in slot order.
    pub fn armor(&self) -> impl Iterator<Item = (EquipSlot, &ItemInstance)> {
        self.iter().filter(|(slot, _)| slot.is_armor())
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Carried stacks: ammunition, bandages and other consumables.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Backpack {
    stacks: Vec<ItemInstance>,
}

impl Backpack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an item, merging into an existing stack of the same handle when
    /// the item carries no per-instance state.
    pub fn add(&mut self, item: ItemInstance) {
        let mergeable = item.durability.is_none() && item.affixes.is_empty();
        if mergeable
            && let Some(stack) = self
                .stacks
                .iter_mut()
                .find(|s| s.handle == item.handle && s.durability.is_none())
        {
            stack.stack = stack.stack.saturating_add(item.stack);
            return;
        }
        self.stacks.push(item);
    }

    /// Total units carried for `handle`.
    pub fn count(&self, handle: ItemHandle) -> u32 {
        self.stacks
            .iter()
            .filter(|s| s.handle == handle)
            .map(|s| s.stack as u32)
            .sum()
    }

    /// Removes `amount` units of `handle`, all or nothing.
    pub fn consume(&mut self, handle: ItemHandle, amount: u16) -> bool {
        if self.count(handle) < amount as u32 {
            return false;
        }
        let mut remaining = amount;
        for stack in self.stacks.iter_mut().filter(|s| s.handle == handle) {
            let taken = remaining.min(stack.stack);
            stack.stack -= taken;
            remaining -= taken;
            if remaining == 0 {
                break;
            }
        }
        self.stacks.retain(|s| s.stack > 0);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemInstance> {
        self.stacks.iter()
    }
}
