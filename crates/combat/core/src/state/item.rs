//! Server-owned item instances.
//!
//! Catalog data (what an item *is*) lives behind [`crate::env::ItemOracle`];
//! this module holds the mutable, per-instance part: durability, rolled affixes
//! and stack count.

use core::fmt;

use arrayvec::ArrayVec;

use crate::config::CombatConfig;

/// Reference to an item definition stored outside the core (lookup via the catalog).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemHandle(pub u32);

impl fmt::Display for ItemHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item:{}", self.0)
    }
}

/// Stable identifier of an affix definition in the affix catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AffixId(pub u16);

impl fmt::Display for AffixId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "affix:{}", self.0)
    }
}

/// A rolled modifier attached to an item instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AffixInstance {
    pub id: AffixId,
    pub magnitude: i32,
}

impl AffixInstance {
    pub const fn new(id: AffixId, magnitude: i32) -> Self {
        Self { id, magnitude }
    }
}

/// Affix list bounded by the global cap.
pub type AffixList = ArrayVec<AffixInstance, { CombatConfig::MAX_AFFIXES }>;

/// Whether an item carries bonus modifiers.
///
/// `NoBonusModifiers` is distinct from an empty `Magical` item: the roll
/// happened and produced nothing, which downstream pricing and display rely on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModifierState {
    /// Never rolled (plain crafted or vendor stock).
    #[default]
    Unrolled,
    /// Rolled, but the roll produced zero affixes.
    NoBonusModifiers,
    /// Carries at least one affix.
    Magical,
}

impl ModifierState {
    /// State implied by a rolled or sanitized affix count.
    pub const fn for_count(count: usize) -> Self {
        if count == 0 {
            Self::NoBonusModifiers
        } else {
            Self::Magical
        }
    }
}

/// Wear state of an item.
///
/// `current` only ever goes down, except through [`Durability::repair`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Durability {
    pub current: u16,
    pub maximum: u16,
}

impl Durability {
    pub const fn new(maximum: u16) -> Self {
        Self {
            current: maximum,
            maximum,
        }
    }

    pub const fn is_broken(&self) -> bool {
        self.current == 0
    }

    /// Applies wear. Returns `true` only on the call that breaks the item.
    pub fn wear(&mut self, amount: u16) -> bool {
        if self.is_broken() || amount == 0 {
            return false;
        }
        self.current = self.current.saturating_sub(amount);
        self.is_broken()
    }

    /// Restores up to `amount` points, returning the points restored.
    pub fn repair(&mut self, amount: u16) -> u16 {
        let restored = amount.min(self.maximum.saturating_sub(self.current));
        self.current += restored;
        restored
    }
}

/// A mutable, server-owned item.
///
/// A broken item stays a valid object (it can be traded, dropped or repaired)
/// but contributes nothing to its owner's snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemInstance {
    pub handle: ItemHandle,
    pub stack: u16,
    /// `None` for items that never wear (ammunition, bandages).
    pub durability: Option<Durability>,
    pub affixes: AffixList,
    pub modifier_state: ModifierState,
}

impl ItemInstance {
    pub fn new(handle: ItemHandle) -> Self {
        Self {
            handle,
            stack: 1,
            durability: None,
            affixes: AffixList::new(),
            modifier_state: ModifierState::Unrolled,
        }
    }

    /// A stack of `count` consumables.
    pub fn stack_of(handle: ItemHandle, count: u16) -> Self {
        Self {
            stack: count,
            ..Self::new(handle)
        }
    }

    pub fn with_durability(mut self, maximum: u16) -> Self {
        self.durability = Some(Durability::new(maximum));
        self
    }

    pub fn with_affixes(mut self, affixes: AffixList, state: ModifierState) -> Self {
        self.affixes = affixes;
        self.modifier_state = state;
        self
    }

    pub fn is_broken(&self) -> bool {
        self.durability.is_some_and(|d| d.is_broken())
    }

    /// Affixes that currently contribute to the owner's snapshot.
    pub fn active_affixes(&self) -> &[AffixInstance] {
        if self.is_broken() {
            &[]
        } else {
            &self.affixes
        }
    }

    /// Applies wear. Returns `true` only on the call that breaks the item.
    pub fn wear(&mut self, amount: u16) -> bool {
        match self.durability.as_mut() {
            Some(durability) => durability.wear(amount),
            None => false,
        }
    }

    /// Explicit repair, the only way durability increases.
    pub fn repair(&mut self, amount: u16) -> u16 {
        match self.durability.as_mut() {
            Some(durability) => durability.repair(amount),
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wear_reports_break_once() {
        let mut item = ItemInstance::new(ItemHandle(1)).with_durability(2);
        assert!(!item.wear(1));
        assert!(item.wear(1));
        assert!(item.is_broken());
        assert!(!item.wear(1));
        assert_eq!(item.durability.map(|d| d.current), Some(0));
    }

    #[test]
    fn broken_item_exposes_no_affixes() {
        let mut affixes = AffixList::new();
        affixes.push(AffixInstance::new(AffixId(1), 10));
        let mut item = ItemInstance::new(ItemHandle(1))
            .with_durability(1)
            .with_affixes(affixes, ModifierState::Magical);

        assert_eq!(item.active_affixes().len(), 1);
        item.wear(5);
        assert!(item.active_affixes().is_empty());
        // The affixes are still on the object, just inactive.
        assert_eq!(item.affixes.len(), 1);
    }

    #[test]
    fn repair_restores_contribution() {
        let mut item = ItemInstance::new(ItemHandle(1)).with_durability(10);
        item.wear(10);
        assert!(item.is_broken());
        assert_eq!(item.repair(4), 4);
        assert!(!item.is_broken());
        assert_eq!(item.repair(100), 6);
    }

    #[test]
    fn repair_of_overfull_durability_restores_nothing() {
        let mut durability = Durability {
            current: 10,
            maximum: 5,
        };
        assert_eq!(durability.repair(3), 0);
        assert_eq!(durability.current, 10);
    }

    #[test]
    fn consumables_never_wear() {
        let mut bandages = ItemInstance::stack_of(ItemHandle(9), 20);
        assert!(!bandages.wear(3));
        assert!(!bandages.is_broken());
    }
}
