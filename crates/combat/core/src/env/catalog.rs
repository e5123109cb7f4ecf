//! Read-only authored data: items, affixes and spells.
//!
//! Catalog oracles are lookups by stable identifier. The core never mutates
//! catalog data; it only copies definitions into snapshots and packets.

use core::fmt;

use crate::combat::{DamageType, ResistTable};
use crate::state::{AffixId, EquipSlot, ItemHandle, SkillKind, SlotMask, StatusId, VitalKind};

pub trait ItemOracle: Send + Sync {
    fn definition(&self, handle: ItemHandle) -> Option<ItemDefinition>;
}

pub trait AffixOracle: Send + Sync {
    fn affix(&self, id: AffixId) -> Option<AffixDefinition>;

    /// Every known affix in id order. Used by affix rolling.
    fn all_affixes(&self) -> Vec<AffixDefinition>;
}

pub trait SpellOracle: Send + Sync {
    fn spell(&self, id: SpellId) -> Option<SpellDefinition>;
}

/// Item definition: common fields plus type-specific data in `kind`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemDefinition {
    pub handle: ItemHandle,
    pub kind: ItemKind,
    /// Slot the item is worn in, if wearable.
    pub slot: Option<EquipSlot>,
    /// Starting durability for fresh instances. `None` for indestructible items.
    pub max_durability: Option<u16>,
    pub max_stack: u16,
}

impl ItemDefinition {
    pub fn weapon(handle: ItemHandle, data: WeaponData) -> Self {
        Self {
            handle,
            kind: ItemKind::Weapon(data),
            slot: Some(EquipSlot::Weapon),
            max_durability: None,
            max_stack: 1,
        }
    }

    pub fn armor(handle: ItemHandle, slot: EquipSlot, data: ArmorData) -> Self {
        Self {
            handle,
            kind: ItemKind::Armor(data),
            slot: Some(slot),
            max_durability: None,
            max_stack: 1,
        }
    }

    pub fn jewelry(handle: ItemHandle, slot: EquipSlot) -> Self {
        Self {
            handle,
            kind: ItemKind::Jewelry,
            slot: Some(slot),
            max_durability: None,
            max_stack: 1,
        }
    }

    pub fn stackable(handle: ItemHandle, kind: ItemKind, max_stack: u16) -> Self {
        Self {
            handle,
            kind,
            slot: None,
            max_durability: None,
            max_stack,
        }
    }

    pub fn with_durability(mut self, maximum: u16) -> Self {
        self.max_durability = Some(maximum);
        self
    }

    pub fn weapon_data(&self) -> Option<&WeaponData> {
        match &self.kind {
            ItemKind::Weapon(data) => Some(data),
            _ => None,
        }
    }

    pub fn armor_data(&self) -> Option<&ArmorData> {
        match &self.kind {
            ItemKind::Armor(data) => Some(data),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemKind {
    Weapon(WeaponData),
    Armor(ArmorData),
    Jewelry,
    /// Ranged ammunition, consumed one unit per attempt.
    Ammo,
    Bandage,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Handedness {
    #[default]
    OneHanded,
    TwoHanded,
}

/// Authored weapon stats. Also used for the configured unarmed baseline.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeaponData {
    pub handedness: Handedness,
    pub damage_type: DamageType,
    pub min_damage: u32,
    pub max_damage: u32,
    /// Base swing time before any modifier.
    pub swing_ms: u32,
    pub stamina_cost: u32,
    pub skill: SkillKind,
    pub required_skill: u16,
    /// Ammunition consumed per attempt for ranged weapons.
    pub ammo: Option<ItemHandle>,
    /// Attack range; `None` uses the configured melee reach.
    pub range: Option<f32>,
}

impl WeaponData {
    pub const fn melee(min_damage: u32, max_damage: u32, swing_ms: u32, stamina_cost: u32) -> Self {
        Self {
            handedness: Handedness::OneHanded,
            damage_type: DamageType::Physical,
            min_damage,
            max_damage,
            swing_ms,
            stamina_cost,
            skill: SkillKind::Swords,
            required_skill: 0,
            ammo: None,
            range: None,
        }
    }

    pub const fn ranged(mut self, ammo: ItemHandle, range: f32) -> Self {
        self.ammo = Some(ammo);
        self.range = Some(range);
        self.skill = SkillKind::Archery;
        self.handedness = Handedness::TwoHanded;
        self
    }

    pub const fn with_skill(mut self, skill: SkillKind, required: u16) -> Self {
        self.skill = skill;
        self.required_skill = required;
        self
    }

    pub const fn with_damage_type(mut self, damage_type: DamageType) -> Self {
        self.damage_type = damage_type;
        self
    }
}

/// Base resistances in whole percentage points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArmorData {
    pub resists: ResistTable<i32>,
}

impl ArmorData {
    pub fn with_resist(mut self, channel: DamageType, pct: i32) -> Self {
        self.resists.set(channel, pct);
        self
    }
}

/// How repeated instances of the same affix combine across worn items.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StackPolicy {
    #[default]
    Sum,
    HighestOnly,
    /// Only the first instance in slot order counts.
    NoStack,
}

/// What an affix modifies. Magnitudes are whole percentage points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AffixStat {
    HitChance,
    DefenseChance,
    DamageIncrease,
    SwingSpeed,
    Resist(DamageType),
    /// Proc chance for the given spell. Only honoured on the active weapon.
    HitSpell(SpellId),
    /// Leach percent into the given vital. Only honoured on the active weapon.
    Leach(VitalKind),
}

impl AffixStat {
    /// Weapon-only affixes feed the proc profile, not the snapshot modifiers.
    pub const fn is_proc(self) -> bool {
        matches!(self, Self::HitSpell(_) | Self::Leach(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AffixDefinition {
    pub id: AffixId,
    pub stat: AffixStat,
    pub stacking: StackPolicy,
    /// Inclusive magnitude range for rolls and sanitization.
    pub min: i32,
    pub max: i32,
    /// Slots this affix may roll on.
    pub slots: SlotMask,
}

impl AffixDefinition {
    pub const fn new(id: AffixId, stat: AffixStat, min: i32, max: i32) -> Self {
        Self {
            id,
            stat,
            stacking: StackPolicy::Sum,
            min,
            max,
            slots: SlotMask::all(),
        }
    }

    pub const fn stacking(mut self, policy: StackPolicy) -> Self {
        self.stacking = policy;
        self
    }

    pub const fn on_slots(mut self, slots: SlotMask) -> Self {
        self.slots = slots;
        self
    }

    pub fn clamp(&self, magnitude: i32) -> i32 {
        magnitude.clamp(self.min, self.max.max(self.min))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellId(pub u16);

impl fmt::Display for SpellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "spell:{}", self.0)
    }
}

/// Authored spell used by both channeled casts and hit-spell procs.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellDefinition {
    pub id: SpellId,
    pub damage_type: DamageType,
    pub min_damage: u32,
    pub max_damage: u32,
    /// Status requested from the status system on landing, if any.
    pub status: Option<StatusId>,
    pub mana_cost: u32,
    pub cast_ms: u32,
    pub range: Option<f32>,
}

impl SpellDefinition {
    pub const fn bolt(id: SpellId, damage_type: DamageType, min_damage: u32, max_damage: u32) -> Self {
        Self {
            id,
            damage_type,
            min_damage,
            max_damage,
            status: None,
            mana_cost: 0,
            cast_ms: 0,
            range: None,
        }
    }

    pub const fn with_cost(mut self, mana_cost: u32, cast_ms: u32) -> Self {
        self.mana_cost = mana_cost;
        self.cast_ms = cast_ms;
        self
    }

    pub const fn with_status(mut self, status: StatusId) -> Self {
        self.status = Some(status);
        self
    }
}
