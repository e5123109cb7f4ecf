//! Damage channels, packets and the vitals mutator.

use strum::{EnumCount, EnumIter};

use crate::state::{ActorId, ResourceMeter, VitalKind};

/// Damage channel, each with its own resistance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumCount, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DamageType {
    Physical,
    Fire,
    Cold,
    Poison,
    Energy,
}

impl DamageType {
    /// Every channel in declaration order (matches table indexing).
    pub const ALL: [DamageType; DamageType::COUNT] = [
        Self::Physical,
        Self::Fire,
        Self::Cold,
        Self::Poison,
        Self::Energy,
    ];
}

/// One value per damage channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResistTable<T> {
    values: [T; DamageType::COUNT],
}

impl<T: Copy> ResistTable<T> {
    pub const fn splat(value: T) -> Self {
        Self {
            values: [value; DamageType::COUNT],
        }
    }

    pub fn get(&self, channel: DamageType) -> T {
        self.values[channel as usize]
    }

    pub fn set(&mut self, channel: DamageType, value: T) {
        self.values[channel as usize] = value;
    }

    pub fn with(mut self, channel: DamageType, value: T) -> Self {
        self.set(channel, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (DamageType, T)> + '_ {
        DamageType::ALL
            .into_iter()
            .map(|channel| (channel, self.get(channel)))
    }

    pub fn map<U: Copy>(&self, mut f: impl FnMut(DamageType, T) -> U) -> ResistTable<U> {
        ResistTable {
            values: core::array::from_fn(|i| f(DamageType::ALL[i], self.values[i])),
        }
    }
}

impl ResistTable<i32> {
    /// Channel-wise sum.
    pub fn add(&mut self, other: &ResistTable<i32>) {
        for (lhs, rhs) in self.values.iter_mut().zip(other.values.iter()) {
            *lhs += *rhs;
        }
    }
}

/// Where a packet came from. Carried into events for presentation and for
/// armor-wear gating.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PacketOrigin {
    Weapon,
    Spell,
    Proc,
    Dot,
    Bandage,
    Leach,
    Regeneration,
}

/// A single application of damage.
///
/// Not `Clone`: a packet is built once and consumed exactly once by
/// [`apply_damage`].
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a damage packet does nothing until applied"]
pub struct DamagePacket {
    pub source: ActorId,
    pub target: ActorId,
    /// Rolled amount before increase and mitigation.
    pub raw: u32,
    /// Amount after increase and mitigation.
    pub amount: u32,
    pub damage_type: DamageType,
    pub origin: PacketOrigin,
}

/// A single application of healing to one vital.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a heal packet does nothing until applied"]
pub struct HealPacket {
    pub source: ActorId,
    pub target: ActorId,
    pub vital: VitalKind,
    pub amount: u32,
    pub origin: PacketOrigin,
}

/// Result of consuming a damage packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppliedDamage {
    pub source: ActorId,
    pub target: ActorId,
    /// Rolled amount before modifiers.
    pub raw: u32,
    /// Mitigated amount the packet carried.
    pub amount: u32,
    /// HP actually removed (never more than the target had).
    pub dealt: u32,
    pub damage_type: DamageType,
    pub origin: PacketOrigin,
    /// Whether this packet took HP to zero.
    pub lethal: bool,
}

/// Consumes a damage packet against the target's HP.
pub fn apply_damage(packet: DamagePacket, hp: &mut ResourceMeter) -> AppliedDamage {
    let was_alive = !hp.is_empty();
    let dealt = hp.drain(packet.amount);
    AppliedDamage {
        source: packet.source,
        target: packet.target,
        raw: packet.raw,
        amount: packet.amount,
        dealt,
        damage_type: packet.damage_type,
        origin: packet.origin,
        lethal: was_alive && hp.is_empty(),
    }
}

/// Consumes a heal packet, returning the amount actually restored.
pub fn apply_heal(packet: HealPacket, meter: &mut ResourceMeter) -> u32 {
    meter.restore(packet.amount)
}

/// `base * (1 + increase)`, never negative.
pub fn increase(base: u32, increase: f32) -> f32 {
    (base as f32 * (1.0 + increase)).max(0.0)
}

/// `round(amount * (1 - resist))` with half-away-from-zero rounding.
pub fn mitigate(amount: f32, resist: f32) -> u32 {
    (amount * (1.0 - resist.clamp(0.0, 1.0))).round().max(0.0) as u32
}
