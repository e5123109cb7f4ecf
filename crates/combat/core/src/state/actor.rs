//! Server-side actor record.
//!
//! The record owns everything the combat core mutates for one actor: vitals,
//! equipment, carried consumables and the published [`CombatSnapshot`].
//! Attack sessions and combat state live in their owning components keyed by
//! [`ActorId`].

use strum::{EnumCount, EnumIter};

use super::{ActiveStatus, ActorId, Backpack, Equipment, Position, ResourceMeter};
use crate::stats::CombatSnapshot;

/// Primary attributes read by the stat aggregator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attributes {
    pub str: u16,
    pub dex: u16,
    pub int: u16,
}

impl Attributes {
    pub const fn new(str: u16, dex: u16, int: u16) -> Self {
        Self { str, dex, int }
    }
}

impl Default for Attributes {
    fn default() -> Self {
        Self::new(50, 50, 50)
    }
}

/// Skills referenced by weapon requirements and consumable actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumCount, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SkillKind {
    Swords,
    Maces,
    Fencing,
    Archery,
    Wrestling,
    Healing,
    Magery,
}

/// Skill values in tenths of a point are not modelled; values are whole points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Skills {
    values: [u16; SkillKind::COUNT],
}

impl Skills {
    pub fn get(&self, skill: SkillKind) -> u16 {
        self.values[skill as usize]
    }

    pub fn set(&mut self, skill: SkillKind, value: u16) {
        self.values[skill as usize] = value;
    }

    pub fn with(mut self, skill: SkillKind, value: u16) -> Self {
        self.set(skill, value);
        self
    }
}

/// Which resource pool a heal, leach or cost refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumCount, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VitalKind {
    Health,
    Stamina,
    Mana,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vitals {
    pub hp: ResourceMeter,
    pub stamina: ResourceMeter,
    pub mana: ResourceMeter,
}

impl Vitals {
    pub fn full(hp: u32, stamina: u32, mana: u32) -> Self {
        Self {
            hp: ResourceMeter::full(hp),
            stamina: ResourceMeter::full(stamina),
            mana: ResourceMeter::full(mana),
        }
    }

    pub fn get(&self, kind: VitalKind) -> &ResourceMeter {
        match kind {
            VitalKind::Health => &self.hp,
            VitalKind::Stamina => &self.stamina,
            VitalKind::Mana => &self.mana,
        }
    }

    pub fn get_mut(&mut self, kind: VitalKind) -> &mut ResourceMeter {
        match kind {
            VitalKind::Health => &mut self.hp,
            VitalKind::Stamina => &mut self.stamina,
            VitalKind::Mana => &mut self.mana,
        }
    }
}

/// Complete server-side record of one actor.
///
/// # Invariants
///
/// - `snapshot` reflects `attributes`, `skills`, `equipment` and `statuses`
///   whenever `snapshot_dirty` is false.
/// - Only the stat aggregator publishes a snapshot; every other component
///   reads it through [`ActorRecord::snapshot`].
#[derive(Clone, Debug, PartialEq)]
pub struct ActorRecord {
    pub id: ActorId,
    pub position: Position,
    /// Anchor for leash checks (spawn point).
    pub home: Position,
    pub attributes: Attributes,
    pub skills: Skills,
    pub vitals: Vitals,
    pub equipment: Equipment,
    pub backpack: Backpack,
    pub statuses: Vec<ActiveStatus>,

    snapshot: CombatSnapshot,
    snapshot_dirty: bool,
    event_sequence: u64,
}

impl ActorRecord {
    pub fn new(id: ActorId, position: Position, vitals: Vitals) -> Self {
        Self {
            id,
            position,
            home: position,
            attributes: Attributes::default(),
            skills: Skills::default(),
            vitals,
            equipment: Equipment::empty(),
            backpack: Backpack::new(),
            statuses: Vec::new(),
            snapshot: CombatSnapshot::default(),
            snapshot_dirty: true,
            event_sequence: 0,
        }
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_skills(mut self, skills: Skills) -> Self {
        self.skills = skills;
        self
    }

    pub fn with_equipment(mut self, equipment: Equipment) -> Self {
        self.equipment = equipment;
        self.snapshot_dirty = true;
        self
    }

    pub fn with_backpack(mut self, backpack: Backpack) -> Self {
        self.backpack = backpack;
        self
    }

    pub fn with_statuses(mut self, statuses: Vec<ActiveStatus>) -> Self {
        self.statuses = statuses;
        self.snapshot_dirty = true;
        self
    }

    pub fn is_alive(&self) -> bool {
        !self.vitals.hp.is_empty()
    }

    /// Last published snapshot.
    pub fn snapshot(&self) -> &CombatSnapshot {
        &self.snapshot
    }

    pub fn is_dirty(&self) -> bool {
        self.snapshot_dirty
    }

    /// Flags the snapshot for recompute before its next read.
    pub fn mark_dirty(&mut self) {
        self.snapshot_dirty = true;
    }

    pub(crate) fn publish_snapshot(&mut self, snapshot: CombatSnapshot) {
        self.snapshot = snapshot;
        self.snapshot_dirty = false;
    }

    /// Allocates the next event sequence number used to key deterministic rolls.
    pub fn next_sequence(&mut self) -> u64 {
        let sequence = self.event_sequence;
        self.event_sequence += 1;
        sequence
    }

    pub fn event_sequence(&self) -> u64 {
        self.event_sequence
    }
}
