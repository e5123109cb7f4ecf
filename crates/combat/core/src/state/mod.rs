//! Mutable, server-owned state: actors, items, equipment and status inputs.
mod actor;
mod common;
mod equipment;
mod item;
mod status;

pub use actor::{ActorRecord, Attributes, SkillKind, Skills, VitalKind, Vitals};
pub use common::{ActorId, Position, ResourceMeter, Tick};
pub use equipment::{Backpack, EquipSlot, Equipment, SlotMask};
pub use item::{
    AffixId, AffixInstance, AffixList, Durability, ItemHandle, ItemInstance, ModifierState,
};
pub use status::{ActionGates, ActiveStatus, StatusId};
