//! Server-authoritative real-time combat resolution.
//!
//! `combat-core` turns attack, bandage and cast requests into deterministic
//! outcomes on a fixed tick. Every actor's derived numbers live in a cached
//! [`stats::CombatSnapshot`], every swing runs the same fixed-order pipeline
//! in [`combat::CombatResolver`], and every random roll is keyed by
//! `(actor, roll kind, event sequence)` so replays reproduce bit for bit.
//! All state mutation flows through [`engine::CombatEngine`]; host crates
//! depend on the types re-exported here.
pub mod affix;
pub mod ai;
pub mod channel;
pub mod combat;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod events;
pub mod scheduler;
pub mod state;
pub mod stats;
pub mod tracker;

pub use affix::{
    AffixContext, AffixCountTable, AffixResolver, RarityTier, SanitizeReport, roll_affixes,
    sanitize_affixes, sanitize_item,
};
pub use ai::{BehaviorParams, BrainContext, MonsterBrain, MonsterState};
pub use channel::{Channel, ChannelKind, InterruptCause, InterruptPolicy};
pub use combat::{DamageType, PacketOrigin, ResistTable};
pub use config::CombatConfig;
pub use engine::{ActionOutcome, ArmOutcome, CombatEngine, MoveOutcome, Refusal};
pub use env::{
    AffixDefinition, AffixOracle, AffixStat, AllowAll, ArmorData, AttackLegality,
    CatalogSnapshot, CombatEnv, Handedness, ItemDefinition, ItemKind, ItemOracle, LegalityOracle,
    Oracles, PcgRng, RngOracle, RollKey, RollKind, SpellDefinition, SpellId, SpellOracle,
    StackPolicy, WeaponData,
};
pub use error::{CombatError, ErrorSeverity, GameError};
pub use events::{CancelReason, CombatEvent, EventQueue, KillContext};
pub use scheduler::{AttackSession, CombatScheduler, SessionPhase};
pub use state::{
    ActionGates, ActiveStatus, ActorId, ActorRecord, AffixId, AffixInstance, AffixList, Attributes,
    Backpack, Durability, EquipSlot, Equipment, ItemHandle, ItemInstance, ModifierState,
    Position, ResourceMeter, SkillKind, Skills, StatusId, Tick, VitalKind, Vitals,
};
pub use stats::{CombatSnapshot, WeaponProfile};
pub use tracker::{CombatState, CombatStateTracker};
