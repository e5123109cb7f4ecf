//! Typed combat events and the queue they are published through.
//!
//! Components push events as they happen; the composition root drains the
//! queue once per tick and hands the batch to presentation, replication and
//! the death/loot systems. Ordering within a batch is emission order.

use crate::channel::InterruptCause;
use crate::combat::{DamageType, PacketOrigin};
use crate::env::SpellId;
use crate::state::{ActorId, EquipSlot, ItemHandle, StatusId, VitalKind};
use crate::tracker::CombatState;

/// Why an attack session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CancelReason {
    /// The attacker asked to stop.
    Disengaged,
    /// The attacker armed a different target.
    Replaced,
    AttackerInvalid,
    TargetInvalid,
    OutOfRange,
    /// The legality collaborator no longer permits the attack.
    Illegal,
    Death,
    Despawn,
}

/// Details handed to the death/loot collaborator with [`CombatEvent::ActorKilled`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KillContext {
    pub origin: PacketOrigin,
    pub damage_type: DamageType,
    /// Simulation time of the killing blow.
    pub at_ms: u64,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatEvent {
    AttackArmed {
        attacker: ActorId,
        target: ActorId,
    },
    AttackCancelled {
        attacker: ActorId,
        target: ActorId,
        reason: CancelReason,
    },
    Miss {
        attacker: ActorId,
        target: ActorId,
        hit_chance: f32,
    },
    Hit {
        attacker: ActorId,
        target: ActorId,
        /// Rolled damage before increase and mitigation.
        raw: u32,
        /// Damage after mitigation.
        amount: u32,
        /// HP actually removed.
        dealt: u32,
        damage_type: DamageType,
    },
    ProcTriggered {
        attacker: ActorId,
        target: ActorId,
        spell: SpellId,
        dealt: u32,
    },
    /// A landed spell asks the status system to apply a status.
    StatusRequested {
        source: ActorId,
        target: ActorId,
        status: StatusId,
    },
    Healed {
        source: ActorId,
        target: ActorId,
        vital: VitalKind,
        amount: u32,
        origin: PacketOrigin,
    },
    BandageStarted {
        actor: ActorId,
        target: ActorId,
        duration_ms: u32,
    },
    BandageInterrupted {
        actor: ActorId,
        target: ActorId,
        cause: InterruptCause,
    },
    BandageCompleted {
        actor: ActorId,
        target: ActorId,
        healed: u32,
    },
    CastStarted {
        actor: ActorId,
        target: ActorId,
        spell: SpellId,
        duration_ms: u32,
    },
    CastInterrupted {
        actor: ActorId,
        target: ActorId,
        spell: SpellId,
        cause: InterruptCause,
    },
    CastCompleted {
        actor: ActorId,
        target: ActorId,
        spell: SpellId,
        dealt: u32,
    },
    ItemBroken {
        owner: ActorId,
        slot: EquipSlot,
        item: ItemHandle,
    },
    StateChanged {
        actor: ActorId,
        from: CombatState,
        to: CombatState,
    },
    /// Sole handoff to loot/corpse logic. Emitted once per death.
    ActorKilled {
        killer: ActorId,
        victim: ActorId,
        context: KillContext,
    },
}

impl CombatEvent {
    /// Short name for logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AttackArmed { .. } => "attack_armed",
            Self::AttackCancelled { .. } => "attack_cancelled",
            Self::Miss { .. } => "miss",
            Self::Hit { .. } => "hit",
            Self::ProcTriggered { .. } => "proc_triggered",
            Self::StatusRequested { .. } => "status_requested",
            Self::Healed { .. } => "healed",
            Self::BandageStarted { .. } => "bandage_started",
            Self::BandageInterrupted { .. } => "bandage_interrupted",
            Self::BandageCompleted { .. } => "bandage_completed",
            Self::CastStarted { .. } => "cast_started",
            Self::CastInterrupted { .. } => "cast_interrupted",
            Self::CastCompleted { .. } => "cast_completed",
            Self::ItemBroken { .. } => "item_broken",
            Self::StateChanged { .. } => "state_changed",
            Self::ActorKilled { .. } => "actor_killed",
        }
    }
}

/// FIFO of events produced during a tick.
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    events: Vec<CombatEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: CombatEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CombatEvent> {
        self.events.iter()
    }

    /// Takes every queued event, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }
}
