//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers one async method per
//! request of the combat API, plus manual stepping, queries and the event
//! stream.
use tokio::sync::{broadcast, mpsc, oneshot};

use combat_core::{
    ActionOutcome, ActiveStatus, ActorId, ActorRecord, ArmOutcome, BehaviorParams, EquipSlot,
    ItemInstance, MoveOutcome, Position, SpellId, Tick,
};

use super::errors::{Result, RuntimeError};
use super::events::{ActorView, RuntimeEvent};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime.
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_tx: broadcast::Sender<RuntimeEvent>,
}

impl RuntimeHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<Command>,
        event_tx: broadcast::Sender<RuntimeEvent>,
    ) -> Self {
        Self {
            command_tx,
            event_tx,
        }
    }

    /// Sends a command built around a fresh reply channel and awaits the reply.
    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    // ===== lifecycle =====

    pub async fn spawn(&self, record: ActorRecord) -> Result<()> {
        self.request(|reply| Command::Spawn {
            record,
            behavior: None,
            reply,
        })
        .await?
    }

    pub async fn spawn_monster(&self, record: ActorRecord, params: BehaviorParams) -> Result<()> {
        self.request(|reply| Command::Spawn {
            record,
            behavior: Some(params),
            reply,
        })
        .await?
    }

    /// Removes an actor and returns its final record.
    pub async fn despawn(&self, actor: ActorId) -> Result<ActorRecord> {
        self.request(|reply| Command::Despawn { actor, reply }).await?
    }

    pub async fn revive(&self, actor: ActorId, hp: u32) -> Result<bool> {
        self.request(|reply| Command::Revive { actor, hp, reply })
            .await?
    }

    // ===== requests =====

    pub async fn arm_attack(&self, attacker: ActorId, target: ActorId) -> Result<ArmOutcome> {
        self.request(|reply| Command::ArmAttack {
            attacker,
            target,
            reply,
        })
        .await?
    }

    /// Returns `true` if a session was cancelled.
    pub async fn cancel_attack(&self, attacker: ActorId) -> Result<bool> {
        self.request(|reply| Command::CancelAttack { attacker, reply })
            .await?
    }

    pub async fn start_bandage(&self, actor: ActorId, target: ActorId) -> Result<ActionOutcome> {
        self.request(|reply| Command::StartBandage {
            actor,
            target,
            reply,
        })
        .await?
    }

    pub async fn start_cast(
        &self,
        actor: ActorId,
        target: ActorId,
        spell: SpellId,
    ) -> Result<ActionOutcome> {
        self.request(|reply| Command::StartCast {
            actor,
            target,
            spell,
            reply,
        })
        .await?
    }

    pub async fn move_actor(&self, actor: ActorId, destination: Position) -> Result<MoveOutcome> {
        self.request(|reply| Command::MoveActor {
            actor,
            destination,
            reply,
        })
        .await?
    }

    // ===== inventory and status =====

    /// Equips an item, returning whatever the slot held before.
    pub async fn equip(
        &self,
        actor: ActorId,
        slot: EquipSlot,
        item: ItemInstance,
    ) -> Result<Option<ItemInstance>> {
        self.request(|reply| Command::Equip {
            actor,
            slot,
            item,
            reply,
        })
        .await?
    }

    pub async fn unequip(&self, actor: ActorId, slot: EquipSlot) -> Result<ItemInstance> {
        self.request(|reply| Command::Unequip { actor, slot, reply })
            .await?
    }

    pub async fn set_statuses(&self, actor: ActorId, statuses: Vec<ActiveStatus>) -> Result<()> {
        self.request(|reply| Command::SetStatuses {
            actor,
            statuses,
            reply,
        })
        .await?
    }

    /// Returns the durability points restored.
    pub async fn repair(&self, actor: ActorId, slot: EquipSlot, amount: u16) -> Result<u16> {
        self.request(|reply| Command::Repair {
            actor,
            slot,
            amount,
            reply,
        })
        .await?
    }

    // ===== time =====

    /// Runs `ticks` engine steps now and returns the tick reached.
    pub async fn advance(&self, ticks: u32) -> Result<Tick> {
        self.request(|reply| Command::Advance { ticks, reply }).await
    }

    pub async fn step(&self) -> Result<Tick> {
        self.advance(1).await
    }

    // ===== queries =====

    /// Read-only view of one actor, or `None` if it is not spawned.
    pub async fn query_actor(&self, actor: ActorId) -> Result<Option<ActorView>> {
        self.request(|reply| Command::QueryActor { actor, reply })
            .await
    }

    pub async fn query_actors(&self) -> Result<Vec<ActorId>> {
        self.request(|reply| Command::QueryActors { reply }).await
    }

    /// Current tick and simulated milliseconds.
    pub async fn query_clock(&self) -> Result<(Tick, u64)> {
        self.request(|reply| Command::QueryClock { reply }).await
    }

    // ===== events =====

    /// Subscribe to combat events. Only events published after this call are
    /// received.
    pub fn subscribe_events(&self) -> broadcast::Receiver<RuntimeEvent> {
        self.event_tx.subscribe()
    }
}
