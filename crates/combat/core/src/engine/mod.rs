//! Composition root.
//!
//! [`CombatEngine`] owns the actor registry and every combat component, and
//! exposes the request API (`arm_attack`, `cancel_attack`, `start_bandage`,
//! ...). Player intents and monster decisions go through the same entry
//! points. Lifecycle is explicit: the host calls `on_spawn`/`on_despawn` and
//! drives time with [`CombatEngine::tick`].

mod brain;
mod registry;
mod tick;

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

pub use registry::ActorRegistry;

use crate::affix::{AffixContext, roll_affixes, sanitize_item};
use crate::ai::{BehaviorParams, MonsterBrain};
use crate::channel::{Channel, ChannelBook, ChannelKind, ChannelPolicies, InterruptCause};
use crate::combat::{HealPacket, PacketOrigin, apply_heal};
use crate::config::CombatConfig;
use crate::env::{Oracles, SpellId};
use crate::error::CombatError;
use crate::events::{CancelReason, CombatEvent, EventQueue};
use crate::scheduler::{ArmResult, AttackSession, CombatScheduler};
use crate::state::{
    ActiveStatus, ActorId, ActorRecord, Durability, EquipSlot, ItemHandle, ItemInstance, Position,
    Tick,
};
use crate::stats::{ActorInputs, CombatSnapshot, recompute};
use crate::tracker::{CombatState, CombatStateTracker};

/// Result of an attack request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ArmOutcome {
    Armed,
    /// Already attacking this target; the running timer is untouched.
    AlreadyArmed,
    Replaced {
        previous: ActorId,
    },
    /// Silently refused: dead attacker or target, or not legal.
    Refused,
}

/// Why a channel or movement request was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Refusal {
    Dead,
    Gated,
    OutOfRange,
    NoConsumable,
    InsufficientMana,
    /// Already channeling.
    Busy,
    Illegal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionOutcome {
    Started { duration_ms: u32 },
    Refused(Refusal),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveOutcome {
    Moved,
    Refused(Refusal),
}

pub struct CombatEngine {
    config: CombatConfig,
    oracles: Oracles,
    registry: ActorRegistry,
    scheduler: CombatScheduler,
    tracker: CombatStateTracker,
    channels: ChannelBook,
    brains: BTreeMap<ActorId, MonsterBrain>,
    events: EventQueue,
    tick: Tick,
    now_ms: u64,
}

impl CombatEngine {
    pub fn new(config: CombatConfig, oracles: Oracles) -> Self {
        let tracker = CombatStateTracker::new(config.disengage_ms);
        Self {
            config,
            oracles,
            registry: ActorRegistry::new(),
            scheduler: CombatScheduler::new(),
            tracker,
            channels: ChannelBook::new(),
            brains: BTreeMap::new(),
            events: EventQueue::new(),
            tick: Tick::ZERO,
            now_ms: 0,
        }
    }

    // ===== lifecycle =====

    /// Registers an actor. Starting equipment is prepared like an equip and the
    /// first snapshot is published before this returns.
    pub fn on_spawn(&mut self, mut record: ActorRecord) -> Result<(), CombatError> {
        let id = record.id;
        if self.registry.contains(id) {
            return Err(CombatError::AlreadySpawned(id));
        }
        for (_, item) in record.equipment.iter_mut() {
            self.prepare_item(item);
        }
        record.mark_dirty();
        self.registry.insert(record);
        self.tracker.register(id);
        self.refresh(id);
        info!(target: "combat::engine", actor = %id, "actor spawned");
        Ok(())
    }

    /// Registers an actor driven by a monster decision loop.
    pub fn on_spawn_monster(
        &mut self,
        record: ActorRecord,
        params: BehaviorParams,
    ) -> Result<(), CombatError> {
        let id = record.id;
        self.on_spawn(record)?;
        self.brains.insert(id, MonsterBrain::new(params));
        Ok(())
    }

    /// Removes an actor. Every session and channel touching it ends; no
    /// `ActorKilled` is emitted.
    pub fn on_despawn(&mut self, id: ActorId) -> Result<ActorRecord, CombatError> {
        if !self.registry.contains(id) {
            return Err(CombatError::ActorNotFound(id));
        }
        self.end_involvement(id, CancelReason::Despawn);
        self.brains.remove(&id);
        self.tracker.unregister(id);
        let record = self
            .registry
            .remove(id)
            .ok_or(CombatError::ActorNotFound(id))?;
        info!(target: "combat::engine", actor = %id, "actor despawned");
        Ok(record)
    }

    // ===== request API =====

    pub fn arm_attack(
        &mut self,
        attacker: ActorId,
        target: ActorId,
    ) -> Result<ArmOutcome, CombatError> {
        if attacker == target {
            return Err(CombatError::SelfTarget(attacker));
        }
        let record = self.record(attacker)?;
        self.record(target)?;
        if !record.is_alive() || self.tracker.is_dead(attacker) {
            return Ok(ArmOutcome::Refused);
        }

        let legality = self.oracles.legality.check(attacker, target);
        let resolved = legality.target;
        if !legality.allowed || resolved == attacker || !self.is_living(resolved) {
            debug!(target: "combat::engine", attacker = %attacker, target = %target, "attack refused");
            return Ok(ArmOutcome::Refused);
        }

        let outcome = match self.scheduler.arm(attacker, resolved, self.now_ms) {
            ArmResult::AlreadyArmed => return Ok(ArmOutcome::AlreadyArmed),
            ArmResult::Armed => ArmOutcome::Armed,
            ArmResult::Replaced { previous } => {
                self.events.push(CombatEvent::AttackCancelled {
                    attacker,
                    target: previous,
                    reason: CancelReason::Replaced,
                });
                ArmOutcome::Replaced { previous }
            }
        };
        self.tracker.notify_engaged(attacker, &mut self.events);
        self.events.push(CombatEvent::AttackArmed {
            attacker,
            target: resolved,
        });
        Ok(outcome)
    }

    /// Disengages. Returns whether a session was running.
    ///
    /// Combat state is untouched; only the engagement window ends combat.
    pub fn cancel_attack(&mut self, attacker: ActorId) -> Result<bool, CombatError> {
        self.record(attacker)?;
        Ok(self.cancel_session(attacker, CancelReason::Disengaged))
    }

    /// Starts a bandage on `target` (which may be the actor). One bandage is
    /// spent immediately and is lost if the channel is interrupted.
    pub fn start_bandage(
        &mut self,
        actor: ActorId,
        target: ActorId,
    ) -> Result<ActionOutcome, CombatError> {
        self.record(target)?;
        self.refresh(actor);
        let record = self.record(actor)?;
        let bandage = self.config.bandage;

        let refusal = if !record.is_alive() || !self.is_living(target) {
            Some(Refusal::Dead)
        } else if !record.snapshot().can_bandage() {
            Some(Refusal::Gated)
        } else if self.channels.is_channeling(actor) {
            Some(Refusal::Busy)
        } else if actor != target && self.distance(actor, target) > Some(bandage.range) {
            Some(Refusal::OutOfRange)
        } else if record.backpack.count(bandage.item) == 0 {
            Some(Refusal::NoConsumable)
        } else {
            None
        };
        if let Some(refusal) = refusal {
            return Ok(ActionOutcome::Refused(refusal));
        }

        let base_ms = if actor == target {
            bandage.self_ms
        } else {
            bandage.other_ms
        };
        let record = self
            .registry
            .get_mut(actor)
            .ok_or(CombatError::ActorNotFound(actor))?;
        record.backpack.consume(bandage.item, 1);
        let duration_ms = scale_ms(base_ms, record.snapshot().bandage_multiplier);
        let sequence = record.next_sequence();

        self.begin_channel(Channel {
            actor,
            target,
            kind: ChannelKind::Bandage,
            remaining_ms: duration_ms,
            total_ms: duration_ms,
            sequence,
        });
        self.events.push(CombatEvent::BandageStarted {
            actor,
            target,
            duration_ms,
        });
        Ok(ActionOutcome::Started { duration_ms })
    }

    /// Starts channeling a damage spell. Mana is spent up front.
    pub fn start_cast(
        &mut self,
        actor: ActorId,
        target: ActorId,
        spell: SpellId,
    ) -> Result<ActionOutcome, CombatError> {
        if actor == target {
            return Err(CombatError::SelfTarget(actor));
        }
        self.record(target)?;
        let definition = self
            .oracles
            .spells
            .spell(spell)
            .ok_or(CombatError::SpellNotFound(spell))?;
        self.refresh(actor);
        let record = self.record(actor)?;
        let range = definition
            .range
            .unwrap_or(self.config.spellcast.default_range);

        let refusal = if !record.is_alive() || !self.is_living(target) {
            Some(Refusal::Dead)
        } else if !record.snapshot().can_cast() {
            Some(Refusal::Gated)
        } else if self.channels.is_channeling(actor) {
            Some(Refusal::Busy)
        } else if self.distance(actor, target) > Some(range) {
            Some(Refusal::OutOfRange)
        } else if !self.oracles.legality.check(actor, target).allowed {
            Some(Refusal::Illegal)
        } else if record.vitals.mana.current < definition.mana_cost {
            Some(Refusal::InsufficientMana)
        } else {
            None
        };
        if let Some(refusal) = refusal {
            return Ok(ActionOutcome::Refused(refusal));
        }

        let record = self
            .registry
            .get_mut(actor)
            .ok_or(CombatError::ActorNotFound(actor))?;
        record.vitals.mana.drain(definition.mana_cost);
        let duration_ms = scale_ms(definition.cast_ms, record.snapshot().cast_multiplier);
        let sequence = record.event_sequence();

        self.begin_channel(Channel {
            actor,
            target,
            kind: ChannelKind::Spell(spell),
            remaining_ms: duration_ms,
            total_ms: duration_ms,
            sequence,
        });
        self.events.push(CombatEvent::CastStarted {
            actor,
            target,
            spell,
            duration_ms,
        });
        Ok(ActionOutcome::Started { duration_ms })
    }

    /// Moves an actor. A real position change interrupts channels whose
    /// policy honours movement.
    pub fn move_actor(
        &mut self,
        actor: ActorId,
        destination: Position,
    ) -> Result<MoveOutcome, CombatError> {
        self.refresh(actor);
        let record = self
            .registry
            .get_mut(actor)
            .ok_or(CombatError::ActorNotFound(actor))?;
        if !record.is_alive() {
            return Ok(MoveOutcome::Refused(Refusal::Dead));
        }
        if !record.snapshot().can_move() {
            return Ok(MoveOutcome::Refused(Refusal::Gated));
        }
        if record.position == destination {
            return Ok(MoveOutcome::Moved);
        }
        record.position = destination;
        self.interrupt(actor, InterruptCause::Movement);
        Ok(MoveOutcome::Moved)
    }

    /// Equips an item, returning whatever the slot held before.
    pub fn equip(
        &mut self,
        actor: ActorId,
        slot: EquipSlot,
        mut item: ItemInstance,
    ) -> Result<Option<ItemInstance>, CombatError> {
        self.record(actor)?;
        let definition = self
            .oracles
            .items
            .definition(item.handle)
            .ok_or(CombatError::ItemNotFound(item.handle))?;
        if definition.slot != Some(slot) {
            return Err(CombatError::SlotMismatch {
                item: item.handle,
                slot,
            });
        }
        self.prepare_item(&mut item);

        let previous = self.with_record(actor, |record| {
            let previous = record.equipment.equip(slot, item);
            record.mark_dirty();
            previous
        })?;
        self.refresh(actor);
        Ok(previous)
    }

    pub fn unequip(&mut self, actor: ActorId, slot: EquipSlot) -> Result<ItemInstance, CombatError> {
        let item = self
            .with_record(actor, |record| {
                let item = record.equipment.unequip(slot);
                record.mark_dirty();
                item
            })?
            .ok_or(CombatError::EmptySlot { actor, slot })?;
        self.refresh(actor);
        Ok(item)
    }

    /// Replaces the externally computed status set.
    pub fn set_statuses(
        &mut self,
        actor: ActorId,
        statuses: Vec<ActiveStatus>,
    ) -> Result<(), CombatError> {
        self.with_record(actor, |record| {
            record.statuses = statuses;
            record.mark_dirty();
        })?;
        self.refresh(actor);
        Ok(())
    }

    /// Generates a fresh instance of `handle` with affixes rolled against the
    /// configured count table. Items without an equip slot roll none.
    pub fn roll_item(
        &self,
        handle: ItemHandle,
        context: AffixContext,
        roller: ActorId,
        sequence: u64,
    ) -> Result<ItemInstance, CombatError> {
        let definition = self
            .oracles
            .items
            .definition(handle)
            .ok_or(CombatError::ItemNotFound(handle))?;
        let mut item = ItemInstance::new(handle);
        if let Some(slot) = definition.slot {
            let env = self.oracles.env();
            let rolled = roll_affixes(&env, &self.config.affix_counts, context, slot, roller, sequence);
            debug!(
                target: "combat::affix",
                item = %handle,
                roller = %roller,
                count = rolled.affixes.len(),
                "affixes rolled"
            );
            item = item.with_affixes(rolled.affixes, rolled.state);
        }
        self.prepare_item(&mut item);
        Ok(item)
    }

    /// Restores durability on a worn item. Returns the points restored.
    pub fn repair(&mut self, actor: ActorId, slot: EquipSlot, amount: u16) -> Result<u16, CombatError> {
        let restored = self
            .with_record(actor, |record| {
                let restored = record.equipment.get_mut(slot).map(|item| item.repair(amount));
                record.mark_dirty();
                restored
            })?
            .ok_or(CombatError::EmptySlot { actor, slot })?;
        self.refresh(actor);
        Ok(restored)
    }

    /// Brings a dead actor back with `hp` health. Returns `false` if the
    /// actor was not dead.
    pub fn revive(&mut self, actor: ActorId, hp: u32) -> Result<bool, CombatError> {
        self.record(actor)?;
        if !self.tracker.revive(actor, &mut self.events) {
            return Ok(false);
        }
        self.with_record(actor, |record| {
            let meter = &mut record.vitals.hp;
            meter.current = hp.clamp(1, meter.maximum.max(1));
            record.mark_dirty();
        })?;
        self.refresh(actor);
        info!(target: "combat::engine", actor = %actor, hp, "actor revived");
        Ok(true)
    }

    /// Passive HP regeneration. Dead actors regenerate nothing.
    pub fn regenerate(&mut self, actor: ActorId, amount: u32) -> Result<u32, CombatError> {
        let record = self
            .registry
            .get_mut(actor)
            .ok_or(CombatError::ActorNotFound(actor))?;
        if amount == 0 || !record.is_alive() {
            return Ok(0);
        }
        let restored = apply_heal(
            HealPacket {
                source: actor,
                target: actor,
                vital: crate::state::VitalKind::Health,
                amount,
                origin: PacketOrigin::Regeneration,
            },
            &mut record.vitals.hp,
        );
        if restored > 0 {
            self.events.push(CombatEvent::Healed {
                source: actor,
                target: actor,
                vital: crate::state::VitalKind::Health,
                amount: restored,
                origin: PacketOrigin::Regeneration,
            });
        }
        Ok(restored)
    }

    // ===== events and queries =====

    /// Takes every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        self.events.drain()
    }

    pub fn actor(&self, id: ActorId) -> Option<&ActorRecord> {
        self.registry.get(id)
    }

    pub fn actors(&self) -> impl Iterator<Item = &ActorRecord> {
        self.registry.iter()
    }

    /// Current snapshot, recomputed first if stale.
    pub fn snapshot(&mut self, id: ActorId) -> Option<&CombatSnapshot> {
        self.refresh(id);
        self.registry.get(id).map(ActorRecord::snapshot)
    }

    pub fn state(&self, id: ActorId) -> CombatState {
        self.tracker.state(id)
    }

    pub fn session(&self, attacker: ActorId) -> Option<&AttackSession> {
        self.scheduler.session(attacker)
    }

    pub fn channel(&self, actor: ActorId) -> Option<&Channel> {
        self.channels.get(actor)
    }

    pub fn brain(&self, id: ActorId) -> Option<&MonsterBrain> {
        self.brains.get(&id)
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn oracles(&self) -> &Oracles {
        &self.oracles
    }

    // ===== internals =====

    fn record(&self, id: ActorId) -> Result<&ActorRecord, CombatError> {
        self.registry.get(id).ok_or(CombatError::ActorNotFound(id))
    }

    fn with_record<R>(
        &mut self,
        id: ActorId,
        f: impl FnOnce(&mut ActorRecord) -> R,
    ) -> Result<R, CombatError> {
        self.registry
            .get_mut(id)
            .map(f)
            .ok_or(CombatError::ActorNotFound(id))
    }

    /// Fills in catalog durability and drops affixes the catalog rejects.
    fn prepare_item(&self, item: &mut ItemInstance) {
        if item.durability.is_none()
            && let Some(maximum) = self
                .oracles
                .items
                .definition(item.handle)
                .and_then(|d| d.max_durability)
        {
            item.durability = Some(Durability::new(maximum));
        }
        if let Some(durability) = item.durability.as_mut() {
            durability.current = durability.current.min(durability.maximum);
        }
        sanitize_item(item, self.oracles.affixes.as_ref());
    }

    fn is_living(&self, id: ActorId) -> bool {
        self.registry.get(id).is_some_and(ActorRecord::is_alive) && !self.tracker.is_dead(id)
    }

    fn distance(&self, a: ActorId, b: ActorId) -> Option<f32> {
        let a = self.registry.get(a)?;
        let b = self.registry.get(b)?;
        Some(a.position.distance(b.position))
    }

    fn policies(&self) -> ChannelPolicies {
        ChannelPolicies {
            bandage: self.config.bandage.interrupts,
            spell: self.config.spellcast.interrupts,
        }
    }

    fn begin_channel(&mut self, channel: Channel) {
        if let Err(running) = self.channels.start(channel) {
            warn!(target: "combat::engine", actor = %running.actor, "channel already running");
        }
    }

    /// Recomputes the snapshot if it is stale. A fresh stun interrupts the
    /// actor's channel.
    pub(crate) fn refresh(&mut self, id: ActorId) {
        let env = self.oracles.env();
        let Some(record) = self.registry.get_mut(id) else {
            return;
        };
        if !record.is_dirty() {
            return;
        }
        let snapshot = recompute(&ActorInputs::of(record), &env, &self.config);
        let stunned = snapshot.stunned;
        record.publish_snapshot(snapshot);
        if stunned {
            self.interrupt(id, InterruptCause::Stun);
        }
    }

    pub(crate) fn interrupt(&mut self, actor: ActorId, cause: InterruptCause) {
        let policies = self.policies();
        if let Some(channel) = self.channels.interrupt(actor, cause, &policies) {
            self.emit_interrupted(channel, cause);
        }
    }

    fn emit_interrupted(&mut self, channel: Channel, cause: InterruptCause) {
        debug!(target: "combat::engine", actor = %channel.actor, ?cause, "channel interrupted");
        let event = match channel.kind {
            ChannelKind::Bandage => CombatEvent::BandageInterrupted {
                actor: channel.actor,
                target: channel.target,
                cause,
            },
            ChannelKind::Spell(spell) => CombatEvent::CastInterrupted {
                actor: channel.actor,
                target: channel.target,
                spell,
                cause,
            },
        };
        self.events.push(event);
    }

    fn cancel_session(&mut self, attacker: ActorId, reason: CancelReason) -> bool {
        match self.scheduler.cancel(attacker) {
            Some(session) => {
                self.events.push(CombatEvent::AttackCancelled {
                    attacker,
                    target: session.target,
                    reason,
                });
                true
            }
            None => false,
        }
    }

    /// Ends every session and channel that references `actor`.
    fn end_involvement(&mut self, actor: ActorId, reason: CancelReason) {
        for session in self.scheduler.cancel_involving(actor) {
            self.events.push(CombatEvent::AttackCancelled {
                attacker: session.attacker,
                target: session.target,
                reason,
            });
        }
        for channel in self.channels.cancel_involving(actor) {
            self.emit_interrupted(channel, InterruptCause::TargetLost);
        }
    }
}

/// `round(base * multiplier)`.
fn scale_ms(base_ms: u32, multiplier: f32) -> u32 {
    (base_ms as f32 * multiplier.max(0.0)).round() as u32
}

impl core::fmt::Debug for CombatEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CombatEngine")
            .field("tick", &self.tick)
            .field("now_ms", &self.now_ms)
            .field("actors", &self.registry.len())
            .field("sessions", &self.scheduler.len())
            .field("channels", &self.channels.len())
            .finish_non_exhaustive()
    }
}
