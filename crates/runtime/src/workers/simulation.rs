//! Simulation worker that owns the authoritative [`CombatEngine`].
//!
//! Receives commands from [`crate::RuntimeHandle`], applies them to the engine
//! between ticks, advances the engine on its own interval when configured to,
//! and broadcasts every drained [`combat_core::CombatEvent`].

use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info, trace};

use combat_core::{
    ActionOutcome, ActiveStatus, ActorId, ActorRecord, ArmOutcome, BehaviorParams, CombatEngine,
    CombatError, EquipSlot, ItemInstance, MoveOutcome, Position, SpellId, Tick,
};

use crate::api::{ActorView, Result, RuntimeError, RuntimeEvent};

/// Commands that can be sent to the simulation worker.
pub enum Command {
    Spawn {
        record: ActorRecord,
        behavior: Option<BehaviorParams>,
        reply: oneshot::Sender<Result<()>>,
    },
    Despawn {
        actor: ActorId,
        reply: oneshot::Sender<Result<ActorRecord>>,
    },
    ArmAttack {
        attacker: ActorId,
        target: ActorId,
        reply: oneshot::Sender<Result<ArmOutcome>>,
    },
    CancelAttack {
        attacker: ActorId,
        reply: oneshot::Sender<Result<bool>>,
    },
    StartBandage {
        actor: ActorId,
        target: ActorId,
        reply: oneshot::Sender<Result<ActionOutcome>>,
    },
    StartCast {
        actor: ActorId,
        target: ActorId,
        spell: SpellId,
        reply: oneshot::Sender<Result<ActionOutcome>>,
    },
    MoveActor {
        actor: ActorId,
        destination: Position,
        reply: oneshot::Sender<Result<MoveOutcome>>,
    },
    Equip {
        actor: ActorId,
        slot: EquipSlot,
        item: ItemInstance,
        reply: oneshot::Sender<Result<Option<ItemInstance>>>,
    },
    Unequip {
        actor: ActorId,
        slot: EquipSlot,
        reply: oneshot::Sender<Result<ItemInstance>>,
    },
    SetStatuses {
        actor: ActorId,
        statuses: Vec<ActiveStatus>,
        reply: oneshot::Sender<Result<()>>,
    },
    Repair {
        actor: ActorId,
        slot: EquipSlot,
        amount: u16,
        reply: oneshot::Sender<Result<u16>>,
    },
    Revive {
        actor: ActorId,
        hp: u32,
        reply: oneshot::Sender<Result<bool>>,
    },
    /// Runs `ticks` engine steps immediately, independent of the tick mode.
    Advance {
        ticks: u32,
        reply: oneshot::Sender<Tick>,
    },
    QueryActor {
        actor: ActorId,
        reply: oneshot::Sender<Option<ActorView>>,
    },
    QueryActors {
        reply: oneshot::Sender<Vec<ActorId>>,
    },
    QueryClock {
        reply: oneshot::Sender<(Tick, u64)>,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Spawn { .. } => "spawn",
            Self::Despawn { .. } => "despawn",
            Self::ArmAttack { .. } => "arm_attack",
            Self::CancelAttack { .. } => "cancel_attack",
            Self::StartBandage { .. } => "start_bandage",
            Self::StartCast { .. } => "start_cast",
            Self::MoveActor { .. } => "move_actor",
            Self::Equip { .. } => "equip",
            Self::Unequip { .. } => "unequip",
            Self::SetStatuses { .. } => "set_statuses",
            Self::Repair { .. } => "repair",
            Self::Revive { .. } => "revive",
            Self::Advance { .. } => "advance",
            Self::QueryActor { .. } => "query_actor",
            Self::QueryActors { .. } => "query_actors",
            Self::QueryClock { .. } => "query_clock",
        }
    }
}

/// Background task that owns the engine and processes commands.
///
/// Commands are applied in arrival order between ticks; a tick never
/// interleaves with a command.
pub struct SimulationWorker {
    engine: CombatEngine,
    command_rx: mpsc::Receiver<Command>,
    event_tx: broadcast::Sender<RuntimeEvent>,
    interval: Option<Duration>,
}

impl SimulationWorker {
    /// Creates a new simulation worker. `interval` is `None` for manual ticking.
    pub fn new(
        engine: CombatEngine,
        command_rx: mpsc::Receiver<Command>,
        event_tx: broadcast::Sender<RuntimeEvent>,
        interval: Option<Duration>,
    ) -> Self {
        info!(
            target: "runtime::worker",
            actors = engine.actors().count(),
            tick_ms = engine.config().tick_ms,
            real_time = interval.is_some(),
            "simulation worker initialized"
        );
        Self {
            engine,
            command_rx,
            event_tx,
            interval,
        }
    }

    /// Main worker loop. Returns once every handle has been dropped.
    pub async fn run(mut self) {
        // Events raised while seeding the engine go out before the first command.
        self.publish();

        let mut ticker = self.interval.map(|period| {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
            ticker
        });

        loop {
            tokio::select! {
                biased;
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                _ = next_tick(&mut ticker) => {
                    self.engine.tick();
                    trace!(target: "runtime::worker", tick = %self.engine.current_tick(), "tick");
                    self.publish();
                }
            }
        }

        info!(
            target: "runtime::worker",
            tick = %self.engine.current_tick(),
            "simulation worker stopped"
        );
    }

    fn handle_command(&mut self, cmd: Command) {
        let name = cmd.name();
        trace!(target: "runtime::worker", command = name, "handling command");

        let delivered = match cmd {
            Command::Spawn {
                record,
                behavior,
                reply,
            } => {
                let result = match behavior {
                    Some(params) => self.engine.on_spawn_monster(record, params),
                    None => self.engine.on_spawn(record),
                };
                self.respond(name, reply, result)
            }
            Command::Despawn { actor, reply } => {
                let result = self.engine.on_despawn(actor);
                self.respond(name, reply, result)
            }
            Command::ArmAttack {
                attacker,
                target,
                reply,
            } => {
                let result = self.engine.arm_attack(attacker, target);
                self.respond(name, reply, result)
            }
            Command::CancelAttack { attacker, reply } => {
                let result = self.engine.cancel_attack(attacker);
                self.respond(name, reply, result)
            }
            Command::StartBandage {
                actor,
                target,
                reply,
            } => {
                let result = self.engine.start_bandage(actor, target);
                self.respond(name, reply, result)
            }
            Command::StartCast {
                actor,
                target,
                spell,
                reply,
            } => {
                let result = self.engine.start_cast(actor, target, spell);
                self.respond(name, reply, result)
            }
            Command::MoveActor {
                actor,
                destination,
                reply,
            } => {
                let result = self.engine.move_actor(actor, destination);
                self.respond(name, reply, result)
            }
            Command::Equip {
                actor,
                slot,
                item,
                reply,
            } => {
                let result = self.engine.equip(actor, slot, item);
                self.respond(name, reply, result)
            }
            Command::Unequip { actor, slot, reply } => {
                let result = self.engine.unequip(actor, slot);
                self.respond(name, reply, result)
            }
            Command::SetStatuses {
                actor,
                statuses,
                reply,
            } => {
                let result = self.engine.set_statuses(actor, statuses);
                self.respond(name, reply, result)
            }
            Command::Repair {
                actor,
                slot,
                amount,
                reply,
            } => {
                let result = self.engine.repair(actor, slot, amount);
                self.respond(name, reply, result)
            }
            Command::Revive { actor, hp, reply } => {
                let result = self.engine.revive(actor, hp);
                self.respond(name, reply, result)
            }
            Command::Advance { ticks, reply } => {
                for _ in 0..ticks {
                    self.engine.tick();
                    self.publish();
                }
                let tick = self.engine.current_tick();
                self.reply(reply, tick)
            }
            Command::QueryActor { actor, reply } => {
                let view = self.view(actor);
                self.reply(reply, view)
            }
            Command::QueryActors { reply } => {
                let ids = self.engine.actors().map(|record| record.id).collect();
                self.reply(reply, ids)
            }
            Command::QueryClock { reply } => {
                let clock = (self.engine.current_tick(), self.engine.now_ms());
                self.reply(reply, clock)
            }
        };

        if !delivered {
            debug!(target: "runtime::worker", command = name, "reply channel closed (caller dropped)");
        }
    }

    /// Publishes pending events before replying so a caller that awaited the
    /// reply can already observe the events its request produced.
    fn reply<T>(&mut self, reply: oneshot::Sender<T>, value: T) -> bool {
        self.publish();
        reply.send(value).is_ok()
    }

    /// Logs a rejected request, then replies like [`Self::reply`].
    fn respond<T>(
        &mut self,
        command: &'static str,
        reply: oneshot::Sender<Result<T>>,
        result: std::result::Result<T, CombatError>,
    ) -> bool {
        let result = result.map_err(|err| {
            debug!(
                target: "runtime::worker",
                command,
                error = %err,
                "command rejected"
            );
            RuntimeError::from(err)
        });
        self.reply(reply, result)
    }

    fn view(&mut self, actor: ActorId) -> Option<ActorView> {
        let snapshot = self.engine.snapshot(actor)?.clone();
        let record = self.engine.actor(actor)?.clone();
        Some(ActorView {
            record,
            snapshot,
            state: self.engine.state(actor),
            session: self.engine.session(actor).copied(),
            channel: self.engine.channel(actor).copied(),
            monster: self.engine.brain(actor).map(|brain| brain.state()),
        })
    }

    /// Drains the engine queue onto the broadcast channel. Having no
    /// subscribers is not an error.
    fn publish(&mut self) {
        let tick = self.engine.current_tick();
        let now_ms = self.engine.now_ms();
        for event in self.engine.drain_events() {
            let _ = self.event_tx.send(RuntimeEvent {
                tick,
                now_ms,
                event,
            });
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}
