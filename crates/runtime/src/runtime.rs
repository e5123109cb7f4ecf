//! High-level runtime orchestrator.
//!
//! The runtime owns the simulation worker, wires up command and event
//! channels, and exposes a builder-based API for seeding the engine.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use combat_content::ContentBundle;
use combat_core::{
    ActorRecord, AllowAll, BehaviorParams, CombatConfig, CombatEngine, LegalityOracle, Oracles,
};

use crate::api::{Result, RuntimeError, RuntimeEvent, RuntimeHandle};
use crate::workers::{Command, SimulationWorker};

/// How the worker advances the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickMode {
    /// Only [`RuntimeHandle::advance`] moves time. Used by tests and replays.
    Manual,
    /// The worker ticks on its own at the given wall-clock period.
    RealTime { interval: Duration },
}

impl TickMode {
    /// Real-time ticking paced by the engine's own tick length.
    pub fn real_time(config: &CombatConfig) -> Self {
        Self::RealTime {
            interval: Duration::from_millis(u64::from(config.tick_ms)),
        }
    }
}

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub combat: CombatConfig,
    pub tick_mode: TickMode,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            combat: CombatConfig::default(),
            tick_mode: TickMode::Manual,
            event_buffer_size: 1024,
            command_buffer_size: 64,
        }
    }
}

/// Main runtime that owns the simulation worker.
///
/// [`RuntimeHandle`] is the cloneable façade for clients; the runtime itself
/// only exists to hand out handles and to join the worker on shutdown.
pub struct Runtime {
    handle: RuntimeHandle,
    worker: JoinHandle<()>,
}

impl Runtime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<RuntimeEvent> {
        self.handle.subscribe_events()
    }

    /// Drops this runtime's handle and waits for the worker to stop.
    ///
    /// The worker exits once every outstanding [`RuntimeHandle`] clone has
    /// been dropped as well.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);
        self.worker.await.map_err(RuntimeError::WorkerJoin)?;
        info!(target: "runtime::worker", "runtime shut down");
        Ok(())
    }
}

/// Builder for [`Runtime`].
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    oracles: Option<Oracles>,
    actors: Vec<(ActorRecord, Option<BehaviorParams>)>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            oracles: None,
            actors: Vec::new(),
        }
    }

    /// Override runtime configuration.
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn tick_mode(mut self, mode: TickMode) -> Self {
        self.config.tick_mode = mode;
        self
    }

    /// Set the required oracle set.
    pub fn oracles(mut self, oracles: Oracles) -> Self {
        self.oracles = Some(oracles);
        self
    }

    /// Seed from loaded content: its tuning, its catalog (with every attack
    /// allowed) and its actor roster.
    pub fn content(self, bundle: ContentBundle, game_seed: u64) -> Self {
        self.content_with_legality(bundle, AllowAll, game_seed)
    }

    pub fn content_with_legality<L>(
        mut self,
        bundle: ContentBundle,
        legality: L,
        game_seed: u64,
    ) -> Self
    where
        L: LegalityOracle + 'static,
    {
        self.config.combat = bundle.config;
        self.oracles = Some(Oracles::from_catalog(bundle.catalog, legality, game_seed));
        for actor in bundle.actors {
            self.actors.push((actor.record, actor.behavior));
        }
        self
    }

    /// Spawn an actor before the first tick.
    pub fn spawn(mut self, record: ActorRecord) -> Self {
        self.actors.push((record, None));
        self
    }

    /// Spawn a monster-driven actor before the first tick.
    pub fn spawn_monster(mut self, record: ActorRecord, params: BehaviorParams) -> Self {
        self.actors.push((record, Some(params)));
        self
    }

    /// Build the engine and start the worker. Must be called inside a tokio
    /// runtime.
    ///
    /// Actors that fail to spawn (duplicate ids) are skipped with a warning.
    pub fn build(self) -> Result<Runtime> {
        let oracles = self.oracles.ok_or(RuntimeError::MissingOracles)?;
        let interval = match self.config.tick_mode {
            TickMode::Manual => None,
            TickMode::RealTime { interval } if interval.is_zero() => {
                return Err(RuntimeError::ZeroTickInterval);
            }
            TickMode::RealTime { interval } => Some(interval),
        };

        let mut engine = CombatEngine::new(self.config.combat, oracles);
        for (record, behavior) in self.actors {
            let id = record.id;
            let spawned = match behavior {
                Some(params) => engine.on_spawn_monster(record, params),
                None => engine.on_spawn(record),
            };
            if let Err(err) = spawned {
                warn!(target: "runtime::worker", actor = %id, error = %err, "skipping initial actor");
            }
        }

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let (event_tx, _event_rx) =
            broadcast::channel::<RuntimeEvent>(self.config.event_buffer_size);

        let handle = RuntimeHandle::new(command_tx, event_tx.clone());
        let worker = SimulationWorker::new(engine, command_rx, event_tx, interval);
        let worker = tokio::spawn(worker.run());

        Ok(Runtime { handle, worker })
    }
}
