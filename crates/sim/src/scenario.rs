//! Data-driven skirmish: players hunt the nearest monster, monsters run their
//! own decision loops.
use std::collections::BTreeMap;

use anyhow::{Context, Result};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, info, warn};

use combat_content::ContentFactory;
use combat_core::{ActionOutcome, ActorId, ArmOutcome, CombatEvent, MoveOutcome};
use combat_runtime::{ActorView, Runtime, RuntimeConfig, RuntimeEvent, RuntimeHandle};

use crate::config::SimConfig;

/// Players bandage themselves below this fraction of max HP.
const BANDAGE_BELOW: f32 = 0.5;

/// Tallies of what happened during a run.
#[derive(Debug, Default)]
pub struct Summary {
    pub ticks: u64,
    pub hits: u32,
    pub misses: u32,
    pub damage: u64,
    pub healed: u64,
    pub kills: Vec<(ActorId, ActorId)>,
    pub broken_items: u32,
    pub names: BTreeMap<ActorId, String>,
}

impl Summary {
    fn record(&mut self, event: &CombatEvent) {
        match event {
            CombatEvent::Hit { dealt, .. } => {
                self.hits += 1;
                self.damage += u64::from(*dealt);
            }
            CombatEvent::ProcTriggered { dealt, .. }
            | CombatEvent::CastCompleted { dealt, .. } => self.damage += u64::from(*dealt),
            CombatEvent::Miss { .. } => self.misses += 1,
            CombatEvent::Healed { amount, .. } => self.healed += u64::from(*amount),
            CombatEvent::ItemBroken { .. } => self.broken_items += 1,
            CombatEvent::ActorKilled { killer, victim, .. } => self.kills.push((*killer, *victim)),
            _ => {}
        }
    }

    pub fn name(&self, id: ActorId) -> &str {
        self.names.get(&id).map_or("?", String::as_str)
    }
}

pub struct Scenario {
    config: SimConfig,
    handle: RuntimeHandle,
    runtime: Runtime,
    events: broadcast::Receiver<RuntimeEvent>,
    players: Vec<ActorId>,
    monsters: Vec<ActorId>,
    summary: Summary,
}

impl Scenario {
    /// Loads content and starts a manually ticked runtime seeded with it.
    pub fn load(config: SimConfig) -> Result<Self> {
        let factory = ContentFactory::new(&config.content_dir);
        let bundle = factory
            .load_all()
            .with_context(|| format!("loading content from {}", config.content_dir.display()))?;

        let mut summary = Summary::default();
        let mut players = Vec::new();
        let mut monsters = Vec::new();
        for actor in &bundle.actors {
            summary.names.insert(actor.id(), actor.name.clone());
            if actor.is_monster() {
                monsters.push(actor.id());
            } else {
                players.push(actor.id());
            }
        }
        info!(
            players = players.len(),
            monsters = monsters.len(),
            seed = config.seed,
            "scenario loaded"
        );

        let runtime = Runtime::builder()
            .config(RuntimeConfig {
                event_buffer_size: 4096,
                ..RuntimeConfig::default()
            })
            .content(bundle, config.seed)
            .build()?;
        let handle = runtime.handle();
        let events = handle.subscribe_events();

        Ok(Self {
            config,
            handle,
            runtime,
            events,
            players,
            monsters,
            summary,
        })
    }

    /// Runs until one side is wiped out or the tick budget is spent.
    pub async fn run(mut self) -> Result<Summary> {
        let mut elapsed = 0;
        while elapsed < self.config.ticks {
            for player in self.players.clone() {
                self.decide(player).await?;
            }

            let step = self.config.decision_interval.min(self.config.ticks - elapsed);
            let tick = self.handle.advance(step).await?;
            elapsed += step;
            self.summary.ticks = tick.0;
            self.collect();

            if self.wiped_out(&self.monsters).await? {
                info!(tick = %tick, "all monsters defeated");
                break;
            }
            if self.wiped_out(&self.players).await? {
                info!(tick = %tick, "all players defeated");
                break;
            }
        }

        self.report().await?;
        let Self {
            handle,
            runtime,
            summary,
            ..
        } = self;
        drop(handle);
        runtime.shutdown().await?;
        Ok(summary)
    }

    /// One player decision: bandage when hurt, otherwise close in and attack.
    async fn decide(&mut self, player: ActorId) -> Result<()> {
        let Some(me) = self.handle.query_actor(player).await? else {
            return Ok(());
        };
        if !me.is_alive() || me.channel.is_some() {
            return Ok(());
        }

        let hp = me.record.vitals.hp;
        if (hp.current as f32) < hp.maximum as f32 * BANDAGE_BELOW
            && let ActionOutcome::Started { duration_ms } =
                self.handle.start_bandage(player, player).await?
        {
            debug!(actor = %player, duration_ms, "bandaging");
            return Ok(());
        }

        let Some(target) = self.nearest_monster(&me).await? else {
            return Ok(());
        };
        let reach = me.snapshot.weapon.range;
        let distance = me.record.position.distance(target.record.position);
        if distance > reach {
            let stride = self.config.move_per_tick * self.config.decision_interval as f32;
            let destination = me
                .record
                .position
                .step_toward(target.record.position, (distance - reach * 0.8).min(stride));
            let moved = self.handle.move_actor(player, destination).await?;
            if let MoveOutcome::Refused(refusal) = moved {
                debug!(actor = %player, ?refusal, "move refused");
            }
            return Ok(());
        }

        if me.session.map(|s| s.target) != Some(target.record.id) {
            match self.handle.arm_attack(player, target.record.id).await? {
                ArmOutcome::Refused => debug!(actor = %player, "attack refused"),
                outcome => {
                    debug!(actor = %player, target = %target.record.id, ?outcome, "attack armed")
                }
            }
        }
        Ok(())
    }

    async fn nearest_monster(&self, me: &ActorView) -> Result<Option<ActorView>> {
        let mut best: Option<(f32, ActorView)> = None;
        for &id in &self.monsters {
            let Some(view) = self.handle.query_actor(id).await? else {
                continue;
            };
            if !view.is_alive() {
                continue;
            }
            let distance = me.record.position.distance(view.record.position);
            if best.as_ref().is_none_or(|(d, _)| distance < *d) {
                best = Some((distance, view));
            }
        }
        Ok(best.map(|(_, view)| view))
    }

    async fn wiped_out(&self, side: &[ActorId]) -> Result<bool> {
        for &id in side {
            if let Some(view) = self.handle.query_actor(id).await?
                && view.is_alive()
            {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn collect(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(stamped) => {
                    if self.config.json_events {
                        match serde_json::to_string(&stamped) {
                            Ok(line) => println!("{line}"),
                            Err(err) => warn!(error = %err, "failed to encode event"),
                        }
                    }
                    debug!(
                        tick = %stamped.tick,
                        kind = stamped.event.kind(),
                        event = ?stamped.event,
                        "event"
                    );
                    if let CombatEvent::ActorKilled { killer, victim, .. } = &stamped.event {
                        info!(
                            tick = %stamped.tick,
                            killer = self.summary.name(*killer),
                            victim = self.summary.name(*victim),
                            "kill"
                        );
                    }
                    self.summary.record(&stamped.event);
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "event subscriber lagged");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    }

    async fn report(&self) -> Result<()> {
        for &id in self.players.iter().chain(&self.monsters) {
            let Some(view) = self.handle.query_actor(id).await? else {
                continue;
            };
            let hp = view.record.vitals.hp;
            info!(
                actor = %id,
                name = self.summary.name(id),
                hp = hp.current,
                max_hp = hp.maximum,
                state = ?view.state,
                monster = ?view.monster,
                "final state"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bundled_content_produces_a_fight() {
        let config = SimConfig {
            ticks: 600,
            ..SimConfig::default()
        };
        let summary = Scenario::load(config).unwrap().run().await.unwrap();

        assert!(summary.ticks > 0);
        assert!(summary.hits + summary.misses > 0);
        assert_eq!(summary.name(ActorId(1)), "Knight");
        assert!(summary.kills.len() <= 3);
    }

    #[tokio::test]
    async fn missing_content_dir_is_reported() {
        let config = SimConfig {
            content_dir: "/nonexistent/combat-content".into(),
            ..SimConfig::default()
        };
        let err = Scenario::load(config).err().expect("load must fail");
        assert!(format!("{err:#}").contains("/nonexistent/combat-content"));
    }
}
