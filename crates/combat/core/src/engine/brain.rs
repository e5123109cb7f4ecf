//! Engine adapter that lets a monster brain act on the world.

use tracing::warn;

use super::{CombatEngine, MoveOutcome};
use crate::ai::BrainContext;
use crate::engine::ArmOutcome;
use crate::state::{ActorId, Position};

/// Engine-backed [`BrainContext`] for one monster.
///
/// Requests go through the same public entry points a player would use.
pub(super) struct EngineBrain<'a> {
    engine: &'a mut CombatEngine,
    me: ActorId,
}

impl<'a> EngineBrain<'a> {
    pub(super) fn new(engine: &'a mut CombatEngine, me: ActorId) -> Self {
        Self { engine, me }
    }
}

impl BrainContext for EngineBrain<'_> {
    fn me(&self) -> ActorId {
        self.me
    }

    fn tick_ms(&self) -> u32 {
        self.engine.config.tick_ms
    }

    fn position_of(&self, actor: ActorId) -> Option<Position> {
        self.engine.registry.get(actor).map(|r| r.position)
    }

    fn home(&self) -> Position {
        self.engine
            .registry
            .get(self.me)
            .map_or(Position::ORIGIN, |r| r.home)
    }

    fn is_valid_target(&self, actor: ActorId) -> bool {
        actor != self.me
            && self.engine.is_living(actor)
            && self.engine.oracles.legality.check(self.me, actor).allowed
    }

    fn health_ratio(&self) -> f32 {
        self.engine
            .registry
            .get(self.me)
            .map_or(0.0, |r| r.vitals.hp.ratio())
    }

    fn scan(&self, center: Position, radius: f32) -> Vec<(ActorId, Position)> {
        self.engine
            .registry
            .iter()
            .filter(|r| r.position.distance(center) <= radius)
            .filter(|r| self.is_valid_target(r.id))
            .map(|r| (r.id, r.position))
            .collect()
    }

    fn has_session(&self) -> bool {
        self.engine.scheduler.has_session(self.me)
    }

    fn arm_attack(&mut self, target: ActorId) -> ArmOutcome {
        match self.engine.arm_attack(self.me, target) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(target: "combat::ai", monster = %self.me, %err, "arm request failed");
                ArmOutcome::Refused
            }
        }
    }

    fn cancel_attack(&mut self) {
        if let Err(err) = self.engine.cancel_attack(self.me) {
            warn!(target: "combat::ai", monster = %self.me, %err, "cancel request failed");
        }
    }

    fn move_to(&mut self, destination: Position) -> bool {
        matches!(
            self.engine.move_actor(self.me, destination),
            Ok(MoveOutcome::Moved)
        )
    }

    fn regenerate(&mut self, amount: u32) {
        if let Err(err) = self.engine.regenerate(self.me, amount) {
            warn!(target: "combat::ai", monster = %self.me, %err, "regeneration failed");
        }
    }
}
