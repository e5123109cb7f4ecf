//! One fixed simulation step.
//!
//! Order per tick: advance the clock, refresh stale snapshots, run monster
//! brains, step attack sessions and resolve the ready ones, finish channels,
//! expire engagement windows.

use tracing::{debug, trace, warn};

use super::CombatEngine;
use crate::channel::{Channel, ChannelKind, InterruptCause};
use crate::combat::{
    AbortReason, CombatResolver, HealPacket, PacketOrigin, SpellOutcome, SwingOutcome, apply_heal,
};
use crate::config::SwingConfig;
use crate::env::{LegalityOracle, RollKey, RollKind};
use crate::events::{CancelReason, CombatEvent};
use crate::scheduler::SessionView;
use crate::state::{ActorId, SkillKind, VitalKind};
use crate::stats::snapshot_swing_ms;
use crate::tracker::CombatStateTracker;

use super::ActorRegistry;

impl CombatEngine {
    /// Advances the simulation by one tick of `config.tick_ms`.
    pub fn tick(&mut self) {
        let dt = self.config.tick_ms;
        self.tick = self.tick.next();
        self.now_ms += u64::from(dt);
        trace!(target: "combat::engine", tick = self.tick.0, now_ms = self.now_ms, "tick");

        self.refresh_all();
        self.run_brains();
        self.refresh_all();
        self.run_sessions(dt);
        self.run_channels(dt);

        let scheduler = &self.scheduler;
        self.tracker
            .expire(self.now_ms, |actor| scheduler.has_session(actor), &mut self.events);
    }

    /// Runs `ticks` steps back to back.
    pub fn advance(&mut self, ticks: u32) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    fn refresh_all(&mut self) {
        for id in self.registry.ids() {
            self.refresh(id);
        }
    }

    fn run_brains(&mut self) {
        let ids: Vec<ActorId> = self.brains.keys().copied().collect();
        for id in ids {
            if !self.is_living(id) {
                continue;
            }
            let Some(mut brain) = self.brains.remove(&id) else {
                continue;
            };
            brain.tick(&mut super::brain::EngineBrain::new(self, id));
            self.brains.insert(id, brain);
        }
    }

    fn run_sessions(&mut self, dt: u32) {
        let now_ms = self.now_ms;
        let report = {
            let view = WorldView {
                registry: &self.registry,
                tracker: &self.tracker,
                legality: self.oracles.legality.as_ref(),
                swing: &self.config.swing,
            };
            self.scheduler.tick(now_ms, dt, &view)
        };

        for (session, reason) in report.cancelled {
            debug!(
                target: "combat::scheduler",
                attacker = %session.attacker,
                target = %session.target,
                ?reason,
                "session cancelled"
            );
            self.events.push(CombatEvent::AttackCancelled {
                attacker: session.attacker,
                target: session.target,
                reason,
            });
        }

        for (attacker, target) in report.ready {
            // An earlier resolution this tick may already have ended it.
            if self
                .scheduler
                .session(attacker)
                .is_none_or(|session| session.target != target)
            {
                continue;
            }
            self.resolve_ready(attacker, target);
        }
    }

    fn resolve_ready(&mut self, attacker: ActorId, target: ActorId) {
        let env = self.oracles.env();
        let mut resolver = CombatResolver::new(
            env,
            &self.config,
            &mut self.tracker,
            &mut self.events,
            self.now_ms,
        );
        let outcome = self
            .registry
            .with_pair_mut(attacker, target, |a, d| resolver.resolve_swing(a, d));

        let Some(outcome) = outcome else {
            warn!(target: "combat::engine", attacker = %attacker, target = %target, "ready session without both actors");
            let reason = if self.registry.contains(attacker) {
                CancelReason::TargetInvalid
            } else {
                CancelReason::AttackerInvalid
            };
            self.cancel_session(attacker, reason);
            return;
        };

        match outcome {
            SwingOutcome::Aborted(reason) if reason.pauses() => self.scheduler.hold(attacker),
            SwingOutcome::Aborted(reason) => {
                self.cancel_session(attacker, cancel_reason(reason));
            }
            SwingOutcome::Missed => self.finish_swing(attacker),
            SwingOutcome::Hit(report) => {
                self.refresh(target);
                if report.total_dealt > 0 {
                    self.interrupt(target, InterruptCause::Damage);
                }
                if report.killed {
                    self.handle_death(target);
                }
                self.finish_swing(attacker);
            }
        }
    }

    /// Re-arms the attacker's timer from its refreshed snapshot.
    fn finish_swing(&mut self, attacker: ActorId) {
        self.refresh(attacker);
        if let Some(record) = self.registry.get(attacker) {
            let swing_ms = snapshot_swing_ms(record.snapshot(), &self.config.swing);
            self.scheduler.complete(attacker, swing_ms);
        }
    }

    pub(super) fn handle_death(&mut self, victim: ActorId) {
        self.end_involvement(victim, CancelReason::Death);
    }

    fn run_channels(&mut self, dt: u32) {
        for channel in self.channels.advance(dt) {
            match channel.kind {
                ChannelKind::Bandage => self.complete_bandage(channel),
                ChannelKind::Spell(_) => self.complete_cast(channel),
            }
        }
    }

    fn complete_bandage(&mut self, channel: Channel) {
        let Channel { actor, target, .. } = channel;
        let in_reach = actor == target
            || self
                .distance(actor, target)
                .is_some_and(|d| d <= self.config.bandage.range);
        if !self.is_living(actor) || !self.is_living(target) || !in_reach {
            self.emit_interrupted(channel, InterruptCause::TargetLost);
            return;
        }

        let bandage = self.config.bandage;
        let env = self.oracles.env();
        let healing = self
            .registry
            .get(actor)
            .map_or(0, |record| record.skills.get(SkillKind::Healing));
        let seed = env.roll_seed(RollKey::new(actor, RollKind::BandageHeal, channel.sequence));
        let amount = env.rng.range(seed, bandage.heal_min, bandage.heal_max)
            + u32::from(healing / bandage.skill_divisor.max(1));

        let Some(record) = self.registry.get_mut(target) else {
            return;
        };
        let healed = apply_heal(
            HealPacket {
                source: actor,
                target,
                vital: VitalKind::Health,
                amount,
                origin: PacketOrigin::Bandage,
            },
            &mut record.vitals.hp,
        );
        debug!(target: "combat::engine", actor = %actor, target = %target, healed, "bandage completed");
        if healed > 0 {
            self.events.push(CombatEvent::Healed {
                source: actor,
                target,
                vital: VitalKind::Health,
                amount: healed,
                origin: PacketOrigin::Bandage,
            });
        }
        self.events.push(CombatEvent::BandageCompleted {
            actor,
            target,
            healed,
        });
    }

    fn complete_cast(&mut self, channel: Channel) {
        let ChannelKind::Spell(spell_id) = channel.kind else {
            return;
        };
        let Some(spell) = self.oracles.spells.spell(spell_id) else {
            warn!(target: "combat::engine", spell = %spell_id, "spell vanished from catalog");
            self.emit_interrupted(channel, InterruptCause::TargetLost);
            return;
        };

        let env = self.oracles.env();
        let mut resolver = CombatResolver::new(
            env,
            &self.config,
            &mut self.tracker,
            &mut self.events,
            self.now_ms,
        );
        let outcome = self
            .registry
            .with_pair_mut(channel.actor, channel.target, |caster, target| {
                resolver.resolve_spell(caster, target, &spell)
            });

        match outcome {
            Some(SpellOutcome::Landed { dealt, killed }) => {
                self.refresh(channel.target);
                if dealt > 0 {
                    self.interrupt(channel.target, InterruptCause::Damage);
                }
                if killed {
                    self.handle_death(channel.target);
                }
            }
            Some(SpellOutcome::Aborted(_)) | None => {
                self.emit_interrupted(channel, InterruptCause::TargetLost);
            }
        }
    }
}

fn cancel_reason(reason: AbortReason) -> CancelReason {
    match reason {
        AbortReason::AttackerDead => CancelReason::AttackerInvalid,
        AbortReason::TargetDead => CancelReason::TargetInvalid,
        AbortReason::OutOfRange => CancelReason::OutOfRange,
        AbortReason::Illegal => CancelReason::Illegal,
        AbortReason::Gated | AbortReason::Starved => CancelReason::AttackerInvalid,
    }
}

/// Read-only world queries for the scheduler step.
struct WorldView<'a> {
    registry: &'a ActorRegistry,
    tracker: &'a CombatStateTracker,
    legality: &'a dyn LegalityOracle,
    swing: &'a SwingConfig,
}

impl SessionView for WorldView<'_> {
    fn validate(&self, attacker: ActorId, target: ActorId) -> Result<(), CancelReason> {
        let a = self
            .registry
            .get(attacker)
            .filter(|r| r.is_alive() && !self.tracker.is_dead(attacker))
            .ok_or(CancelReason::AttackerInvalid)?;
        let t = self
            .registry
            .get(target)
            .filter(|r| r.is_alive() && !self.tracker.is_dead(target))
            .ok_or(CancelReason::TargetInvalid)?;
        if a.position.distance(t.position) > a.snapshot().weapon.range {
            return Err(CancelReason::OutOfRange);
        }
        if !self.legality.check(attacker, target).allowed {
            return Err(CancelReason::Illegal);
        }
        Ok(())
    }

    fn is_starved(&self, attacker: ActorId) -> bool {
        let Some(record) = self.registry.get(attacker) else {
            return true;
        };
        let snapshot = record.snapshot();
        let weapon = &snapshot.weapon;
        !snapshot.can_attack()
            || record.vitals.stamina.current < weapon.stamina_cost
            || weapon
                .ammo
                .is_some_and(|ammo| record.backpack.count(ammo) == 0)
    }

    fn swing_ms(&self, attacker: ActorId) -> u32 {
        self.registry
            .get(attacker)
            .map_or(self.swing.floor_ms, |r| snapshot_swing_ms(r.snapshot(), self.swing))
    }
}
