//! Per-actor combat state.
//!
//! ```text
//! Peaceful ⇄ Engaged ⇄ InCombat → Dead → (revive) → Peaceful
//! ```
//!
//! The tracker is the only writer of [`CombatState`]. The scheduler and the
//! resolver request transitions through `notify_*` and [`CombatStateTracker::trigger_death`].

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::events::{CombatEvent, EventQueue, KillContext};
use crate::state::ActorId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatState {
    #[default]
    Peaceful,
    /// An attack is armed but no hostile action has happened yet.
    Engaged,
    /// A hostile action happened within the engagement window.
    InCombat,
    Dead,
}

#[derive(Clone, Copy, Debug, Default)]
struct Entry {
    state: CombatState,
    last_hostile_ms: u64,
}

#[derive(Clone, Debug)]
pub struct CombatStateTracker {
    entries: BTreeMap<ActorId, Entry>,
    window_ms: u64,
}

impl CombatStateTracker {
    pub fn new(window_ms: u32) -> Self {
        Self {
            entries: BTreeMap::new(),
            window_ms: window_ms as u64,
        }
    }

    pub fn register(&mut self, actor: ActorId) {
        self.entries.entry(actor).or_default();
    }

    pub fn unregister(&mut self, actor: ActorId) {
        self.entries.remove(&actor);
    }

    /// Unknown actors read as `Peaceful`.
    pub fn state(&self, actor: ActorId) -> CombatState {
        self.entries
            .get(&actor)
            .map_or(CombatState::Peaceful, |e| e.state)
    }

    pub fn is_dead(&self, actor: ActorId) -> bool {
        self.state(actor) == CombatState::Dead
    }

    /// An attack was armed. Peaceful actors become Engaged.
    pub fn notify_engaged(&mut self, actor: ActorId, events: &mut EventQueue) {
        if let Some(entry) = self.entries.get_mut(&actor)
            && entry.state == CombatState::Peaceful
        {
            transition(actor, entry, CombatState::Engaged, events);
        }
    }

    /// A hostile action was initiated or received: refresh the window.
    pub fn notify_hostile(&mut self, actor: ActorId, now_ms: u64, events: &mut EventQueue) {
        let Some(entry) = self.entries.get_mut(&actor) else {
            return;
        };
        if entry.state == CombatState::Dead {
            return;
        }
        entry.last_hostile_ms = now_ms;
        if entry.state != CombatState::InCombat {
            transition(actor, entry, CombatState::InCombat, events);
        }
    }

    /// Enters `Dead` and emits `ActorKilled`. Returns `false` and does
    /// nothing if the victim is already dead or unknown.
    pub fn trigger_death(
        &mut self,
        victim: ActorId,
        killer: ActorId,
        context: KillContext,
        events: &mut EventQueue,
    ) -> bool {
        let Some(entry) = self.entries.get_mut(&victim) else {
            return false;
        };
        if entry.state == CombatState::Dead {
            debug!(target: "combat::tracker", victim = %victim, "death already handled");
            return false;
        }
        transition(victim, entry, CombatState::Dead, events);
        info!(target: "combat::tracker", victim = %victim, killer = %killer, "actor killed");
        events.push(CombatEvent::ActorKilled {
            killer,
            victim,
            context,
        });
        true
    }

    /// Leaves `Dead` for `Peaceful`. No-op for living actors.
    pub fn revive(&mut self, actor: ActorId, events: &mut EventQueue) -> bool {
        match self.entries.get_mut(&actor) {
            Some(entry) if entry.state == CombatState::Dead => {
                transition(actor, entry, CombatState::Peaceful, events);
                true
            }
            _ => false,
        }
    }

    /// Drops expired engagement windows.
    ///
    /// InCombat falls back to Engaged while a session is still armed, else to
    /// Peaceful. Engaged without a session becomes Peaceful.
    pub fn expire(
        &mut self,
        now_ms: u64,
        has_session: impl Fn(ActorId) -> bool,
        events: &mut EventQueue,
    ) {
        for (&actor, entry) in self.entries.iter_mut() {
            match entry.state {
                CombatState::InCombat
                    if now_ms.saturating_sub(entry.last_hostile_ms) >= self.window_ms =>
                {
                    let next = if has_session(actor) {
                        CombatState::Engaged
                    } else {
                        CombatState::Peaceful
                    };
                    transition(actor, entry, next, events);
                }
                CombatState::Engaged if !has_session(actor) => {
                    transition(actor, entry, CombatState::Peaceful, events);
                }
                _ => {}
            }
        }
    }
}

fn transition(actor: ActorId, entry: &mut Entry, to: CombatState, events: &mut EventQueue) {
    let from = entry.state;
    entry.state = to;
    debug!(target: "combat::tracker", actor = %actor, ?from, ?to, "state changed");
    events.push(CombatEvent::StateChanged { actor, from, to });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::{DamageType, PacketOrigin};

    const A: ActorId = ActorId(1);
    const B: ActorId = ActorId(2);

    fn context() -> KillContext {
        KillContext {
            origin: PacketOrigin::Weapon,
            damage_type: DamageType::Physical,
            at_ms: 0,
        }
    }

    fn tracker() -> CombatStateTracker {
        let mut tracker = CombatStateTracker::new(1000);
        tracker.register(A);
        tracker.register(B);
        tracker
    }

    #[test]
    fn death_is_idempotent() {
        let mut tracker = tracker();
        let mut events = EventQueue::new();
        assert!(tracker.trigger_death(B, A, context(), &mut events));
        assert!(!tracker.trigger_death(B, A, context(), &mut events));

        let kills = events
            .iter()
            .filter(|e| matches!(e, CombatEvent::ActorKilled { .. }))
            .count();
        assert_eq!(kills, 1);
    }

    #[test]
    fn dead_ignores_hostile_until_revived() {
        let mut tracker = tracker();
        let mut events = EventQueue::new();
        tracker.trigger_death(B, A, context(), &mut events);
        tracker.notify_hostile(B, 10, &mut events);
        tracker.notify_engaged(B, &mut events);
        assert_eq!(tracker.state(B), CombatState::Dead);

        assert!(tracker.revive(B, &mut events));
        assert_eq!(tracker.state(B), CombatState::Peaceful);
        assert!(!tracker.revive(B, &mut events));
    }

    #[test]
    fn window_expiry_respects_open_sessions() {
        let mut tracker = tracker();
        let mut events = EventQueue::new();
        tracker.notify_engaged(A, &mut events);
        assert_eq!(tracker.state(A), CombatState::Engaged);
        tracker.notify_hostile(A, 100, &mut events);
        tracker.notify_hostile(B, 100, &mut events);

        tracker.expire(900, |_| true, &mut events);
        assert_eq!(tracker.state(A), CombatState::InCombat);

        tracker.expire(1100, |actor| actor == A, &mut events);
        assert_eq!(tracker.state(A), CombatState::Engaged);
        assert_eq!(tracker.state(B), CombatState::Peaceful);

        tracker.expire(1200, |_| false, &mut events);
        assert_eq!(tracker.state(A), CombatState::Peaceful);
    }

    #[test]
    fn hostile_action_refreshes_window() {
        let mut tracker = tracker();
        let mut events = EventQueue::new();
        tracker.notify_hostile(A, 0, &mut events);
        tracker.notify_hostile(A, 800, &mut events);
        tracker.expire(1500, |_| false, &mut events);
        assert_eq!(tracker.state(A), CombatState::InCombat);
        tracker.expire(1800, |_| false, &mut events);
        assert_eq!(tracker.state(A), CombatState::Peaceful);
    }
}
