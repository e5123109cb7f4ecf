//! Attack session scheduling.
//!
//! One independent timer per attacker, advanced once per simulation step.
//! The scheduler decides *when* a swing happens; the resolver decides *what*
//! happens.

mod session;

use std::collections::BTreeMap;

use tracing::{debug, trace};

pub use session::{AttackSession, SessionPhase};

use crate::events::CancelReason;
use crate::state::ActorId;

/// World queries the scheduler needs each step.
pub trait SessionView {
    /// `Err` when the session must be cancelled.
    fn validate(&self, attacker: ActorId, target: ActorId) -> Result<(), CancelReason>;

    /// Not enough stamina or ammunition, or the attack gate is closed.
    fn is_starved(&self, attacker: ActorId) -> bool;

    /// Freshly computed swing time for the attacker's current snapshot.
    fn swing_ms(&self, attacker: ActorId) -> u32;
}

/// Result of arming a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArmResult {
    Armed,
    /// A session against the same target is already running. Nothing changed.
    AlreadyArmed,
    /// A session against another target was replaced.
    Replaced { previous: ActorId },
}

/// What one scheduler step produced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScheduleReport {
    /// Sessions whose timer elapsed, in attacker order: `(attacker, target)`.
    pub ready: Vec<(ActorId, ActorId)>,
    pub cancelled: Vec<(AttackSession, CancelReason)>,
}

#[derive(Clone, Debug, Default)]
pub struct CombatScheduler {
    sessions: BTreeMap<ActorId, AttackSession>,
}

impl CombatScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms a session at simulated time `now_ms`.
    pub fn arm(&mut self, attacker: ActorId, target: ActorId, now_ms: u64) -> ArmResult {
        if let Some(existing) = self.sessions.get(&attacker)
            && existing.target == target
        {
            return ArmResult::AlreadyArmed;
        }
        let session = AttackSession::new(attacker, target).arm(now_ms);
        debug!(target: "combat::scheduler", attacker = %attacker, target = %target, "session armed");
        match self.sessions.insert(attacker, session) {
            Some(previous) => ArmResult::Replaced {
                previous: previous.target,
            },
            None => ArmResult::Armed,
        }
    }

    pub fn cancel(&mut self, attacker: ActorId) -> Option<AttackSession> {
        self.sessions.remove(&attacker).map(|mut session| {
            session.phase = SessionPhase::Cancelled;
            debug!(target: "combat::scheduler", attacker = %attacker, "session cancelled");
            session
        })
    }

    /// Cancels every session the actor attacks with or is targeted by.
    pub fn cancel_involving(&mut self, actor: ActorId) -> Vec<AttackSession> {
        let attackers: Vec<ActorId> = self
            .sessions
            .values()
            .filter(|s| s.involves(actor))
            .map(|s| s.attacker)
            .collect();
        attackers
            .into_iter()
            .filter_map(|attacker| self.cancel(attacker))
            .collect()
    }

    pub fn session(&self, attacker: ActorId) -> Option<&AttackSession> {
        self.sessions.get(&attacker)
    }

    pub fn has_session(&self, attacker: ActorId) -> bool {
        self.sessions.contains_key(&attacker)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn sessions(&self) -> impl Iterator<Item = &AttackSession> {
        self.sessions.values()
    }

    /// Advances every session by `dt_ms`, the step that ends at `now_ms`.
    ///
    /// Invalid sessions are cancelled and starved sessions hold without
    /// counting. An armed session starts its first countdown here, but a
    /// session armed at `now_ms` (during this step) counts nothing until the
    /// next step, so every first swing lasts its full swing time after arming.
    pub fn tick(&mut self, now_ms: u64, dt_ms: u32, view: &impl SessionView) -> ScheduleReport {
        let mut report = ScheduleReport::default();
        let mut doomed = Vec::new();

        for session in self.sessions.values_mut() {
            if let Err(reason) = view.validate(session.attacker, session.target) {
                doomed.push((session.attacker, reason));
                continue;
            }
            let armed_this_step =
                session.phase == SessionPhase::Armed && session.armed_at_ms >= now_ms;
            if session.phase == SessionPhase::Armed {
                session.wait(view.swing_ms(session.attacker));
            }
            let starved = view.is_starved(session.attacker);
            if starved && !session.starved {
                debug!(target: "combat::scheduler", attacker = %session.attacker, "session paused");
            } else if !starved && session.starved {
                debug!(target: "combat::scheduler", attacker = %session.attacker, "session resumed");
            }
            let counted = if armed_this_step { 0 } else { dt_ms };
            if session.advance(counted, starved) {
                trace!(target: "combat::scheduler", attacker = %session.attacker, target = %session.target, "swing ready");
                report.ready.push((session.attacker, session.target));
            }
        }

        for (attacker, reason) in doomed {
            if let Some(session) = self.cancel(attacker) {
                report.cancelled.push((session, reason));
            }
        }
        report
    }

    /// Re-arms a resolved session with a freshly computed swing time.
    pub fn complete(&mut self, attacker: ActorId, swing_ms: u32) {
        if let Some(session) = self.sessions.get_mut(&attacker) {
            session.swings += 1;
            session.wait(swing_ms);
        }
    }

    /// Puts a ready session back into a paused zero-length wait; it fires as
    /// soon as resources recover.
    pub fn hold(&mut self, attacker: ActorId) {
        if let Some(session) = self.sessions.get_mut(&attacker) {
            session.wait(0);
            session.starved = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    struct View {
        swing_ms: u32,
        starved: Cell<bool>,
        valid: Cell<bool>,
    }

    impl View {
        fn new(swing_ms: u32) -> Self {
            Self {
                swing_ms,
                starved: Cell::new(false),
                valid: Cell::new(true),
            }
        }
    }

    impl SessionView for View {
        fn validate(&self, _: ActorId, _: ActorId) -> Result<(), CancelReason> {
            if self.valid.get() {
                Ok(())
            } else {
                Err(CancelReason::TargetInvalid)
            }
        }

        fn is_starved(&self, _: ActorId) -> bool {
            self.starved.get()
        }

        fn swing_ms(&self, _: ActorId) -> u32 {
            self.swing_ms
        }
    }

    const A: ActorId = ActorId(1);
    const B: ActorId = ActorId(2);
    const C: ActorId = ActorId(3);

    /// Drives the scheduler on a 100 ms clock.
    struct Clock {
        now_ms: u64,
    }

    impl Clock {
        fn new() -> Self {
            Self { now_ms: 0 }
        }

        fn step(&mut self, scheduler: &mut CombatScheduler, view: &View) -> ScheduleReport {
            self.now_ms += 100;
            scheduler.tick(self.now_ms, 100, view)
        }
    }

    #[test]
    fn first_swing_fires_after_full_swing_time() {
        let view = View::new(2000);
        let mut scheduler = CombatScheduler::new();
        let mut clock = Clock::new();
        scheduler.arm(A, B, clock.now_ms);

        for _ in 0..19 {
            assert!(clock.step(&mut scheduler, &view).ready.is_empty());
        }
        assert_eq!(clock.step(&mut scheduler, &view).ready, vec![(A, B)]);
    }

    #[test]
    fn starvation_pauses_without_cancelling() {
        let view = View::new(500);
        let mut scheduler = CombatScheduler::new();
        let mut clock = Clock::new();
        scheduler.arm(A, B, clock.now_ms);
        clock.step(&mut scheduler, &view);

        view.starved.set(true);
        for _ in 0..10 {
            let report = clock.step(&mut scheduler, &view);
            assert!(report.ready.is_empty());
            assert!(report.cancelled.is_empty());
        }
        let session = scheduler.session(A).copied();
        assert_eq!(session.and_then(|s| s.remaining_ms()), Some(400));
        assert!(session.is_some_and(|s| s.is_starved()));

        view.starved.set(false);
        for _ in 0..3 {
            clock.step(&mut scheduler, &view);
        }
        assert_eq!(clock.step(&mut scheduler, &view).ready, vec![(A, B)]);
    }

    #[test]
    fn invalid_sessions_cancel() {
        let view = View::new(500);
        let mut scheduler = CombatScheduler::new();
        let mut clock = Clock::new();
        scheduler.arm(A, B, clock.now_ms);
        view.valid.set(false);
        let report = clock.step(&mut scheduler, &view);
        assert_eq!(report.cancelled.len(), 1);
        assert_eq!(report.cancelled[0].0.phase, SessionPhase::Cancelled);
        assert!(!scheduler.has_session(A));
    }

    #[test]
    fn arm_same_target_is_noop_other_target_replaces() {
        let view = View::new(500);
        let mut scheduler = CombatScheduler::new();
        let mut clock = Clock::new();
        assert_eq!(scheduler.arm(A, B, clock.now_ms), ArmResult::Armed);
        clock.step(&mut scheduler, &view);
        assert_eq!(scheduler.arm(A, B, clock.now_ms), ArmResult::AlreadyArmed);
        assert_eq!(
            scheduler.session(A).and_then(|s| s.remaining_ms()),
            Some(400)
        );
        assert_eq!(scheduler.arm(A, C, clock.now_ms), ArmResult::Replaced { previous: B });
        assert_eq!(scheduler.session(A).map(|s| s.phase), Some(SessionPhase::Armed));
    }

    #[test]
    fn cancel_involving_catches_both_roles() {
        let mut scheduler = CombatScheduler::new();
        scheduler.arm(A, B, 0);
        scheduler.arm(B, C, 0);
        scheduler.arm(C, A, 0);
        let cancelled = scheduler.cancel_involving(B);
        assert_eq!(cancelled.len(), 2);
        assert_eq!(scheduler.len(), 1);
        assert!(scheduler.has_session(C));
    }

    #[test]
    fn complete_rearms_with_new_swing() {
        let view = View::new(300);
        let mut scheduler = CombatScheduler::new();
        let mut clock = Clock::new();
        scheduler.arm(A, B, clock.now_ms);
        for _ in 0..3 {
            clock.step(&mut scheduler, &view);
        }
        assert!(scheduler.session(A).is_some_and(|s| s.is_ready()));
        scheduler.complete(A, 700);
        assert_eq!(
            scheduler.session(A).and_then(|s| s.remaining_ms()),
            Some(700)
        );
        assert_eq!(scheduler.session(A).map(|s| s.swings), Some(1));
    }

    #[test]
    fn arming_mid_step_does_not_count_that_step() {
        let view = View::new(2000);
        let mut scheduler = CombatScheduler::new();
        let mut clock = Clock::new();
        clock.step(&mut scheduler, &view);
        clock.step(&mut scheduler, &view);

        // Armed after the clock reached 200 ms, as a brain does inside a tick.
        scheduler.arm(A, B, clock.now_ms);
        assert!(scheduler.tick(clock.now_ms, 100, &view).ready.is_empty());
        assert_eq!(
            scheduler.session(A).and_then(|s| s.remaining_ms()),
            Some(2000)
        );

        for _ in 0..19 {
            assert!(clock.step(&mut scheduler, &view).ready.is_empty());
        }
        assert_eq!(clock.step(&mut scheduler, &view).ready, vec![(A, B)]);
        assert_eq!(clock.now_ms, 2200);
    }
}
