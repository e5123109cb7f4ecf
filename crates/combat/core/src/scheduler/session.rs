//! Per-attacker attack session and its timer phases.

use crate::state::ActorId;

/// Timer phase of one attack session.
///
/// ```text
/// Idle → Armed → Waiting(remaining) → Ready → Waiting(next swing) → ...
///                    ↑ paused while starved
/// any → Cancelled
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SessionPhase {
    Idle,
    Armed,
    Waiting { remaining_ms: u32 },
    Ready,
    Cancelled,
}

/// One attacker's live attack against one target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackSession {
    pub attacker: ActorId,
    pub target: ActorId,
    pub phase: SessionPhase,
    /// Time counted toward the current swing.
    pub accumulated_ms: u64,
    /// Countdown is paused for lack of stamina, ammo or the attack gate.
    pub starved: bool,
    /// Swings resolved by this session.
    pub swings: u32,
    /// Simulated time at which the session was armed.
    pub armed_at_ms: u64,
}

impl AttackSession {
    pub fn new(attacker: ActorId, target: ActorId) -> Self {
        Self {
            attacker,
            target,
            phase: SessionPhase::Idle,
            accumulated_ms: 0,
            starved: false,
            swings: 0,
            armed_at_ms: 0,
        }
    }

    pub fn arm(mut self, now_ms: u64) -> Self {
        self.phase = SessionPhase::Armed;
        self.armed_at_ms = now_ms;
        self
    }

    pub fn is_starved(&self) -> bool {
        self.starved
    }

    pub fn is_ready(&self) -> bool {
        self.phase == SessionPhase::Ready
    }

    pub fn remaining_ms(&self) -> Option<u32> {
        match self.phase {
            SessionPhase::Waiting { remaining_ms } => Some(remaining_ms),
            _ => None,
        }
    }

    pub fn involves(&self, actor: ActorId) -> bool {
        self.attacker == actor || self.target == actor
    }

    /// Starts a new swing countdown.
    pub(crate) fn wait(&mut self, swing_ms: u32) {
        self.phase = SessionPhase::Waiting {
            remaining_ms: swing_ms,
        };
        self.accumulated_ms = 0;
    }

    /// Counts down unless starved. Returns `true` when the swing elapsed.
    pub(crate) fn advance(&mut self, dt_ms: u32, starved: bool) -> bool {
        let SessionPhase::Waiting { remaining_ms } = self.phase else {
            return false;
        };
        self.starved = starved;
        if starved {
            return false;
        }
        let counted = dt_ms.min(remaining_ms);
        self.accumulated_ms += counted as u64;
        let remaining_ms = remaining_ms - counted;
        self.phase = if remaining_ms == 0 {
            SessionPhase::Ready
        } else {
            SessionPhase::Waiting { remaining_ms }
        };
        remaining_ms == 0
    }
}
