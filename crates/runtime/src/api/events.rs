//! Types published to and queried by runtime clients.
use serde::{Deserialize, Serialize};

use combat_core::{
    ActorRecord, AttackSession, Channel, CombatEvent, CombatSnapshot, CombatState, MonsterState,
    Tick,
};

/// A combat event stamped with the tick that produced it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuntimeEvent {
    pub tick: Tick,
    pub now_ms: u64,
    pub event: CombatEvent,
}

/// Read-only copy of everything the engine knows about one actor.
///
/// The snapshot is refreshed before the view is taken, so it always matches
/// the record's current inputs.
#[derive(Clone, Debug)]
pub struct ActorView {
    pub record: ActorRecord,
    pub snapshot: CombatSnapshot,
    pub state: CombatState,
    pub session: Option<AttackSession>,
    pub channel: Option<Channel>,
    /// Present only for actors driven by a monster decision loop.
    pub monster: Option<MonsterState>,
}

impl ActorView {
    pub fn is_alive(&self) -> bool {
        self.state != CombatState::Dead
    }
}
