//! Stat aggregation into the per-actor [`CombatSnapshot`].
mod aggregator;
mod snapshot;
mod swing;
mod weapon;

pub use aggregator::{ActorInputs, recompute};
pub use snapshot::CombatSnapshot;
pub use swing::{dex_bonus, snapshot_swing_ms, swing_time_ms};
pub use weapon::{LeachProc, ProcProfile, SpellProc, WeaponProfile, WeaponSource};
