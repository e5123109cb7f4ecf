//! On-hit effects: hit-spell procs and leach.

use crate::env::{CombatEnv, RollKey, RollKind, SpellId};
use crate::state::ActorId;
use crate::stats::ProcProfile;

/// `min(floor(dealt * fraction), headroom)`.
///
/// Never overdraws the attacker's missing resource and never exceeds the
/// rolled amount.
pub fn leach_amount(dealt: u32, fraction: f32, headroom: u32) -> u32 {
    let rolled = (dealt as f64 * fraction.clamp(0.0, 1.0) as f64).floor() as u32;
    rolled.min(headroom)
}

/// Rolls every hit-spell independently and returns the ones that fired,
/// paired with their proc index for follow-up rolls.
pub fn roll_procs(
    profile: &ProcProfile,
    env: &CombatEnv<'_>,
    attacker: ActorId,
    sequence: u64,
) -> Vec<(u16, SpellId)> {
    profile
        .spells
        .iter()
        .enumerate()
        .filter_map(|(i, proc)| {
            let key = RollKey::new(attacker, RollKind::ProcCheck, sequence).indexed(i as u16);
            env.rng
                .chance(env.roll_seed(key), proc.chance as f64)
                .then_some((i as u16, proc.spell))
        })
        .collect()
}
