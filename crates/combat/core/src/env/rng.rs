//! Deterministic randomness for every combat roll.
//!
//! Rolls are stateless: each one derives its seed from a [`RollKey`] (actor,
//! roll kind, event sequence, index) mixed with the world seed, so any outcome
//! can be reproduced from its inputs alone without replaying a stream.

use crate::state::ActorId;

/// Deterministic random source.
///
/// Implementations must return the same value for the same seed.
pub trait RngOracle: Send + Sync {
    fn next_u32(&self, seed: u64) -> u32;

    /// Uniform float in `[0, 1)`.
    fn unit(&self, seed: u64) -> f64 {
        self.next_u32(seed) as f64 / (u32::MAX as f64 + 1.0)
    }

    /// Bernoulli trial. Probabilities outside `[0, 1]` saturate.
    fn chance(&self, seed: u64, probability: f64) -> bool {
        if probability <= 0.0 {
            return false;
        }
        if probability >= 1.0 {
            return true;
        }
        self.unit(seed) < probability
    }

    /// Uniform integer in `[min, max]` inclusive. Returns `min` when the range is empty.
    fn range(&self, seed: u64, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        let span = (max - min) as u64 + 1;
        min + (self.next_u32(seed) as u64 % span) as u32
    }

    /// Signed variant of [`RngOracle::range`].
    fn range_i32(&self, seed: u64, min: i32, max: i32) -> i32 {
        if min >= max {
            return min;
        }
        let span = (max as i64 - min as i64) as u64 + 1;
        (min as i64 + (self.next_u32(seed) as u64 % span) as i64) as i32
    }
}

/// PCG-XSH-RR: 64-bit LCG state, 32-bit permuted output.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::output(Self::step(seed))
    }
}

/// What a roll decides. Distinct kinds never share a seed for the same event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum RollKind {
    HitCheck = 1,
    DamageRoll = 2,
    ArmorSlot = 3,
    ProcCheck = 4,
    ProcDamage = 5,
    AffixCount = 6,
    AffixPick = 7,
    AffixMagnitude = 8,
    BandageHeal = 9,
    SpellDamage = 10,
}

impl RollKind {
    /// Context word mixed into the seed: kind in the high half, index in the low half.
    pub const fn context(self, index: u16) -> u32 {
        ((self as u32) << 16) | index as u32
    }
}

/// Identity of a single roll.
///
/// `sequence` is the per-actor event counter at the time of the action, so two
/// rolls of the same kind for the same swing differ only by `index`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RollKey {
    pub actor: ActorId,
    pub kind: RollKind,
    pub sequence: u64,
    pub index: u16,
}

impl RollKey {
    pub const fn new(actor: ActorId, kind: RollKind, sequence: u64) -> Self {
        Self {
            actor,
            kind,
            sequence,
            index: 0,
        }
    }

    pub const fn indexed(mut self, index: u16) -> Self {
        self.index = index;
        self
    }

    pub fn seed(&self, game_seed: u64) -> u64 {
        compute_seed(
            game_seed,
            self.sequence,
            self.actor.0,
            self.kind.context(self.index),
        )
    }
}

/// Mixes the seed components with SplitMix/FxHash-style multipliers and a
/// final avalanche.
pub fn compute_seed(game_seed: u64, nonce: u64, actor_id: u32, context: u32) -> u64 {
    let mut hash = game_seed;
    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (actor_id as u64).wrapping_mul(0x517cc1b727220a95);
    hash ^= (context as u64).wrapping_mul(0x85ebca6b);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_same_value() {
        let rng = PcgRng;
        let key = RollKey::new(ActorId(3), RollKind::HitCheck, 17);
        assert_eq!(rng.next_u32(key.seed(99)), rng.next_u32(key.seed(99)));
    }

    #[test]
    fn kinds_and_indices_separate_seeds() {
        let base = RollKey::new(ActorId(3), RollKind::ProcCheck, 17);
        assert_ne!(base.seed(1), base.indexed(1).seed(1));
        assert_ne!(
            base.seed(1),
            RollKey::new(ActorId(3), RollKind::HitCheck, 17).seed(1)
        );
    }

    #[test]
    fn range_stays_inclusive() {
        let rng = PcgRng;
        for seed in 0..2_000u64 {
            let v = rng.range(seed, 3, 7);
            assert!((3..=7).contains(&v));
            let s = rng.range_i32(seed, -2, 2);
            assert!((-2..=2).contains(&s));
        }
        assert_eq!(rng.range(5, 9, 9), 9);
    }

    #[test]
    fn chance_saturates() {
        let rng = PcgRng;
        assert!(!rng.chance(1, 0.0));
        assert!(rng.chance(1, 1.0));
        assert!(rng.unit(42) < 1.0);
    }
}
