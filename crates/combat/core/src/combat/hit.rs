//! Hit chance.

use crate::env::RngOracle;

/// `clamp01(base + attackerDelta - defenderDelta - penalty)`.
pub fn final_hit_chance(base: f32, attacker_delta: f32, defender_delta: f32, penalty: f32) -> f32 {
    let chance = base + attacker_delta - defender_delta - penalty;
    if chance.is_nan() {
        return 0.0;
    }
    chance.clamp(0.0, 1.0)
}

/// One Bernoulli trial against `chance`.
pub fn check_hit(chance: f32, rng: &dyn RngOracle, seed: u64) -> bool {
    rng.chance(seed, chance as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::PcgRng;

    #[test]
    fn chance_is_clamped() {
        assert_eq!(final_hit_chance(0.75, 0.45, 0.0, 0.0), 1.0);
        assert_eq!(final_hit_chance(0.1, 0.0, 0.45, 0.25), 0.0);
        assert!((final_hit_chance(0.75, 0.1, 0.2, 0.0) - 0.65).abs() < 1e-6);
    }

    #[test]
    fn certain_outcomes_hold() {
        let rng = PcgRng;
        for seed in 0..100 {
            assert!(check_hit(1.0, &rng, seed));
            assert!(!check_hit(0.0, &rng, seed));
        }
    }
}
