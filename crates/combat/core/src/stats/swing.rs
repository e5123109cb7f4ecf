//! Swing timing.

use super::CombatSnapshot;
use crate::config::SwingConfig;
use crate::state::Attributes;

/// `clamp01(DEX / divisor) * cap`.
pub fn dex_bonus(attributes: &Attributes, config: &SwingConfig) -> f32 {
    let divisor = config.dex_divisor.max(1) as f32;
    (attributes.dex as f32 / divisor).clamp(0.0, 1.0) * config.dex_cap.clamp(0.0, 1.0)
}

/// Swing time in milliseconds:
///
/// ```text
/// max(floor, base * (1 - dexBonus) * (1 - affixSwingBonus) * statusMultiplier)
/// ```
///
/// The floor is absolute; no modifier combination goes below it.
pub fn swing_time_ms(base_ms: u32, dex_bonus: f32, affix_bonus: f32, status: f32, floor_ms: u32) -> u32 {
    let scaled = base_ms as f32
        * (1.0 - dex_bonus.clamp(0.0, 1.0))
        * (1.0 - affix_bonus.clamp(0.0, 1.0))
        * status.max(0.0);
    (scaled.round() as u32).max(floor_ms)
}

/// Swing time for the snapshot's active weapon.
pub fn snapshot_swing_ms(snapshot: &CombatSnapshot, config: &SwingConfig) -> u32 {
    swing_time_ms(
        snapshot.weapon.swing_ms,
        snapshot.dex_bonus,
        snapshot.swing_affix_bonus,
        snapshot.swing_status_multiplier,
        config.floor_ms,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_modifiers_keep_base() {
        assert_eq!(swing_time_ms(2000, 0.0, 0.0, 1.0, 1250), 2000);
    }

    #[test]
    fn floor_wins_over_stacked_bonuses() {
        assert_eq!(swing_time_ms(2000, 0.25, 0.6, 0.25, 1250), 1250);
    }

    #[test]
    fn slow_status_lengthens() {
        assert_eq!(swing_time_ms(2000, 0.0, 0.0, 1.5, 1250), 3000);
    }

    #[test]
    fn dex_bonus_saturates() {
        let config = SwingConfig::default();
        let high = Attributes::new(50, 300, 10);
        assert_eq!(dex_bonus(&high, &config), config.dex_cap);
        let zero = Attributes::new(50, 0, 10);
        assert_eq!(dex_bonus(&zero, &config), 0.0);
    }
}
