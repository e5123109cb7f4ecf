/// Tunables for one monster's decision loop. Distances are world units,
/// health thresholds are fractions of max HP.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BehaviorParams {
    pub aggro_radius: f32,
    /// Maximum distance from home before giving up a chase.
    pub leash_radius: f32,
    pub preferred_range: f32,
    /// Half-width of the band around `preferred_range` held while attacking.
    pub range_tolerance: f32,
    pub flee_at_hp_pct: f32,
    /// Separation from the threat at which fleeing ends.
    pub flee_distance: f32,
    pub reengage_hp_pct: f32,
    /// Passive HP regenerated per second while recovering.
    pub regen_per_sec: f32,
    /// World units per second.
    pub move_speed: f32,
    pub scan_interval_ms: u32,
}

impl Default for BehaviorParams {
    fn default() -> Self {
        Self {
            aggro_radius: 8.0,
            leash_radius: 20.0,
            preferred_range: 1.0,
            range_tolerance: 0.25,
            flee_at_hp_pct: 0.25,
            flee_distance: 12.0,
            reengage_hp_pct: 0.6,
            regen_per_sec: 2.5,
            move_speed: 4.0,
            scan_interval_ms: 500,
        }
    }
}

impl BehaviorParams {
    pub fn band_min(&self) -> f32 {
        (self.preferred_range - self.range_tolerance).max(0.0)
    }

    pub fn band_max(&self) -> f32 {
        self.preferred_range + self.range_tolerance
    }

    /// Beyond this the monster gives up holding position and chases again.
    pub fn chase_threshold(&self) -> f32 {
        self.preferred_range + 2.0 * self.range_tolerance
    }
}
