//! Simulation configuration read from the process environment.
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Scenario settings for the headless simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    /// Directory holding `config.toml`, `catalog.ron` and `actors.ron`.
    pub content_dir: PathBuf,
    /// Upper bound on simulated ticks.
    pub ticks: u32,
    pub seed: u64,
    /// Ticks advanced between player decisions.
    pub decision_interval: u32,
    /// Distance a player may cover per tick when closing in.
    pub move_per_tick: f32,
    /// Emit every combat event as a JSON line on stdout.
    pub json_events: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/data")),
            ticks: 600,
            seed: 0x5eed,
            decision_interval: 5,
            move_per_tick: 0.5,
            json_events: false,
        }
    }
}

impl SimConfig {
    /// Construct configuration from process environment variables.
    ///
    /// - `CONTENT_DIR`
    /// - `SIM_TICKS` / `SIM_SEED`
    /// - `SIM_DECISION_INTERVAL`
    /// - `SIM_JSON_EVENTS` (`1` or `true`)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup("CONTENT_DIR") {
            config.content_dir = PathBuf::from(dir);
        }
        if let Some(ticks) = parse::<u32>(&lookup, "SIM_TICKS") {
            config.ticks = ticks;
        }
        if let Some(seed) = parse::<u64>(&lookup, "SIM_SEED") {
            config.seed = seed;
        }
        if let Some(interval) = parse::<u32>(&lookup, "SIM_DECISION_INTERVAL") {
            config.decision_interval = interval.max(1);
        }
        if let Some(flag) = lookup("SIM_JSON_EVENTS") {
            config.json_events = matches!(flag.trim(), "1" | "true" | "yes");
        }

        config
    }
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparsable environment value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        assert_eq!(SimConfig::from_lookup(lookup(&[])), SimConfig::default());
    }

    #[test]
    fn overrides_are_applied() {
        let config = SimConfig::from_lookup(lookup(&[
            ("CONTENT_DIR", "/tmp/content"),
            ("SIM_TICKS", "50"),
            ("SIM_SEED", "42"),
            ("SIM_DECISION_INTERVAL", "0"),
            ("SIM_JSON_EVENTS", "true"),
        ]));
        assert_eq!(config.content_dir, PathBuf::from("/tmp/content"));
        assert_eq!(config.ticks, 50);
        assert_eq!(config.seed, 42);
        assert_eq!(config.decision_interval, 1);
        assert!(config.json_events);
    }

    #[test]
    fn garbage_values_fall_back() {
        let config = SimConfig::from_lookup(lookup(&[("SIM_TICKS", "many")]));
        assert_eq!(config.ticks, SimConfig::default().ticks);
    }
}
