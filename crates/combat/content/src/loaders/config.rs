//! Combat configuration loader.

use std::path::Path;

use combat_core::CombatConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for combat tuning from TOML files.
///
/// Every table is optional; missing keys keep their defaults.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    pub fn load(path: &Path) -> LoadResult<CombatConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse config data from TOML text.
    pub fn parse(content: &str) -> LoadResult<CombatConfig> {
        let config: CombatConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        if config.tick_ms == 0 {
            anyhow::bail!("tick_ms must be positive");
        }
        if config.swing.status_multiplier_min > config.swing.status_multiplier_max {
            anyhow::bail!(
                "swing status multiplier bounds are inverted: {} > {}",
                config.swing.status_multiplier_min,
                config.swing.status_multiplier_max
            );
        }
        if config.bandage.heal_min > config.bandage.heal_max {
            anyhow::bail!(
                "bandage heal range is inverted: {} > {}",
                config.bandage.heal_min,
                config.bandage.heal_max
            );
        }

        Ok(config)
    }
}
