//! Content factory for loading a whole data directory.

use std::path::{Path, PathBuf};

use combat_core::{BehaviorParams, CatalogSnapshot, CombatConfig};

use crate::loaders::{ActorLoader, CatalogLoader, ConfigLoader, LoadResult, LoadedActor};

/// Everything a host needs to start an engine.
#[derive(Debug, Clone)]
pub struct ContentBundle {
    pub config: CombatConfig,
    pub catalog: CatalogSnapshot,
    pub actors: Vec<LoadedActor>,
}

/// Content factory that loads all combat content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml      (optional, defaults otherwise)
/// ├── catalog.ron
/// └── actors.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Load combat configuration from `config.toml`, or defaults if absent.
    pub fn load_config(&self) -> LoadResult<CombatConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            tracing::info!(target: "content::factory", "no config.toml, using defaults");
            return Ok(CombatConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load the catalog from `catalog.ron`.
    pub fn load_catalog(&self) -> LoadResult<CatalogSnapshot> {
        let path = self.data_dir.join("catalog.ron");
        CatalogLoader::load(&path)
    }

    /// Load the actor roster from `actors.ron`. Monster behavior is
    /// layered on `defaults`.
    pub fn load_actors(
        &self,
        catalog: &CatalogSnapshot,
        defaults: &BehaviorParams,
    ) -> LoadResult<Vec<LoadedActor>> {
        let path = self.data_dir.join("actors.ron");
        ActorLoader::load(&path, catalog, defaults)
    }

    /// Load config, catalog and roster together.
    pub fn load_all(&self) -> LoadResult<ContentBundle> {
        let config = self.load_config()?;
        let catalog = self.load_catalog()?;
        let actors = self.load_actors(&catalog, &config.monster)?;
        Ok(ContentBundle {
            config,
            catalog,
            actors,
        })
    }
}
