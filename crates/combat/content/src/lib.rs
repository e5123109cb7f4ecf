//! Data-driven combat content and loaders.
//!
//! This crate reads authored data from disk:
//! - Combat tuning (TOML): caps, swing floor, channel timings, monster defaults
//! - Catalogs (RON): item, affix and spell definitions
//! - Actor rosters (RON): spawn records for players and monsters
//!
//! Content feeds the engine's oracles and spawn calls. It never holds live
//! combat state. All loaders deserialize combat-core types directly where the
//! authored shape matches, and go through small authoring types where it does not.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    ActorLoader, ActorSpec, BehaviorOverrides, CatalogFile, CatalogLoader, ConfigLoader, ContentBundle,
    ContentFactory, ItemSpec, LoadResult, LoadedActor,
};
