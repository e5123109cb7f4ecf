//! Headless combat simulation.
//!
//! Loads tuning, catalogs and an actor roster from a content directory, runs
//! the skirmish on a manually ticked runtime and logs a summary.
mod config;
mod scenario;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::SimConfig;
use scenario::Scenario;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config = SimConfig::from_env();
    info!(
        content_dir = %config.content_dir.display(),
        ticks = config.ticks,
        seed = config.seed,
        "starting simulation"
    );

    let summary = Scenario::load(config)?.run().await?;

    for (killer, victim) in &summary.kills {
        info!(
            killer = summary.name(*killer),
            victim = summary.name(*victim),
            "kill"
        );
    }
    info!(
        ticks = summary.ticks,
        hits = summary.hits,
        misses = summary.misses,
        damage = summary.damage,
        healed = summary.healed,
        broken_items = summary.broken_items,
        kills = summary.kills.len(),
        "simulation finished"
    );
    Ok(())
}
