//! HeroForge Engine - Main entry point.
//!
//! Loads rule data and characters, prints each character's AP ledger as a
//! JSON line and writes the AP cache.

use std::sync::Arc;

use anyhow::Context;
use heroforge_domain::RuleData;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use heroforge_engine::infrastructure::{
    ap_cache_file::JsonApCacheFile,
    clock::SystemClock,
    config::EngineConfig,
    content_files::{load_characters, load_rule_data},
    in_memory::InMemoryCharacterStore,
    ports::CharacterStatePort,
};
use heroforge_engine::use_cases::{LoadStatus, PersistStatus};
use heroforge_engine::App;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "heroforge_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting HeroForge Engine");

    let config = EngineConfig::from_env();
    tracing::info!(cache = %config.cache_path.display(), persist = config.persist_cache, "Loaded configuration");

    let rules = match &config.rule_data_path {
        Some(path) => load_rule_data(path)?,
        None => {
            tracing::warn!("HEROFORGE_RULE_DATA_PATH not set, using empty rule data");
            RuleData::new()
        }
    };
    let characters = match &config.characters_path {
        Some(dir) => load_characters(dir)?,
        None => Vec::new(),
    };
    tracing::info!(
        entries = rules.entry_count(),
        characters = characters.len(),
        "Loaded content"
    );

    let characters = Arc::new(InMemoryCharacterStore::with_characters(characters));
    let app = App::new(
        &config,
        Arc::new(rules),
        characters.clone(),
        Arc::new(JsonApCacheFile::new(&config.cache_path)),
        Arc::new(SystemClock::new()),
    );

    if let LoadStatus::Failed(e) = app.ledger.load_persisted() {
        tracing::warn!(error = %e, "Continuing without the AP cache");
    }

    for id in characters.list_ids() {
        let entry = app
            .ledger
            .entry_for(id)
            .with_context(|| format!("failed to compute ledger for {id}"))?;
        let line = serde_json::to_string(&entry.ledger)
            .with_context(|| format!("failed to render ledger for {id}"))?;
        println!("{id}\t{line}");
    }

    match app.ledger.persist() {
        PersistStatus::Saved => tracing::info!("AP cache written"),
        PersistStatus::Disabled => tracing::info!("AP cache persistence disabled"),
        PersistStatus::Failed(e) => tracing::warn!(error = %e, "AP cache not written"),
    }

    Ok(())
}
