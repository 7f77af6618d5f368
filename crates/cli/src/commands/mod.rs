//! CLI subcommand implementations.

pub mod config_cmd;
pub mod context;
pub mod dialogue;
pub mod memory;

use hearth_config::AppConfig;
use hearth_context::{ContextEngine, EngineSettings, build_scorer};
use hearth_core::persona::Persona;
use hearth_memory::{DirectoryTimeline, FileMemoryLog, ImportedArchive};
use std::sync::Arc;
use tracing::debug;

pub(crate) fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    config.validate().map_err(|e| format!("Invalid config: {e}"))?;
    Ok(config)
}

/// Wire the file-backed stores, scorer and persona described by `config`.
pub(crate) fn build_engine(config: &AppConfig) -> ContextEngine {
    let storage = &config.storage;
    let similarity = hearth_providers::from_config(&config.similarity);
    let scorer = build_scorer(&config.scoring, similarity);
    let persona = Persona::load(&storage.persona_paths());
    debug!(
        root = %storage.root().display(),
        strategy = ?config.scoring.strategy,
        persona_files = persona.loaded_files.len(),
        "Wiring context engine"
    );

    let mut engine = ContextEngine::new(
        Arc::new(FileMemoryLog::new(storage.memory_dir())),
        scorer,
        persona,
        EngineSettings::from_config(config),
    )
    .with_timeline(Arc::new(DirectoryTimeline::new(storage.timeline_dir())));

    if let Some(path) = &storage.imported_archive {
        engine = engine.with_imported(ImportedArchive::new(
            path.clone(),
            config.scoring.archival_marker.clone(),
        ));
    }
    engine
}
