//! Context engine: load, score, select, assemble.
//!
//! Collaborators are handed in at construction and reused for every
//! request. Failures in optional enrichment (memory log, archive,
//! timeline, similarity) are absorbed and logged; only a persona +
//! message pair that cannot fit the budget reaches the caller.

use chrono::{DateTime, Utc};
use hearth_config::AppConfig;
use hearth_core::dialogue::DialogueTurn;
use hearth_core::memory::{MemoryLog, MemoryRecord};
use hearth_core::persona::Persona;
use hearth_core::timeline::{TimelineEvent, TimelineProvider};
use hearth_memory::ImportedArchive;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::assembler::{AssembledContext, AssemblyError, AssemblyInput, ContextAssembler};
use crate::scoring::{HeuristicScorer, RelevanceScorer, ScoringContext};
use crate::select::{ArchivalBoost, ScoredCandidate, select_top_k, select_top_k_with_boost};
use crate::timeline::select_timeline;
use crate::window;

/// Limits and lane settings the engine applies per request.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub max_dialogue_turns: usize,
    pub max_memories: usize,
    pub max_imported_memories: usize,
    pub max_timeline_events: usize,
    pub digest_max_lines: usize,
    pub digest_max_chars_per_line: usize,
    pub budget_chars: usize,
    /// 0 = score the full log
    pub memory_scan_limit: usize,
    pub imported_scan_limit: usize,
    pub archival_marker: String,
    pub imported_source_boost: f64,
}

impl EngineSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        let c = &config.context;
        Self {
            max_dialogue_turns: c.max_dialogue_turns,
            max_memories: c.max_memories,
            max_imported_memories: c.max_imported_memories,
            max_timeline_events: c.max_timeline_events,
            digest_max_lines: c.digest_max_lines,
            digest_max_chars_per_line: c.digest_max_chars_per_line,
            budget_chars: c.budget_chars,
            memory_scan_limit: c.memory_scan_limit,
            imported_scan_limit: c.imported_scan_limit,
            archival_marker: config.scoring.archival_marker.clone(),
            imported_source_boost: config.scoring.imported_source_boost,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// One assembly request.
#[derive(Debug, Clone)]
pub struct ContextRequest {
    pub owner_id: String,
    pub query_text: String,
    /// Recent transcript, oldest first. Trimmed to the configured window.
    pub recent_turns: Vec<DialogueTurn>,
    /// Overrides the configured budget.
    pub budget_chars: Option<usize>,
    /// Reference instant for recency; defaults to now.
    pub now: Option<DateTime<Utc>>,
}

impl ContextRequest {
    pub fn new(owner_id: impl Into<String>, query_text: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            query_text: query_text.into(),
            recent_turns: Vec::new(),
            budget_chars: None,
            now: None,
        }
    }

    pub fn with_turns(mut self, turns: Vec<DialogueTurn>) -> Self {
        self.recent_turns = turns;
        self
    }

    pub fn with_budget(mut self, budget_chars: usize) -> Self {
        self.budget_chars = Some(budget_chars);
        self
    }

    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }
}

pub struct ContextEngine {
    memory: Arc<dyn MemoryLog>,
    imported: Option<ImportedArchive>,
    timeline: Option<Arc<dyn TimelineProvider>>,
    scorer: Arc<dyn RelevanceScorer>,
    timeline_scorer: HeuristicScorer,
    persona: Persona,
    settings: EngineSettings,
}

impl ContextEngine {
    pub fn new(
        memory: Arc<dyn MemoryLog>,
        scorer: Arc<dyn RelevanceScorer>,
        persona: Persona,
        settings: EngineSettings,
    ) -> Self {
        Self {
            memory,
            imported: None,
            timeline: None,
            scorer,
            timeline_scorer: HeuristicScorer::default(),
            persona,
            settings,
        }
    }

    pub fn with_imported(mut self, archive: ImportedArchive) -> Self {
        self.imported = Some(archive);
        self
    }

    pub fn with_timeline(mut self, provider: Arc<dyn TimelineProvider>) -> Self {
        self.timeline = Some(provider);
        self
    }

    /// Weights used to rank timeline events (the heuristic tiers).
    pub fn with_timeline_scorer(mut self, scorer: HeuristicScorer) -> Self {
        self.timeline_scorer = scorer;
        self
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Build the context for one incoming message.
    pub async fn assemble(&self, request: ContextRequest) -> Result<AssembledContext, AssemblyError> {
        let s = &self.settings;
        let now = request.now.unwrap_or_else(Utc::now);

        let transcript = window::trim(&request.recent_turns, s.max_dialogue_turns);
        let digest = window::summarize_recent_user_turns(
            &transcript,
            s.digest_max_lines,
            s.digest_max_chars_per_line,
        );

        let (owned, archived, events) = tokio::join!(
            self.load_memories(&request.owner_id),
            self.load_archive(),
            self.load_timeline(),
        );

        let (archival_own, ordinary): (Vec<MemoryRecord>, Vec<MemoryRecord>) = owned
            .into_iter()
            .partition(|r| r.is_archival(&s.archival_marker));

        let ctx = ScoringContext::new(&request.query_text, &transcript, now);

        let memories = select_top_k(self.scorer.as_ref(), &ctx, ordinary, s.max_memories).await;

        let selected: HashSet<String> = memories.iter().map(|c| c.record.normalized_summary()).collect();
        let imported_candidates: Vec<MemoryRecord> = archival_own
            .into_iter()
            .chain(archived)
            .filter(|r| !selected.contains(&r.normalized_summary()))
            .collect();
        let imported = select_top_k_with_boost(
            self.scorer.as_ref(),
            &ctx,
            imported_candidates,
            s.max_imported_memories,
            ArchivalBoost {
                marker: &s.archival_marker,
                boost: s.imported_source_boost,
            },
        )
        .await;

        let timeline = select_timeline(
            &request.query_text,
            &events,
            s.max_timeline_events,
            now,
            &self.timeline_scorer,
        );

        let memories = into_records(memories);
        let imported = into_records(imported);
        let budget = request.budget_chars.unwrap_or(s.budget_chars);

        let assembled = ContextAssembler::new(budget).assemble(&AssemblyInput {
            persona: &self.persona.system_prompt,
            utterance: &request.query_text,
            transcript: &transcript,
            digest: &digest,
            memories: &memories,
            timeline: &timeline,
            imported: &imported,
        });

        match &assembled {
            Ok(context) => info!(
                owner = %request.owner_id,
                scorer = self.scorer.name(),
                memories = memories.len(),
                imported = imported.len(),
                timeline = timeline.len(),
                total_chars = context.total_chars,
                budget,
                "Context assembled"
            ),
            Err(e) => warn!(owner = %request.owner_id, error = %e, "Context assembly failed"),
        }

        assembled
    }

    async fn load_memories(&self, owner_id: &str) -> Vec<MemoryRecord> {
        let records = match self.settings.memory_scan_limit {
            0 => self.memory.load_all(owner_id).await,
            limit => self.memory.load_recent(owner_id, limit).await,
        };
        debug!(owner = %owner_id, backend = self.memory.name(), count = records.len(), "Memories loaded");
        records
    }

    async fn load_archive(&self) -> Vec<MemoryRecord> {
        match &self.imported {
            Some(archive) => archive.load(self.settings.imported_scan_limit).await,
            None => Vec::new(),
        }
    }

    async fn load_timeline(&self) -> Vec<TimelineEvent> {
        let Some(provider) = &self.timeline else {
            return Vec::new();
        };
        match provider.events().await {
            Ok(events) => events,
            Err(e) => {
                warn!(provider = provider.name(), error = %e, "Timeline unavailable, continuing without it");
                Vec::new()
            }
        }
    }
}

fn into_records(candidates: Vec<ScoredCandidate>) -> Vec<MemoryRecord> {
    candidates.into_iter().map(|c| c.record).collect()
}
