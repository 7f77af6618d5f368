//! Configuration loading, validation, and management for Hearth.
//!
//! Loads configuration from `~/.hearth/config.toml` with environment
//! variable overrides. Validates all settings at startup. Scoring weights
//! live here as data so either relevance blend can be reproduced from a
//! config file alone.

pub mod proposal;

use hearth_core::persona::PersonaPaths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.hearth/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Context assembly limits
    #[serde(default)]
    pub context: ContextConfig,

    /// Relevance scoring strategy and weights
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Optional similarity provider
    #[serde(default)]
    pub similarity: SimilarityConfig,

    /// Where memories, transcripts, timeline, and persona live
    #[serde(default)]
    pub storage: StorageConfig,
}

// ── Context ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    #[serde(default = "default_max_dialogue_turns")]
    pub max_dialogue_turns: usize,

    #[serde(default = "default_max_memories")]
    pub max_memories: usize,

    #[serde(default = "default_max_imported_memories")]
    pub max_imported_memories: usize,

    #[serde(default = "default_max_timeline_events")]
    pub max_timeline_events: usize,

    #[serde(default = "default_digest_max_lines")]
    pub digest_max_lines: usize,

    #[serde(default = "default_digest_max_chars_per_line")]
    pub digest_max_chars_per_line: usize,

    /// Upper bound on the serialized context, in characters
    #[serde(default = "default_budget_chars")]
    pub budget_chars: usize,

    /// How many recent records to score per request (0 = the full log)
    #[serde(default = "default_scan_limit")]
    pub memory_scan_limit: usize,

    /// How many imported-archive records to consider per request
    #[serde(default = "default_scan_limit")]
    pub imported_scan_limit: usize,
}

fn default_max_dialogue_turns() -> usize {
    100
}
fn default_max_memories() -> usize {
    3
}
fn default_max_imported_memories() -> usize {
    3
}
fn default_max_timeline_events() -> usize {
    3
}
fn default_digest_max_lines() -> usize {
    8
}
fn default_digest_max_chars_per_line() -> usize {
    80
}
fn default_budget_chars() -> usize {
    24_000
}
fn default_scan_limit() -> usize {
    50
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_dialogue_turns: default_max_dialogue_turns(),
            max_memories: default_max_memories(),
            max_imported_memories: default_max_imported_memories(),
            max_timeline_events: default_max_timeline_events(),
            digest_max_lines: default_digest_max_lines(),
            digest_max_chars_per_line: default_digest_max_chars_per_line(),
            budget_chars: default_budget_chars(),
            memory_scan_limit: default_scan_limit(),
            imported_scan_limit: default_scan_limit(),
        }
    }
}

// ── Scoring ───────────────────────────────────────────────────────────────

/// Which relevance strategy ranks memories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// importance + recency tiers + keyword overlap; no external calls
    #[default]
    Heuristic,
    /// weighted blend of recency, keyword signals, similarity, identity tags
    Blended,
}

impl std::str::FromStr for StrategyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "heuristic" => Ok(Self::Heuristic),
            "blended" => Ok(Self::Blended),
            other => Err(ConfigError::ValidationError(format!(
                "unknown scoring strategy '{other}' (expected heuristic or blended)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub strategy: StrategyKind,

    /// Additive bonus for records carrying the archival marker
    #[serde(default = "default_imported_source_boost")]
    pub imported_source_boost: f64,

    /// Source value or tag that flags a record as imported/archival
    #[serde(default = "default_archival_marker")]
    pub archival_marker: String,

    #[serde(default)]
    pub heuristic: HeuristicWeights,

    #[serde(default)]
    pub blended: BlendWeights,
}

fn default_imported_source_boost() -> f64 {
    0.3
}
fn default_archival_marker() -> String {
    "imported".into()
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            imported_source_boost: default_imported_source_boost(),
            archival_marker: default_archival_marker(),
            heuristic: HeuristicWeights::default(),
            blended: BlendWeights::default(),
        }
    }
}

/// Weights for the heuristic strategy:
/// `importance * importance_weight + recency tier + min(overlap_cap, overlap_per_token * |overlap|)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeuristicWeights {
    #[serde(default = "default_importance_weight")]
    pub importance_weight: f64,
    /// Bonus when the record is at most one day old
    #[serde(default = "default_recency_day")]
    pub recency_day: f64,
    /// ... at most seven days old
    #[serde(default = "default_recency_week")]
    pub recency_week: f64,
    /// ... at most thirty days old
    #[serde(default = "default_recency_month")]
    pub recency_month: f64,
    /// ... older than that
    #[serde(default = "default_recency_older")]
    pub recency_older: f64,
    #[serde(default = "default_overlap_per_token")]
    pub overlap_per_token: f64,
    #[serde(default = "default_overlap_cap")]
    pub overlap_cap: f64,
}

fn default_importance_weight() -> f64 {
    2.0
}
fn default_recency_day() -> f64 {
    1.0
}
fn default_recency_week() -> f64 {
    0.7
}
fn default_recency_month() -> f64 {
    0.4
}
fn default_recency_older() -> f64 {
    0.2
}
fn default_overlap_per_token() -> f64 {
    0.2
}
fn default_overlap_cap() -> f64 {
    1.0
}

impl Default for HeuristicWeights {
    fn default() -> Self {
        Self {
            importance_weight: default_importance_weight(),
            recency_day: default_recency_day(),
            recency_week: default_recency_week(),
            recency_month: default_recency_month(),
            recency_older: default_recency_older(),
            overlap_per_token: default_overlap_per_token(),
            overlap_cap: default_overlap_cap(),
        }
    }
}

impl HeuristicWeights {
    fn values(&self) -> [(&'static str, f64); 7] {
        [
            ("importance_weight", self.importance_weight),
            ("recency_day", self.recency_day),
            ("recency_week", self.recency_week),
            ("recency_month", self.recency_month),
            ("recency_older", self.recency_older),
            ("overlap_per_token", self.overlap_per_token),
            ("overlap_cap", self.overlap_cap),
        ]
    }
}

/// Weights and signal vocabularies for the blended strategy.
///
/// Each component is a value in [0, 1] multiplied by its weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlendWeights {
    #[serde(default = "default_blend_recency")]
    pub recency: f64,
    #[serde(default = "default_blend_emotional")]
    pub emotional: f64,
    #[serde(default = "default_blend_directive")]
    pub directive: f64,
    #[serde(default = "default_blend_similarity")]
    pub similarity: f64,
    #[serde(default = "default_blend_identity")]
    pub identity: f64,

    /// Recency decays linearly to zero over this many minutes
    #[serde(default = "default_recency_horizon_minutes")]
    pub recency_horizon_minutes: f64,

    /// Words in `raw` that mark an emotionally charged memory
    #[serde(default = "default_emotional_keywords")]
    pub emotional_keywords: Vec<String>,

    /// Words in `summary` that mark an instruction about how to behave
    #[serde(default = "default_directive_keywords")]
    pub directive_keywords: Vec<String>,

    /// Tags that mark identity-relevant memories
    #[serde(default = "default_identity_tags")]
    pub identity_tags: Vec<String>,
}

fn default_blend_recency() -> f64 {
    0.4
}
fn default_blend_emotional() -> f64 {
    0.2
}
fn default_blend_directive() -> f64 {
    0.2
}
fn default_blend_similarity() -> f64 {
    0.15
}
fn default_blend_identity() -> f64 {
    0.05
}
fn default_recency_horizon_minutes() -> f64 {
    2000.0
}
fn default_emotional_keywords() -> Vec<String> {
    ["감정", "무섭", "울었", "눈물", "슬펐", "좋았", "강렬"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_directive_keywords() -> Vec<String> {
    ["정리해", "설정", "역할", "톤", "말투", "기억", "수정"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_identity_tags() -> Vec<String> {
    ["말투", "정체성", "관계", "identity", "soul"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            recency: default_blend_recency(),
            emotional: default_blend_emotional(),
            directive: default_blend_directive(),
            similarity: default_blend_similarity(),
            identity: default_blend_identity(),
            recency_horizon_minutes: default_recency_horizon_minutes(),
            emotional_keywords: default_emotional_keywords(),
            directive_keywords: default_directive_keywords(),
            identity_tags: default_identity_tags(),
        }
    }
}

impl BlendWeights {
    pub fn total(&self) -> f64 {
        self.recency + self.emotional + self.directive + self.similarity + self.identity
    }

    fn values(&self) -> [(&'static str, f64); 5] {
        [
            ("recency", self.recency),
            ("emotional", self.emotional),
            ("directive", self.directive),
            ("similarity", self.similarity),
            ("identity", self.identity),
        ]
    }
}

// ── Similarity ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityBackend {
    #[default]
    None,
    /// Token-set Jaccard similarity, computed locally
    Lexical,
    /// Cosine similarity of embeddings from an OpenAI-compatible endpoint
    Embedding,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SimilarityConfig {
    #[serde(default)]
    pub provider: SimilarityBackend,

    #[serde(default = "default_similarity_api_url")]
    pub api_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Per-call bound on the provider; on elapse the similarity is 0
    #[serde(default = "default_similarity_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_similarity_api_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}
fn default_similarity_timeout_ms() -> u64 {
    1500
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            provider: SimilarityBackend::default(),
            api_url: default_similarity_api_url(),
            api_key: None,
            model: default_embedding_model(),
            timeout_ms: default_similarity_timeout_ms(),
        }
    }
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for SimilarityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimilarityConfig")
            .field("provider", &self.provider)
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

// ── Storage ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root for all data; defaults to `~/.hearth`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// One-time historical import (JSONL of memory records)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imported_archive: Option<PathBuf>,

    /// Use this persona text verbatim instead of loading persona files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona_override: Option<String>,

    /// Additional persona files (absolute paths)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_persona_files: Vec<PathBuf>,
}

impl StorageConfig {
    pub fn root(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(AppConfig::config_dir)
    }

    /// `{root}/memory/{owner}.memory.jsonl`
    pub fn memory_dir(&self) -> PathBuf {
        self.root().join("memory")
    }

    /// `{root}/history/{owner}.chat.jsonl`
    pub fn transcript_dir(&self) -> PathBuf {
        self.root().join("history")
    }

    /// `{root}/timeline/*.json`
    pub fn timeline_dir(&self) -> PathBuf {
        self.root().join("timeline")
    }

    pub fn persona_dir(&self) -> PathBuf {
        self.root().join("persona")
    }

    pub fn persona_paths(&self) -> PersonaPaths {
        PersonaPaths {
            dir: Some(self.persona_dir()),
            extra_files: self.extra_persona_files.clone(),
            system_prompt_override: self.persona_override.clone(),
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from the default path (`~/.hearth/config.toml`).
    ///
    /// Environment overrides:
    /// - `HEARTH_HOME`: data root (also where config.toml is looked up)
    /// - `HEARTH_API_KEY`, then `OPENAI_API_KEY`: similarity provider key
    /// - `HEARTH_SCORING_STRATEGY`: `heuristic` or `blended`
    pub fn load() -> Result<Self, ConfigError> {
        let config_dir = Self::config_dir();
        let mut config = Self::load_from(&config_dir.join("config.toml"))?;

        if config.storage.data_dir.is_none() {
            config.storage.data_dir = Some(config_dir);
        }

        if config.similarity.api_key.is_none() {
            config.similarity.api_key = std::env::var("HEARTH_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(strategy) = std::env::var("HEARTH_SCORING_STRATEGY") {
            config.scoring.strategy = strategy.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        std::env::var("HEARTH_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs_home().join(".hearth"))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.context.budget_chars == 0 {
            return Err(ConfigError::ValidationError(
                "context.budget_chars must be > 0".into(),
            ));
        }

        if !self.scoring.imported_source_boost.is_finite() || self.scoring.imported_source_boost < 0.0 {
            return Err(ConfigError::ValidationError(
                "scoring.imported_source_boost must be a non-negative number".into(),
            ));
        }

        for (name, value) in self.scoring.heuristic.values() {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "scoring.heuristic.{name} must be a non-negative number"
                )));
            }
        }

        let h = &self.scoring.heuristic;
        if !(h.recency_day >= h.recency_week
            && h.recency_week >= h.recency_month
            && h.recency_month >= h.recency_older)
        {
            return Err(ConfigError::ValidationError(
                "scoring.heuristic recency tiers must not increase with age \
                 (recency_day >= recency_week >= recency_month >= recency_older)"
                    .into(),
            ));
        }

        for (name, value) in self.scoring.blended.values() {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "scoring.blended.{name} must be a non-negative number"
                )));
            }
        }

        if self.scoring.blended.total() <= 0.0 {
            return Err(ConfigError::ValidationError(
                "scoring.blended weights must sum to > 0".into(),
            ));
        }

        if self.scoring.blended.recency_horizon_minutes <= 0.0 {
            return Err(ConfigError::ValidationError(
                "scoring.blended.recency_horizon_minutes must be > 0".into(),
            ));
        }

        if self.similarity.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "similarity.timeout_ms must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
