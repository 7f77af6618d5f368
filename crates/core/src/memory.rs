//! Memory records and the MemoryLog trait: durable per-owner facts.
//!
//! A memory record is a discrete fact or observation about the user
//! (a preference, a project, a relationship, an imported episode).
//! Records are immutable once written. The log is append-only: this crate
//! never updates or deletes a record.
//!
//! Reads degrade instead of failing: memory retrieval enriches a chat
//! reply but is never required for one, so an unreachable store yields
//! an empty sequence and a warning.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::warn;
use uuid::Uuid;

use crate::error::MemoryError;

/// What sort of fact a record holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryKind {
    Profile,
    Preference,
    Project,
    Relationship,
    #[default]
    Observation,
    Episode,
}

impl MemoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Preference => "preference",
            Self::Project => "project",
            Self::Relationship => "relationship",
            Self::Observation => "observation",
            Self::Episode => "episode",
        }
    }
}

impl std::fmt::Display for MemoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MemoryKind {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "profile" => Ok(Self::Profile),
            "preference" => Ok(Self::Preference),
            "project" => Ok(Self::Project),
            "relationship" => Ok(Self::Relationship),
            "observation" => Ok(Self::Observation),
            "episode" => Ok(Self::Episode),
            other => Err(MemoryError::Validation(format!("unknown memory kind: {other}"))),
        }
    }
}

/// A reference to an attached image, audio clip, or video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRef {
    /// Media type label ("image", "audio", "video", ...)
    pub kind: String,

    /// Where the media lives
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// A single memory record.
///
/// Defaulting rules (applied once, at deserialization):
/// - `importance` absent => 0.0
/// - `kind` absent => `observation`
/// - `tags`, `source`, `raw`, `media_refs` absent => empty
/// - `id` absent => empty (assigned on append)
/// - `created_at` absent => `None` (assigned on append; imported records may lack it)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Unique per owner
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub owner_id: String,

    #[serde(default, rename = "type", alias = "kind")]
    pub kind: MemoryKind,

    /// Weight in [0, 1]
    #[serde(default)]
    pub importance: f64,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    pub summary: String,

    /// Where the record came from (channel name, import marker, ...)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Verbatim text the summary was distilled from
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub raw: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media_refs: Vec<MediaRef>,
}

impl MemoryRecord {
    /// Create a record with just a summary; everything else defaulted.
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            owner_id: String::new(),
            kind: MemoryKind::default(),
            importance: 0.0,
            tags: Vec::new(),
            summary: summary.into(),
            source: String::new(),
            created_at: None,
            raw: String::new(),
            media_refs: Vec::new(),
        }
    }

    pub fn with_kind(mut self, kind: MemoryKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_importance(mut self, importance: f64) -> Self {
        self.importance = importance;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Check the write-time invariants. Does not touch `id` or `created_at`.
    pub fn validate(&self) -> Result<(), MemoryError> {
        if self.summary.trim().is_empty() {
            return Err(MemoryError::Validation("summary must not be empty".into()));
        }
        if !(0.0..=1.0).contains(&self.importance) {
            return Err(MemoryError::Validation(format!(
                "importance must be within [0, 1], got {}",
                self.importance
            )));
        }
        Ok(())
    }

    /// Validate and fill in the fields the log owns: owner, id, timestamp.
    pub fn prepare_for_append(mut self, owner_id: &str) -> Result<Self, MemoryError> {
        self.validate()?;
        self.owner_id = owner_id.to_string();
        if self.id.is_empty() {
            self.id = Uuid::new_v4().to_string();
        }
        if self.created_at.is_none() {
            self.created_at = Some(Utc::now());
        }
        Ok(self)
    }

    /// Whether this record belongs to the imported/archival lane.
    ///
    /// Matches the marker against `source` or any tag, case-insensitively.
    pub fn is_archival(&self, marker: &str) -> bool {
        let marker = marker.trim().to_lowercase();
        if marker.is_empty() {
            return false;
        }
        self.source.to_lowercase() == marker
            || self.tags.iter().any(|t| t.to_lowercase() == marker)
    }

    /// Summary folded for duplicate detection: lowercase, trimmed,
    /// internal whitespace collapsed to single spaces.
    pub fn normalized_summary(&self) -> String {
        self.summary
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

/// Newest first; records without a timestamp sort last.
pub fn newest_first(a: &MemoryRecord, b: &MemoryRecord) -> Ordering {
    match (a.created_at, b.created_at) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// The durable, append-only memory store keyed by owner.
///
/// Implementations: JSONL file per owner, in-memory (for testing), none (no-op).
#[async_trait]
pub trait MemoryLog: Send + Sync {
    /// The backend name (e.g., "file", "in_memory", "none").
    fn name(&self) -> &str;

    /// Append a record for an owner, returning it with `id`/`created_at` filled.
    ///
    /// Fails with `MemoryError::Validation` on an empty summary, an
    /// out-of-range importance, or a duplicate id. Nothing is written on failure.
    async fn append(&self, owner_id: &str, record: MemoryRecord) -> Result<MemoryRecord, MemoryError>;

    /// Read every record for an owner in storage order.
    ///
    /// Corrupt entries are skipped by the implementation. An unreachable
    /// store is `MemoryError::NotAvailable`.
    async fn scan(&self, owner_id: &str) -> Result<Vec<MemoryRecord>, MemoryError>;

    /// Up to `limit` most recently created records, newest first.
    /// Never fails: an unavailable store yields an empty sequence.
    async fn load_recent(&self, owner_id: &str, limit: usize) -> Vec<MemoryRecord> {
        let mut records = self.load_all(owner_id).await;
        records.truncate(limit);
        records
    }

    /// Every record for an owner, newest first. Never fails.
    async fn load_all(&self, owner_id: &str) -> Vec<MemoryRecord> {
        match self.scan(owner_id).await {
            Ok(mut records) => {
                records.sort_by(newest_first);
                records
            }
            Err(e) => {
                warn!(backend = self.name(), owner = %owner_id, error = %e, "Memory log unavailable, continuing without memories");
                Vec::new()
            }
        }
    }
}
