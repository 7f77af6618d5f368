//! Dialogue turns and the DialogueLog trait.
//!
//! The raw transcript is an ordered, append-only sequence of turns owned
//! by the conversation. Appends for one owner are serialized; reads may
//! race with an append and miss it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MemoryError;

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// The end user
    User,
    /// The assistant
    Assistant,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for TurnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TurnRole {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(MemoryError::Validation(format!("unknown turn role: {other}"))),
        }
    }
}

/// A single turn of the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueTurn {
    pub role: TurnRole,
    pub content: String,
    #[serde(alias = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl DialogueTurn {
    /// Create a user turn stamped now.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// Create an assistant turn stamped now.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// The durable, append-only transcript keyed by owner.
#[async_trait]
pub trait DialogueLog: Send + Sync {
    fn name(&self) -> &str;

    /// Append one turn. Blank content is `MemoryError::Validation`.
    async fn append(&self, owner_id: &str, turn: DialogueTurn) -> Result<(), MemoryError>;

    /// The last `limit` turns in chronological order. Never fails.
    async fn load_recent(&self, owner_id: &str, limit: usize) -> Vec<DialogueTurn>;
}
