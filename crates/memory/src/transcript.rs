//! Dialogue transcript stores.
//!
//! Storage location: `{transcript_dir}/{owner}.chat.jsonl`, one turn per
//! line in arrival order.

use async_trait::async_trait;
use hearth_core::dialogue::{DialogueLog, DialogueTurn};
use hearth_core::error::MemoryError;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::warn;

use crate::jsonl;
use crate::locks::OwnerLocks;

const CHAT_SUFFIX: &str = ".chat.jsonl";

fn validate_turn(turn: &DialogueTurn) -> Result<(), MemoryError> {
    if turn.content.trim().is_empty() {
        return Err(MemoryError::Validation("turn content must not be empty".into()));
    }
    Ok(())
}

fn last_n(mut turns: Vec<DialogueTurn>, limit: usize) -> Vec<DialogueTurn> {
    let start = turns.len().saturating_sub(limit);
    turns.split_off(start)
}

pub struct FileDialogueLog {
    dir: PathBuf,
    locks: OwnerLocks,
}

impl FileDialogueLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            locks: OwnerLocks::new(),
        }
    }
}

#[async_trait]
impl DialogueLog for FileDialogueLog {
    fn name(&self) -> &str {
        "file"
    }

    async fn append(&self, owner_id: &str, turn: DialogueTurn) -> Result<(), MemoryError> {
        validate_turn(&turn)?;
        let path = jsonl::owner_file(&self.dir, owner_id, CHAT_SUFFIX)?;

        let lock = self.locks.for_owner(owner_id);
        let _guard = lock.lock().await;
        jsonl::append_line(&path, &turn).await
    }

    async fn load_recent(&self, owner_id: &str, limit: usize) -> Vec<DialogueTurn> {
        if limit == 0 {
            return Vec::new();
        }
        let turns = match jsonl::owner_file(&self.dir, owner_id, CHAT_SUFFIX) {
            Ok(path) => jsonl::read_lines::<DialogueTurn>(&path).await,
            Err(e) => Err(e),
        };
        match turns {
            Ok(turns) => last_n(
                turns.into_iter().filter(|t| !t.content.trim().is_empty()).collect(),
                limit,
            ),
            Err(e) => {
                warn!(owner = %owner_id, error = %e, "Transcript unavailable, continuing without history");
                Vec::new()
            }
        }
    }
}

/// Transcript held in memory. For tests and ephemeral sessions.
#[derive(Default)]
pub struct InMemoryDialogueLog {
    turns: RwLock<HashMap<String, Vec<DialogueTurn>>>,
}

impl InMemoryDialogueLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DialogueLog for InMemoryDialogueLog {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn append(&self, owner_id: &str, turn: DialogueTurn) -> Result<(), MemoryError> {
        validate_turn(&turn)?;
        self.turns
            .write()
            .await
            .entry(owner_id.to_string())
            .or_default()
            .push(turn);
        Ok(())
    }

    async fn load_recent(&self, owner_id: &str, limit: usize) -> Vec<DialogueTurn> {
        let turns = self
            .turns
            .read()
            .await
            .get(owner_id)
            .cloned()
            .unwrap_or_default();
        last_n(turns, limit)
    }
}
