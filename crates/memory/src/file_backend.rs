//! File-based memory log: one JSON-lines file per owner.
//!
//! Storage location: `{memory_dir}/{owner}.memory.jsonl`
//!
//! Every append opens the file in append mode and writes exactly one line,
//! so a crash mid-write can at worst leave one corrupted trailing line,
//! which reads skip and the next append terminates. Nothing is cached:
//! every scan reads the file, so records appended by another process are
//! visible on the next read.

use async_trait::async_trait;
use hearth_core::error::MemoryError;
use hearth_core::memory::{MemoryLog, MemoryRecord};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::jsonl;
use crate::locks::OwnerLocks;

const MEMORY_SUFFIX: &str = ".memory.jsonl";

pub struct FileMemoryLog {
    dir: PathBuf,
    locks: OwnerLocks,
}

impl FileMemoryLog {
    /// Create a log rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            locks: OwnerLocks::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn owner_path(&self, owner_id: &str) -> Result<PathBuf, MemoryError> {
        jsonl::owner_file(&self.dir, owner_id, MEMORY_SUFFIX)
    }
}

#[async_trait]
impl MemoryLog for FileMemoryLog {
    fn name(&self) -> &str {
        "file"
    }

    async fn append(&self, owner_id: &str, record: MemoryRecord) -> Result<MemoryRecord, MemoryError> {
        let path = self.owner_path(owner_id)?;
        let record = record.prepare_for_append(owner_id)?;

        let lock = self.locks.for_owner(owner_id);
        let _guard = lock.lock().await;

        let existing: Vec<MemoryRecord> = jsonl::read_lines(&path).await?;
        if existing.iter().any(|r| r.id == record.id) {
            return Err(MemoryError::Validation(format!(
                "duplicate memory id for owner {owner_id}: {}",
                record.id
            )));
        }

        jsonl::append_line(&path, &record).await?;
        debug!(owner = %owner_id, id = %record.id, kind = %record.kind, "Memory appended");
        Ok(record)
    }

    async fn scan(&self, owner_id: &str) -> Result<Vec<MemoryRecord>, MemoryError> {
        let path = self.owner_path(owner_id)?;
        jsonl::read_lines(&path).await
    }
}
