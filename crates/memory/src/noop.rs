//! No-op memory log: disables persistent memory entirely.

use async_trait::async_trait;
use hearth_core::error::MemoryError;
use hearth_core::memory::{MemoryLog, MemoryRecord};

/// A memory log that stores nothing and always reads empty.
pub struct NoopMemory;

#[async_trait]
impl MemoryLog for NoopMemory {
    fn name(&self) -> &str { "none" }

    async fn append(&self, owner_id: &str, record: MemoryRecord) -> Result<MemoryRecord, MemoryError> {
        record.prepare_for_append(owner_id)
    }

    async fn scan(&self, _owner_id: &str) -> Result<Vec<MemoryRecord>, MemoryError> {
        Ok(Vec::new())
    }
}
