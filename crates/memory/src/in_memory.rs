//! In-memory log: useful for testing and ephemeral sessions.

use async_trait::async_trait;
use hearth_core::error::MemoryError;
use hearth_core::memory::{MemoryLog, MemoryRecord};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Records held in a map of owner to Vec, in append order.
/// Useful for testing and sessions where persistence isn't needed.
pub struct InMemoryLog {
    records: Arc<RwLock<HashMap<String, Vec<MemoryRecord>>>>,
}

impl InMemoryLog {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Seed an owner's records as-is, bypassing append validation.
    /// Intended for tests that need exact ids and timestamps.
    pub async fn seed(&self, owner_id: &str, records: Vec<MemoryRecord>) {
        self.records
            .write()
            .await
            .entry(owner_id.to_string())
            .or_default()
            .extend(records);
    }
}

impl Default for InMemoryLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MemoryLog for InMemoryLog {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn append(&self, owner_id: &str, record: MemoryRecord) -> Result<MemoryRecord, MemoryError> {
        let record = record.prepare_for_append(owner_id)?;

        // The write guard doubles as the per-owner append lock.
        let mut records = self.records.write().await;
        let owned = records.entry(owner_id.to_string()).or_default();
        if owned.iter().any(|r| r.id == record.id) {
            return Err(MemoryError::Validation(format!(
                "duplicate memory id for owner {owner_id}: {}",
                record.id
            )));
        }
        owned.push(record.clone());
        Ok(record)
    }

    async fn scan(&self, owner_id: &str) -> Result<Vec<MemoryRecord>, MemoryError> {
        Ok(self
            .records
            .read()
            .await
            .get(owner_id)
            .cloned()
            .unwrap_or_default())
    }
}
