//! Imported archive: a one-time historical import of memory records.
//!
//! The archive is a JSONL file of records extracted from an earlier
//! conversation history. It is read-only and shared by all owners.

use hearth_core::memory::MemoryRecord;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::jsonl;

pub struct ImportedArchive {
    path: PathBuf,
    marker: String,
}

impl ImportedArchive {
    /// `marker` becomes the `source` of records that carry none.
    pub fn new(path: impl Into<PathBuf>, marker: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            marker: marker.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Up to `limit` records, most important first. Never fails: a missing
    /// or unreadable archive yields an empty sequence.
    pub async fn load(&self, limit: usize) -> Vec<MemoryRecord> {
        if limit == 0 {
            return Vec::new();
        }

        let mut records: Vec<MemoryRecord> = match jsonl::read_lines(&self.path).await {
            Ok(records) => records,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Imported archive unavailable");
                return Vec::new();
            }
        };

        records.retain(|r| !r.summary.trim().is_empty());
        for record in &mut records {
            if record.source.is_empty() {
                record.source = self.marker.clone();
            }
        }

        records.sort_by(|a, b| b.importance.total_cmp(&a.importance));
        records.truncate(limit);

        debug!(path = %self.path.display(), count = records.len(), "Imported archive loaded");
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::memory::MemoryKind;

    fn write_archive(dir: &Path) -> PathBuf {
        let path = dir.join("archive.memory.jsonl");
        std::fs::write(
            &path,
            concat!(
                r#"{"summary":"low","importance":0.1}"#,
                "\n",
                r#"{"summary":"high","importance":0.9,"type":"episode","source":"old_room"}"#,
                "\n",
                r#"{"importance":1.0}"#,
                "\n",
                r#"{"summary":"   ","importance":1.0}"#,
                "\n",
                r#"{"summary":"mid","importance":0.5}"#,
                "\n",
            ),
        )
        .unwrap();
        path
    }

    #[tokio::test]
    async fn sorted_by_importance_and_limited() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = ImportedArchive::new(write_archive(tmp.path()), "imported");

        let records = archive.load(2).await;
        let order: Vec<_> = records.iter().map(|r| r.summary.as_str()).collect();
        assert_eq!(order, vec!["high", "mid"]);
    }

    #[tokio::test]
    async fn defaults_kind_and_source() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = ImportedArchive::new(write_archive(tmp.path()), "imported");

        let records = archive.load(10).await;
        assert_eq!(records.len(), 3);
        let high = &records[0];
        assert_eq!(high.kind, MemoryKind::Episode);
        assert_eq!(high.source, "old_room");
        let low = records.iter().find(|r| r.summary == "low").unwrap();
        assert_eq!(low.kind, MemoryKind::Observation);
        assert_eq!(low.source, "imported");
        assert!(low.is_archival("imported"));
    }

    #[tokio::test]
    async fn missing_archive_is_empty() {
        let archive = ImportedArchive::new("/nonexistent/archive.jsonl", "imported");
        assert!(archive.load(5).await.is_empty());
    }
}
