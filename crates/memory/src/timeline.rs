//! Timeline events read from a directory of JSON files.
//!
//! Each `*.json` file under the directory holds one `TimelineEvent`.

use async_trait::async_trait;
use hearth_core::error::MemoryError;
use hearth_core::timeline::{TimelineEvent, TimelineProvider};
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, warn};

pub struct DirectoryTimeline {
    dir: PathBuf,
}

impl DirectoryTimeline {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl TimelineProvider for DirectoryTimeline {
    fn name(&self) -> &str {
        "directory"
    }

    async fn events(&self) -> Result<Vec<TimelineEvent>, MemoryError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(MemoryError::NotAvailable(format!(
                    "failed to read timeline directory {}: {e}",
                    self.dir.display()
                )));
            }
        };

        let mut paths = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut events = Vec::with_capacity(paths.len());
        for path in paths {
            let parsed = match tokio::fs::read_to_string(&path).await {
                Ok(content) => serde_json::from_str::<TimelineEvent>(&content).map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };
            match parsed {
                Ok(event) => events.push(event),
                Err(e) => warn!(file = %path.display(), error = %e, "Skipping malformed timeline file"),
            }
        }

        events.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.title.cmp(&b.title)));
        debug!(dir = %self.dir.display(), count = events.len(), "Timeline loaded");
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn loads_json_files_sorted_by_date() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        std::fs::write(dir.join("b.json"), r#"{"date":"2025-11-28","title":"Room burned","tags":["archive"]}"#).unwrap();
        std::fs::write(dir.join("a.json"), r#"{"date":"2024-02-01","title":"Studio founded","summary":"first lease"}"#).unwrap();
        std::fs::write(dir.join("broken.json"), "{not json").unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let events = DirectoryTimeline::new(dir).events().await.unwrap();
        let titles: Vec<_> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Studio founded", "Room burned"]);
    }

    #[tokio::test]
    async fn missing_directory_is_empty() {
        let events = DirectoryTimeline::new("/nonexistent/timeline").events().await.unwrap();
        assert!(events.is_empty());
    }
}
