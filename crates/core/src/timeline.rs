//! Timeline events: static reference records about the user's life.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::MemoryError;

/// A dated event loaded from an external provider. Read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub date: NaiveDate,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl TimelineEvent {
    /// The text the relevance scorer looks at: title, summary, and tags.
    pub fn search_text(&self) -> String {
        let mut text = String::with_capacity(self.title.len() + self.summary.len() + 16);
        text.push_str(&self.title);
        text.push(' ');
        text.push_str(&self.summary);
        for tag in &self.tags {
            text.push(' ');
            text.push_str(tag);
        }
        text
    }
}

/// Source of timeline events.
#[async_trait]
pub trait TimelineProvider: Send + Sync {
    fn name(&self) -> &str;

    /// All known events, sorted by date ascending.
    async fn events(&self) -> Result<Vec<TimelineEvent>, MemoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_text_includes_tags() {
        let ev = TimelineEvent {
            date: NaiveDate::from_ymd_opt(2025, 11, 28).unwrap(),
            title: "Studio opened".into(),
            summary: "First day at the new space".into(),
            tags: vec!["studio".into(), "milestone".into()],
        };
        let text = ev.search_text();
        assert!(text.contains("Studio opened"));
        assert!(text.contains("milestone"));
    }

    #[test]
    fn event_parses_iso_date() {
        let ev: TimelineEvent =
            serde_json::from_str(r#"{"date":"2025-03-01","title":"Moved"}"#).unwrap();
        assert_eq!(ev.date, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert!(ev.summary.is_empty());
    }
}
