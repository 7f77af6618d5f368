//! Timeline selection: which dated life events to mention for a query.

use chrono::{DateTime, NaiveTime, Utc};
use hearth_core::text::tokenize;
use hearth_core::timeline::TimelineEvent;
use std::cmp::Ordering;

use crate::scoring::HeuristicScorer;

/// Up to `n` events for `query`.
///
/// Events sharing tokens with the query are ranked by overlap bonus plus
/// the recency tier of their date. Only when no event overlaps at all are
/// the `n` most recent events used instead.
pub fn select_timeline(
    query: &str,
    events: &[TimelineEvent],
    n: usize,
    now: DateTime<Utc>,
    scorer: &HeuristicScorer,
) -> Vec<TimelineEvent> {
    if n == 0 || events.is_empty() {
        return Vec::new();
    }

    let query_tokens = tokenize(query);
    let mut overlapping: Vec<(f64, &TimelineEvent)> = events
        .iter()
        .filter_map(|ev| {
            let tokens = tokenize(&ev.search_text());
            if query_tokens.is_disjoint(&tokens) {
                return None;
            }
            let at = ev.date.and_time(NaiveTime::MIN).and_utc();
            let score = scorer.overlap_bonus(&query_tokens, &tokens) + scorer.recency_bonus(Some(at), now);
            Some((score, ev))
        })
        .collect();

    if overlapping.is_empty() {
        let mut recent: Vec<&TimelineEvent> = events.iter().collect();
        recent.sort_by(|a, b| newest_event_first(a, b));
        return recent.into_iter().take(n).cloned().collect();
    }

    overlapping.sort_by(|(sa, a), (sb, b)| sb.total_cmp(sa).then_with(|| newest_event_first(a, b)));
    overlapping.into_iter().take(n).map(|(_, ev)| ev.clone()).collect()
}

fn newest_event_first(a: &TimelineEvent, b: &TimelineEvent) -> Ordering {
    b.date.cmp(&a.date).then_with(|| a.title.cmp(&b.title))
}

/// `- [YYYY-MM-DD] title (tags: a, b): summary`
pub fn render_event(ev: &TimelineEvent) -> String {
    let mut line = format!("- [{}] {}", ev.date.format("%Y-%m-%d"), ev.title);
    if !ev.tags.is_empty() {
        line.push_str(&format!(" (tags: {})", ev.tags.join(", ")));
    }
    if !ev.summary.trim().is_empty() {
        line.push_str(": ");
        line.push_str(ev.summary.trim());
    }
    line
}
