//! Top-k selection: score, rank, de-duplicate, cut.
//!
//! Ranking is deterministic: score descending, then `created_at`
//! descending (records without a timestamp last), then `id` ascending.

use futures::future::join_all;
use hearth_core::memory::{MemoryRecord, newest_first};
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::scoring::{RelevanceScorer, ScoringContext};

/// A record with its score for this request. Never persisted.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub record: MemoryRecord,
    pub score: f64,
}

/// Additive bonus for records carrying the archival marker.
#[derive(Debug, Clone, Copy)]
pub struct ArchivalBoost<'a> {
    pub marker: &'a str,
    pub boost: f64,
}

/// Score every record concurrently. A failed or non-finite score becomes 0.0.
pub async fn score_all(
    scorer: &dyn RelevanceScorer,
    ctx: &ScoringContext<'_>,
    records: Vec<MemoryRecord>,
    boost: Option<ArchivalBoost<'_>>,
) -> Vec<ScoredCandidate> {
    let scores = join_all(records.iter().map(|r| scorer.score(r, ctx))).await;

    records
        .into_iter()
        .zip(scores)
        .map(|(record, result)| {
            let mut score = match result {
                Ok(s) if s.is_finite() => s.max(0.0),
                Ok(s) => {
                    warn!(id = %record.id, score = s, "Non-finite score, using 0.0");
                    0.0
                }
                Err(e) => {
                    warn!(scorer = scorer.name(), id = %record.id, error = %e, "Scoring failed, using 0.0");
                    0.0
                }
            };
            if let Some(b) = boost {
                if record.is_archival(b.marker) {
                    score += b.boost;
                }
            }
            ScoredCandidate { record, score }
        })
        .collect()
}

/// The full ranking order.
pub fn rank_order(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| newest_first(&a.record, &b.record))
        .then_with(|| a.record.id.cmp(&b.record.id))
}

/// Sort, drop repeated facts (keeping the best-ranked instance), and cut to `k`.
pub fn rank_and_cut(mut candidates: Vec<ScoredCandidate>, k: usize) -> Vec<ScoredCandidate> {
    candidates.sort_by(rank_order);

    let mut seen = HashSet::new();
    let before = candidates.len();
    candidates.retain(|c| seen.insert(c.record.normalized_summary()));
    if candidates.len() < before {
        debug!(removed = before - candidates.len(), "Dropped duplicate memories");
    }

    candidates.truncate(k);
    candidates
}

/// The `k` most relevant records.
pub async fn select_top_k(
    scorer: &dyn RelevanceScorer,
    ctx: &ScoringContext<'_>,
    records: Vec<MemoryRecord>,
    k: usize,
) -> Vec<ScoredCandidate> {
    if k == 0 || records.is_empty() {
        return Vec::new();
    }
    rank_and_cut(score_all(scorer, ctx, records, None).await, k)
}

/// Like `select_top_k`, but archival records get `boost.boost` added
/// before ranking.
pub async fn select_top_k_with_boost(
    scorer: &dyn RelevanceScorer,
    ctx: &ScoringContext<'_>,
    records: Vec<MemoryRecord>,
    k: usize,
    boost: ArchivalBoost<'_>,
) -> Vec<ScoredCandidate> {
    if k == 0 || records.is_empty() {
        return Vec::new();
    }
    rank_and_cut(score_all(scorer, ctx, records, Some(boost)).await, k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::HeuristicScorer;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use hearth_core::error::{Error, SimilarityError};

    struct FailOn(&'static str);

    #[async_trait]
    impl RelevanceScorer for FailOn {
        fn name(&self) -> &str {
            "fail_on"
        }

        async fn score(&self, record: &MemoryRecord, _ctx: &ScoringContext<'_>) -> Result<f64, Error> {
            if record.id == self.0 {
                Err(SimilarityError::NotAvailable("down".into()).into())
            } else {
                Ok(record.importance)
            }
        }
    }

    fn rec(id: &str, summary: &str, importance: f64) -> MemoryRecord {
        MemoryRecord::new(summary).with_id(id).with_importance(importance)
    }

    #[tokio::test]
    async fn size_is_min_of_k_and_input_and_sorted() {
        let now = Utc::now();
        let ctx = ScoringContext::new("", &[], now);
        let scorer = HeuristicScorer::default();
        let records: Vec<_> = (0..5).map(|i| rec(&format!("m{i}"), &format!("fact {i}"), i as f64 / 10.0)).collect();

        for k in [0, 1, 3, 5, 9] {
            let out = select_top_k(&scorer, &ctx, records.clone(), k).await;
            assert_eq!(out.len(), k.min(records.len()));
            assert!(out.windows(2).all(|w| w[0].score >= w[1].score));
        }
    }

    #[tokio::test]
    async fn empty_input_is_empty() {
        let ctx = ScoringContext::new("q", &[], Utc::now());
        assert!(select_top_k(&HeuristicScorer::default(), &ctx, vec![], 3).await.is_empty());
    }

    #[tokio::test]
    async fn ties_break_by_recency_then_id() {
        let now = Utc::now();
        let ctx = ScoringContext::new("", &[], now);
        let scorer = FailOn("");
        let ts = now - Duration::days(2);
        let records = vec![
            rec("b", "beta", 0.5).with_created_at(ts),
            rec("c", "gamma", 0.5),
            rec("a", "alpha", 0.5).with_created_at(ts),
            rec("d", "delta", 0.5).with_created_at(now),
        ];

        let ids: Vec<_> = select_top_k(&scorer, &ctx, records, 4)
            .await
            .into_iter()
            .map(|c| c.record.id)
            .collect();
        assert_eq!(ids, vec!["d", "a", "b", "c"]);
    }

    #[tokio::test]
    async fn failing_record_scores_zero_without_blanking_others() {
        let ctx = ScoringContext::new("", &[], Utc::now());
        let records = vec![rec("bad", "broken", 0.9), rec("good", "fine", 0.4)];
        let out = select_top_k(&FailOn("bad"), &ctx, records, 2).await;
        assert_eq!(out[0].record.id, "good");
        assert_eq!(out[1].score, 0.0);
    }

    #[tokio::test]
    async fn duplicates_keep_higher_score() {
        let ctx = ScoringContext::new("", &[], Utc::now());
        let records = vec![
            rec("low", "Likes  green tea", 0.2),
            rec("high", "likes green tea", 0.8),
            rec("other", "plays piano", 0.1),
        ];
        let out = select_top_k(&FailOn(""), &ctx, records, 5).await;
        let ids: Vec<_> = out.iter().map(|c| c.record.id.as_str()).collect();
        assert_eq!(ids, vec!["high", "other"]);
    }

    #[tokio::test]
    async fn boost_lifts_archival_over_equal_ordinary() {
        let now = Utc::now();
        let ctx = ScoringContext::new("", &[], now);
        let ts = now - Duration::days(3);
        let records = vec![
            rec("a", "ordinary fact", 0.5).with_created_at(ts),
            rec("z", "imported fact", 0.5).with_created_at(ts).with_source("imported"),
        ];
        let out = select_top_k_with_boost(
            &HeuristicScorer::default(),
            &ctx,
            records,
            2,
            ArchivalBoost { marker: "imported", boost: 0.3 },
        )
        .await;
        assert_eq!(out[0].record.id, "z");
        assert!((out[0].score - out[1].score - 0.3).abs() < 1e-9);
    }
}
