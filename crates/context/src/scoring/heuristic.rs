//! Heuristic strategy: the dependency-free baseline.
//!
//! `score = importance * importance_weight + recency tier + overlap bonus`
//!
//! Recency tiers step down at one day, seven days, and thirty days of age;
//! a record with no timestamp gets no recency bonus. The overlap bonus is
//! `overlap_per_token` per query token shared with the record's summary
//! or tags, capped at `overlap_cap`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hearth_config::HeuristicWeights;
use hearth_core::error::Error;
use hearth_core::memory::MemoryRecord;
use hearth_core::text::{tokenize, tokenize_all};
use std::collections::BTreeSet;

use super::{RelevanceScorer, ScoringContext};

#[derive(Debug, Clone, Default)]
pub struct HeuristicScorer {
    weights: HeuristicWeights,
}

impl HeuristicScorer {
    pub fn new(weights: HeuristicWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &HeuristicWeights {
        &self.weights
    }

    /// Bonus for how recently something happened.
    pub fn recency_bonus(&self, created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
        let Some(created_at) = created_at else {
            return 0.0;
        };
        let age_days = (now - created_at).num_seconds() as f64 / 86_400.0;
        let w = &self.weights;
        if age_days <= 1.0 {
            w.recency_day
        } else if age_days <= 7.0 {
            w.recency_week
        } else if age_days <= 30.0 {
            w.recency_month
        } else {
            w.recency_older
        }
    }

    /// Bonus for tokens shared between the query and a candidate.
    pub fn overlap_bonus(&self, query_tokens: &BTreeSet<String>, candidate: &BTreeSet<String>) -> f64 {
        let shared = query_tokens.intersection(candidate).count();
        (self.weights.overlap_per_token * shared as f64).min(self.weights.overlap_cap)
    }

    /// Synchronous score; the trait method delegates here.
    pub fn score_now(&self, record: &MemoryRecord, query: &str, now: DateTime<Utc>) -> f64 {
        let importance = if record.importance.is_finite() {
            record.importance.max(0.0)
        } else {
            0.0
        };

        let candidate = tokenize_all(
            std::iter::once(record.summary.as_str()).chain(record.tags.iter().map(String::as_str)),
        );

        importance * self.weights.importance_weight
            + self.recency_bonus(record.created_at, now)
            + self.overlap_bonus(&tokenize(query), &candidate)
    }
}

#[async_trait]
impl RelevanceScorer for HeuristicScorer {
    fn name(&self) -> &str {
        "heuristic"
    }

    async fn score(&self, record: &MemoryRecord, ctx: &ScoringContext<'_>) -> Result<f64, Error> {
        Ok(self.score_now(record, ctx.query, ctx.now))
    }
}
