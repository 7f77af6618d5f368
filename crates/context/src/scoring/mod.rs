//! Relevance scoring strategies.
//!
//! Every strategy maps `(record, query, recent turns, now)` to a
//! non-negative score. Strategies are selected and parameterized by
//! `ScoringConfig`; weights are data, not code.
//!
//! | Strategy | Signals | External calls |
//! |----------|---------|----------------|
//! | `heuristic` | importance, recency tier, keyword overlap | none |
//! | `blended` | linear recency, emotional/directive keywords, similarity, identity tags | optional similarity provider |

pub mod blended;
pub mod heuristic;

pub use blended::BlendedScorer;
pub use heuristic::HeuristicScorer;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hearth_config::{ScoringConfig, StrategyKind};
use hearth_core::dialogue::DialogueTurn;
use hearth_core::error::Error;
use hearth_core::memory::MemoryRecord;
use hearth_core::similarity::SimilarityProvider;
use std::sync::Arc;

/// Everything a strategy may look at besides the record itself.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub query: &'a str,
    pub recent_turns: &'a [DialogueTurn],
    /// Fixed per request so every record is aged against the same instant
    pub now: DateTime<Utc>,
}

impl<'a> ScoringContext<'a> {
    pub fn new(query: &'a str, recent_turns: &'a [DialogueTurn], now: DateTime<Utc>) -> Self {
        Self {
            query,
            recent_turns,
            now,
        }
    }
}

#[async_trait]
pub trait RelevanceScorer: Send + Sync {
    /// Strategy name for logs ("heuristic", "blended").
    fn name(&self) -> &str;

    /// Score one record. An error means "no score"; the selector turns it
    /// into 0.0 for this record only.
    async fn score(&self, record: &MemoryRecord, ctx: &ScoringContext<'_>) -> Result<f64, Error>;
}

/// Build the configured strategy.
///
/// The similarity provider is only consulted by the blended strategy.
pub fn build_scorer(
    config: &ScoringConfig,
    similarity: Option<Arc<dyn SimilarityProvider>>,
) -> Arc<dyn RelevanceScorer> {
    match config.strategy {
        StrategyKind::Heuristic => Arc::new(HeuristicScorer::new(config.heuristic.clone())),
        StrategyKind::Blended => Arc::new(BlendedScorer::new(config.blended.clone(), similarity)),
    }
}
