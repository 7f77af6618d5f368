//! Blended strategy: weighted sum of five signals, each in [0, 1].
//!
//! - recency: `max(0, 1 - age_minutes / recency_horizon_minutes)`
//! - emotional: 0.8 when the record's raw text holds an emotional keyword, else 0.2
//! - directive: 1.0 when the summary holds a directive keyword, else 0.2
//! - similarity: the provider's score for (query, summary); 0 without a provider
//! - identity: 0.9 when any tag is an identity tag, else 0.2

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hearth_config::BlendWeights;
use hearth_core::error::Error;
use hearth_core::memory::MemoryRecord;
use hearth_core::similarity::SimilarityProvider;
use std::sync::Arc;

use super::{RelevanceScorer, ScoringContext};

const EMOTIONAL_HIT: f64 = 0.8;
const DIRECTIVE_HIT: f64 = 1.0;
const IDENTITY_HIT: f64 = 0.9;
const SIGNAL_MISS: f64 = 0.2;

pub struct BlendedScorer {
    weights: BlendWeights,
    similarity: Option<Arc<dyn SimilarityProvider>>,
}

/// The individual signals before weighting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signals {
    pub recency: f64,
    pub emotional: f64,
    pub directive: f64,
    pub similarity: f64,
    pub identity: f64,
}

impl BlendedScorer {
    pub fn new(weights: BlendWeights, similarity: Option<Arc<dyn SimilarityProvider>>) -> Self {
        Self { weights, similarity }
    }

    pub fn recency(&self, created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
        let Some(created_at) = created_at else {
            return 0.0;
        };
        let minutes = ((now - created_at).num_seconds() as f64 / 60.0).max(0.0);
        (1.0 - minutes / self.weights.recency_horizon_minutes).clamp(0.0, 1.0)
    }

    fn contains_any(text: &str, keywords: &[String]) -> bool {
        let text = text.to_lowercase();
        keywords
            .iter()
            .filter(|k| !k.is_empty())
            .any(|k| text.contains(&k.to_lowercase()))
    }

    /// Every signal except similarity, which needs the provider.
    pub fn local_signals(&self, record: &MemoryRecord, now: DateTime<Utc>) -> Signals {
        let w = &self.weights;
        // Records without raw text fall back to the summary
        let emotional_text = if record.raw.trim().is_empty() {
            &record.summary
        } else {
            &record.raw
        };

        Signals {
            recency: self.recency(record.created_at, now),
            emotional: if Self::contains_any(emotional_text, &w.emotional_keywords) {
                EMOTIONAL_HIT
            } else {
                SIGNAL_MISS
            },
            directive: if Self::contains_any(&record.summary, &w.directive_keywords) {
                DIRECTIVE_HIT
            } else {
                SIGNAL_MISS
            },
            similarity: 0.0,
            identity: if record
                .tags
                .iter()
                .any(|t| w.identity_tags.iter().any(|i| i.eq_ignore_ascii_case(t)))
            {
                IDENTITY_HIT
            } else {
                SIGNAL_MISS
            },
        }
    }

    pub fn combine(&self, s: &Signals) -> f64 {
        let w = &self.weights;
        w.recency * s.recency
            + w.emotional * s.emotional
            + w.directive * s.directive
            + w.similarity * s.similarity
            + w.identity * s.identity
    }
}

#[async_trait]
impl RelevanceScorer for BlendedScorer {
    fn name(&self) -> &str {
        "blended"
    }

    async fn score(&self, record: &MemoryRecord, ctx: &ScoringContext<'_>) -> Result<f64, Error> {
        let mut signals = self.local_signals(record, ctx.now);

        if let Some(provider) = &self.similarity {
            if self.weights.similarity > 0.0 && !ctx.query.trim().is_empty() {
                let sim = provider.similarity(ctx.query, &record.summary).await?;
                signals.similarity = if sim.is_finite() { sim.clamp(0.0, 1.0) } else { 0.0 };
            }
        }

        Ok(self.combine(&signals))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use hearth_core::error::SimilarityError;

    struct FixedSimilarity(f64);

    #[async_trait]
    impl SimilarityProvider for FixedSimilarity {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn similarity(&self, _a: &str, _b: &str) -> Result<f64, SimilarityError> {
            Ok(self.0)
        }
    }

    struct DownSimilarity;

    #[async_trait]
    impl SimilarityProvider for DownSimilarity {
        fn name(&self) -> &str {
            "down"
        }

        async fn similarity(&self, _a: &str, _b: &str) -> Result<f64, SimilarityError> {
            Err(SimilarityError::NotAvailable("connection refused".into()))
        }
    }

    #[test]
    fn recency_decays_linearly_over_horizon() {
        let s = BlendedScorer::new(BlendWeights::default(), None);
        let now = Utc::now();
        assert!((s.recency(Some(now), now) - 1.0).abs() < 1e-9);
        assert!((s.recency(Some(now - Duration::minutes(1000)), now) - 0.5).abs() < 1e-9);
        assert_eq!(s.recency(Some(now - Duration::minutes(5000)), now), 0.0);
        assert_eq!(s.recency(None, now), 0.0);
    }

    #[test]
    fn keyword_signals() {
        let s = BlendedScorer::new(BlendWeights::default(), None);
        let now = Utc::now();

        let mut record = MemoryRecord::new("말투는 반말로 정리해").with_tags(["정체성"]);
        record.raw = "그날 울었다".into();
        let signals = s.local_signals(&record, now);
        assert_eq!(signals.emotional, 0.8);
        assert_eq!(signals.directive, 1.0);
        assert_eq!(signals.identity, 0.9);

        let plain = s.local_signals(&MemoryRecord::new("weather talk"), now);
        assert_eq!(plain.emotional, 0.2);
        assert_eq!(plain.directive, 0.2);
        assert_eq!(plain.identity, 0.2);
    }

    #[tokio::test]
    async fn blend_uses_configured_weights() {
        let weights = BlendWeights::default();
        let s = BlendedScorer::new(weights, Some(Arc::new(FixedSimilarity(0.6))));
        let now = Utc::now();
        let record = MemoryRecord::new("weather talk").with_created_at(now);

        let score = s.score(&record, &ScoringContext::new("weather", &[], now)).await.unwrap();
        // 0.4*1.0 + 0.2*0.2 + 0.2*0.2 + 0.15*0.6 + 0.05*0.2
        assert!((score - 0.58).abs() < 1e-9);
    }

    #[tokio::test]
    async fn no_provider_means_zero_similarity() {
        let s = BlendedScorer::new(BlendWeights::default(), None);
        let now = Utc::now();
        let record = MemoryRecord::new("weather talk").with_created_at(now);
        let score = s.score(&record, &ScoringContext::new("weather", &[], now)).await.unwrap();
        assert!((score - 0.49).abs() < 1e-9);
    }

    #[tokio::test]
    async fn provider_failure_surfaces_as_error() {
        let s = BlendedScorer::new(BlendWeights::default(), Some(Arc::new(DownSimilarity)));
        let now = Utc::now();
        let record = MemoryRecord::new("anything");
        assert!(s.score(&record, &ScoringContext::new("query", &[], now)).await.is_err());
    }
}
