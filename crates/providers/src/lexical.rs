//! Lexical similarity: Jaccard index of the two texts' token sets.
//!
//! Needs no network and no model; useful as a cheap stand-in for
//! embeddings and in tests.

use async_trait::async_trait;
use hearth_core::error::SimilarityError;
use hearth_core::similarity::SimilarityProvider;
use hearth_core::text::tokenize;

#[derive(Debug, Default, Clone, Copy)]
pub struct LexicalSimilarity;

impl LexicalSimilarity {
    pub fn jaccard(a: &str, b: &str) -> f64 {
        let ta = tokenize(a);
        let tb = tokenize(b);
        if ta.is_empty() || tb.is_empty() {
            return 0.0;
        }
        let shared = ta.intersection(&tb).count();
        let union = ta.union(&tb).count();
        shared as f64 / union as f64
    }
}

#[async_trait]
impl SimilarityProvider for LexicalSimilarity {
    fn name(&self) -> &str {
        "lexical"
    }

    async fn similarity(&self, a: &str, b: &str) -> Result<f64, SimilarityError> {
        Ok(Self::jaccard(a, b))
    }
}
