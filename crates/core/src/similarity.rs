//! Similarity provider trait: optional semantic comparison of two texts.
//!
//! Implementations may call out over the network. Callers must bound the
//! call with a timeout and treat any error as "no signal".

use async_trait::async_trait;

use crate::error::SimilarityError;

#[async_trait]
pub trait SimilarityProvider: Send + Sync {
    /// The provider name (e.g., "embedding", "lexical").
    fn name(&self) -> &str;

    /// Similarity of `a` and `b` in [0, 1]. Empty input yields 0.0.
    async fn similarity(&self, a: &str, b: &str) -> Result<f64, SimilarityError>;
}
