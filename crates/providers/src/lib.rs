//! Similarity provider implementations for Hearth.
//!
//! All providers implement the `hearth_core::SimilarityProvider` trait.
//! `from_config` builds the configured one, already wrapped in its timeout.

pub mod embedding;
pub mod lexical;
pub mod timed;

pub use embedding::{EmbeddingSimilarity, cosine_similarity};
pub use lexical::LexicalSimilarity;
pub use timed::TimedSimilarity;

use hearth_config::{SimilarityBackend, SimilarityConfig};
use hearth_core::similarity::SimilarityProvider;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Build the configured similarity provider, or `None` when similarity is
/// disabled or cannot be set up.
pub fn from_config(config: &SimilarityConfig) -> Option<Arc<dyn SimilarityProvider>> {
    let inner: Arc<dyn SimilarityProvider> = match config.provider {
        SimilarityBackend::None => return None,
        SimilarityBackend::Lexical => Arc::new(LexicalSimilarity),
        SimilarityBackend::Embedding => {
            let Some(api_key) = config.api_key.as_deref().filter(|k| !k.is_empty()) else {
                warn!("Embedding similarity configured without an API key, disabling similarity");
                return None;
            };
            Arc::new(EmbeddingSimilarity::new(&config.api_url, api_key, &config.model))
        }
    };

    info!(provider = inner.name(), timeout_ms = config.timeout_ms, "Similarity provider ready");
    Some(Arc::new(TimedSimilarity::new(
        inner,
        Duration::from_millis(config.timeout_ms),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_backend_builds_nothing() {
        assert!(from_config(&SimilarityConfig::default()).is_none());
    }

    #[test]
    fn embedding_without_key_is_disabled() {
        let config = SimilarityConfig {
            provider: SimilarityBackend::Embedding,
            api_key: None,
            ..Default::default()
        };
        assert!(from_config(&config).is_none());
    }

    #[tokio::test]
    async fn lexical_backend_is_timed_and_named() {
        let config = SimilarityConfig {
            provider: SimilarityBackend::Lexical,
            ..Default::default()
        };
        let provider = from_config(&config).unwrap();
        assert_eq!(provider.name(), "lexical");
        assert_eq!(provider.similarity("tea", "tea").await.unwrap(), 1.0);
    }
}
