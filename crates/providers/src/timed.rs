//! Per-call timeout around a similarity provider.
//!
//! A call that does not finish within the bound is abandoned and reported
//! as `SimilarityError::Timeout`; the scorer turns that into "no signal".

use async_trait::async_trait;
use hearth_core::error::SimilarityError;
use hearth_core::similarity::SimilarityProvider;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

pub struct TimedSimilarity {
    inner: Arc<dyn SimilarityProvider>,
    timeout: Duration,
}

impl TimedSimilarity {
    pub fn new(inner: Arc<dyn SimilarityProvider>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl SimilarityProvider for TimedSimilarity {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn similarity(&self, a: &str, b: &str) -> Result<f64, SimilarityError> {
        match tokio::time::timeout(self.timeout, self.inner.similarity(a, b)).await {
            Ok(result) => result,
            Err(_) => {
                let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
                warn!(
                    provider = %self.inner.name(),
                    timeout_ms,
                    "Similarity provider timed out"
                );
                Err(SimilarityError::Timeout {
                    provider: self.inner.name().to_string(),
                    timeout_ms,
                })
            }
        }
    }
}
