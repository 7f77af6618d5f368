//! Embedding similarity: cosine of vectors from an OpenAI-compatible
//! `/embeddings` endpoint.
//!
//! Works with: OpenAI, Ollama, vLLM, and any endpoint exposing the
//! OpenAI embeddings request/response shape.

use async_trait::async_trait;
use hearth_core::error::SimilarityError;
use hearth_core::similarity::SimilarityProvider;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, trace};

/// Embeddings kept before the cache is cleared.
const CACHE_CAPACITY: usize = 512;

pub struct EmbeddingSimilarity {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
    cache: RwLock<HashMap<String, Vec<f32>>>,
}

impl EmbeddingSimilarity {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client: reqwest::Client::new(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Embeddings for `texts`, served from cache where possible.
    async fn embed(&self, texts: [&str; 2]) -> Result<[Vec<f32>; 2], SimilarityError> {
        let cached: [Option<Vec<f32>>; 2] = {
            let cache = self.cache.read().await;
            [cache.get(texts[0]).cloned(), cache.get(texts[1]).cloned()]
        };

        let missing: Vec<String> = texts
            .iter()
            .zip(&cached)
            .filter(|(_, c)| c.is_none())
            .map(|(t, _)| t.to_string())
            .collect();

        let fetched = if missing.is_empty() {
            Vec::new()
        } else {
            self.request(&missing).await?
        };
        let mut fetched = fetched.into_iter();

        let mut out: [Vec<f32>; 2] = [Vec::new(), Vec::new()];
        for (i, slot) in cached.into_iter().enumerate() {
            out[i] = match slot {
                Some(v) => v,
                None => fetched.next().ok_or_else(|| {
                    SimilarityError::InvalidResponse("fewer embeddings than inputs".into())
                })?,
            };
        }

        let mut cache = self.cache.write().await;
        if cache.len() + 2 > CACHE_CAPACITY {
            cache.clear();
        }
        for (text, vector) in texts.iter().zip(&out) {
            cache.insert(text.to_string(), vector.clone());
        }

        Ok(out)
    }

    async fn request(&self, input: &[String]) -> Result<Vec<Vec<f32>>, SimilarityError> {
        let url = format!("{}/embeddings", self.base_url);
        let body = EmbeddingRequest {
            model: &self.model,
            input,
        };

        debug!(model = %self.model, inputs = input.len(), "Requesting embeddings");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SimilarityError::NotAvailable(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SimilarityError::NotAvailable(format!(
                "embeddings endpoint returned {status}: {error_text}"
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| SimilarityError::InvalidResponse(e.to_string()))?;

        trace!(count = parsed.data.len(), "Embeddings received");
        into_vectors(parsed, input.len())
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

fn into_vectors(response: EmbeddingResponse, expected: usize) -> Result<Vec<Vec<f32>>, SimilarityError> {
    if response.data.len() != expected {
        return Err(SimilarityError::InvalidResponse(format!(
            "expected {expected} embeddings, got {}",
            response.data.len()
        )));
    }
    let mut data = response.data;
    data.sort_by_key(|d| d.index);
    Ok(data.into_iter().map(|d| d.embedding).collect())
}

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1]; 0.0 if the lengths differ or either
/// vector is empty or zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    dot / denom
}

#[async_trait]
impl SimilarityProvider for EmbeddingSimilarity {
    fn name(&self) -> &str {
        "embedding"
    }

    async fn similarity(&self, a: &str, b: &str) -> Result<f64, SimilarityError> {
        if a.trim().is_empty() || b.trim().is_empty() {
            return Ok(0.0);
        }
        let [va, vb] = self.embed([a, b]).await?;
        // Opposed directions carry no useful signal for ranking
        Ok(cosine_similarity(&va, &vb).clamp(0.0, 1.0))
    }
}
