//! Embedding capability interface and HTTP client.
//!
//! The embedding model is external; this module only knows how to call it
//! and how to validate that the returned vector has the dimensionality the
//! language's model is contracted to produce.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::errors::CapabilityError;
use lyrics_enricher_shared::Language;

/// Default request timeout for embedding calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Abstract interface for the sentence-embedding capability.
///
/// Implementations must be `Send + Sync` so enrichment tasks can share
/// them across the worker pool.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed `text` with the model selected by `language`.
    ///
    /// The returned vector has exactly `language.embedding_dim()` elements.
    async fn embed(&self, text: &str, language: Language) -> Result<Vec<f32>, CapabilityError>;
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a str,
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

/// Embedding client for a model-inference HTTP service.
///
/// Expects a `POST {base_url}/embed` endpoint accepting
/// `{"inputs": ..., "model": ...}` and returning `{"embedding": [...]}`.
pub struct HttpEmbeddingProvider {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpEmbeddingProvider {
    /// Create a new embedding client for the given service base URL.
    pub fn new(base_url: &str) -> Result<Self, CapabilityError> {
        let base = Url::parse(base_url).map_err(|e| CapabilityError::request(e.to_string()))?;
        let endpoint = base
            .join("embed")
            .map_err(|e| CapabilityError::request(e.to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(CapabilityError::from)?;

        info!(endpoint = %endpoint, "Created embedding client");

        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, text: &str, language: Language) -> Result<Vec<f32>, CapabilityError> {
        let request = EmbedRequest {
            inputs: text,
            model: language.model_id(),
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CapabilityError::request(format!(
                "embedding service returned {}: {}",
                status, body
            )));
        }

        let parsed: EmbedResponse = response.json().await?;

        let expected = language.embedding_dim();
        if parsed.embedding.len() != expected {
            return Err(CapabilityError::invalid_response(format!(
                "expected a {}-dimensional vector for {}, got {}",
                expected,
                language,
                parsed.embedding.len()
            )));
        }

        debug!(
            language = %language,
            dimensions = parsed.embedding.len(),
            "Embedded text"
        );

        Ok(parsed.embedding)
    }
}
