//! Tag extraction capability interface and HTTP client.
//!
//! The NLP model ranks the nominal heads of the text by frequency; this
//! module normalizes whatever the service returns so the pipeline's tag
//! contract (at most 10 tags, ordered, no duplicates) holds at the
//! boundary.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::errors::CapabilityError;
use lyrics_enricher_shared::MAX_TAGS;

/// Default request timeout for tagging calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Abstract interface for the tag-extraction capability.
#[async_trait]
pub trait TagExtractor: Send + Sync {
    /// Extract up to [`MAX_TAGS`] representative tags from `text`,
    /// most frequent first, with no duplicates.
    async fn extract_tags(&self, text: &str) -> Result<Vec<String>, CapabilityError>;
}

/// Deduplicate (preserving first occurrence order) and cap a tag list.
///
/// Applied to every service response so a misbehaving backend cannot
/// violate the tag contract downstream.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter()
        .filter(|tag| !tag.is_empty() && seen.insert(tag.clone()))
        .take(MAX_TAGS)
        .collect()
}

#[derive(Serialize)]
struct TagRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct TagResponse {
    tags: Vec<String>,
}

/// Tag-extraction client for an NLP HTTP service.
///
/// Expects a `POST {base_url}/tags` endpoint accepting `{"text": ...}`
/// and returning `{"tags": [...]}` ranked most frequent first.
pub struct HttpTagExtractor {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpTagExtractor {
    /// Create a new tagging client for the given service base URL.
    pub fn new(base_url: &str) -> Result<Self, CapabilityError> {
        let base = Url::parse(base_url).map_err(|e| CapabilityError::request(e.to_string()))?;
        let endpoint = base
            .join("tags")
            .map_err(|e| CapabilityError::request(e.to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(CapabilityError::from)?;

        info!(endpoint = %endpoint, "Created tag extraction client");

        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl TagExtractor for HttpTagExtractor {
    async fn extract_tags(&self, text: &str) -> Result<Vec<String>, CapabilityError> {
        let request = TagRequest { text };

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
                "tagging service returned {}: {}",
                status, body
            )));
        }

        let parsed: TagResponse = response.json().await?;
        let tags = normalize_tags(parsed.tags);

        debug!(tag_count = tags.len(), "Extracted tags");

        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_caps_at_max_tags() {
        let tags: Vec<String> = (0..20).map(|i| format!("tag{}", i)).collect();
        let normalized = normalize_tags(tags);
        assert_eq!(normalized.len(), MAX_TAGS);
        assert_eq!(normalized[0], "tag0");
        assert_eq!(normalized[9], "tag9");
    }

    #[test]
    fn test_normalize_dedupes_preserving_order() {
        let tags = vec![
            "love".to_string(),
            "baby".to_string(),
            "love".to_string(),
            "heart".to_string(),
            "baby".to_string(),
        ];
        let normalized = normalize_tags(tags);
        assert_eq!(normalized, vec!["love", "baby", "heart"]);
    }

    #[test]
    fn test_normalize_drops_empty_tags() {
        let tags = vec!["".to_string(), "love".to_string(), "".to_string()];
        let normalized = normalize_tags(tags);
        assert_eq!(normalized, vec!["love"]);
    }
}
