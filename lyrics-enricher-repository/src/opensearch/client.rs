//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `VectorIndexClient`
//! using the OpenSearch Rust client with the k-NN plugin.

use async_trait::async_trait;
use opensearch::{
    cluster::ClusterHealthParts,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts},
    IndexParts, OpenSearch, SearchParts,
};
use serde_json::Value;
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::errors::SearchError;
use crate::interfaces::VectorIndexClient;
use crate::opensearch::index_config;
use crate::opensearch::queries::build_knn_search;
use lyrics_enricher_shared::{EnrichedLyrics, ScoredMatch, VectorQuery};

/// Maximum number of characters kept in a lyrics excerpt.
const EXCERPT_LEN: usize = 50;

/// OpenSearch-backed vector index client.
///
/// Serves approximate nearest-neighbor queries over the language-specific
/// `knn_vector` fields and idempotent upserts keyed by document id.
pub struct OpenSearchClient {
    client: OpenSearch,
    index: String,
}

impl OpenSearchClient {
    /// Create a new client connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    pub fn new(url: &str) -> Result<Self, SearchError> {
        Self::with_index(url, index_config::INDEX_NAME)
    }

    /// Create a new client against a custom index name.
    pub fn with_index(url: &str, index: &str) -> Result<Self, SearchError> {
        let parsed_url = Url::parse(url).map_err(|e| SearchError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(url = %url, index = %index, "Created OpenSearch client");

        Ok(Self {
            client,
            index: index.to_string(),
        })
    }

    /// Convert a search hit into a `ScoredMatch`, truncating the lyrics
    /// excerpt to at most [`EXCERPT_LEN`] characters.
    fn parse_hit(hit: &Value) -> Result<ScoredMatch, SearchError> {
        let source = hit
            .get("_source")
            .ok_or_else(|| SearchError::parse("hit missing _source"))?;

        let score = hit
            .get("_score")
            .and_then(Value::as_f64)
            .ok_or_else(|| SearchError::parse("hit missing _score"))?;

        let tags = source["tags"]
            .as_array()
            .map(|values| {
                values
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let lyrics = source["lyrics"].as_str().unwrap_or_default();

        Ok(ScoredMatch {
            artist: source["artist"].as_str().map(str::to_string),
            title: source["title"].as_str().map(str::to_string),
            year: source["year"].as_i64(),
            genre: source["genre"].as_str().map(str::to_string),
            tags,
            lyrics: Self::excerpt(lyrics),
            score,
        })
    }

    /// Take the first [`EXCERPT_LEN`] characters, respecting char
    /// boundaries.
    fn excerpt(lyrics: &str) -> String {
        lyrics.chars().take(EXCERPT_LEN).collect()
    }
}

#[async_trait]
impl VectorIndexClient for OpenSearchClient {
    #[instrument(skip(self, query), fields(language = %query.language, limit = query.limit))]
    async fn search(&self, query: &VectorQuery) -> Result<Vec<ScoredMatch>, SearchError> {
        let body = build_knn_search(query);

        let response = self
            .client
            .search(SearchParts::Index(&[self.index.as_str()]))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchError::query(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Search request failed");
            return Err(SearchError::query(format!(
                "Search failed with status {}: {}",
                status, error_body
            )));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        let hits = json["hits"]["hits"].as_array().cloned().unwrap_or_default();

        let mut matches = Vec::with_capacity(hits.len());
        for hit in &hits {
            matches.push(Self::parse_hit(hit)?);
        }

        debug!(match_count = matches.len(), "Search completed");
        Ok(matches)
    }

    async fn upsert_document(&self, document: &EnrichedLyrics) -> Result<(), SearchError> {
        let body = serde_json::to_value(document)
            .map_err(|e| SearchError::serialization(e.to_string()))?;

        let response = self
            .client
            .index(IndexParts::IndexId(&self.index, &document.document_id))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchError::index(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Index request failed");
            return Err(SearchError::index(format!(
                "Index failed with status {}: {}",
                status, error_body
            )));
        }

        debug!(document_id = %document.document_id, "Document upserted");
        Ok(())
    }

    async fn ensure_index_exists(&self) -> Result<(), SearchError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[self.index.as_str()]))
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        if response.status_code().is_success() {
            debug!(index = %self.index, "Index already exists");
            return Ok(());
        }

        info!(index = %self.index, "Creating index with k-NN mappings");

        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(&self.index))
            .body(index_config::get_index_settings())
            .send()
            .await
            .map_err(|e| SearchError::index_creation(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(SearchError::index_creation(format!(
                "Index creation failed with status {}: {}",
                status, error_body
            )));
        }

        Ok(())
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let json: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        let status = json["status"].as_str().unwrap_or("red");
        Ok(status == "green" || status == "yellow")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_hit() {
        let hit = json!({
            "_source": {
                "artist": "The Example Band",
                "title": "Love Song",
                "year": 1985,
                "genre": "pop",
                "tags": ["love", "baby"],
                "lyrics": "I love you baby"
            },
            "_score": 0.92
        });

        let result = OpenSearchClient::parse_hit(&hit).unwrap();

        assert_eq!(result.artist, Some("The Example Band".to_string()));
        assert_eq!(result.title, Some("Love Song".to_string()));
        assert_eq!(result.year, Some(1985));
        assert_eq!(result.tags, vec!["love", "baby"]);
        assert_eq!(result.lyrics, "I love you baby");
        assert!((result.score - 0.92).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_hit_minimal() {
        let hit = json!({
            "_source": {
                "lyrics": "la la la"
            },
            "_score": 0.1
        });

        let result = OpenSearchClient::parse_hit(&hit).unwrap();

        assert!(result.artist.is_none());
        assert!(result.year.is_none());
        assert!(result.tags.is_empty());
    }

    #[test]
    fn test_parse_hit_missing_score_is_error() {
        let hit = json!({
            "_source": { "lyrics": "x" }
        });

        assert!(OpenSearchClient::parse_hit(&hit).is_err());
    }

    #[test]
    fn test_excerpt_truncates_to_fifty_chars() {
        let long = "a".repeat(120);
        let excerpt = OpenSearchClient::excerpt(&long);
        assert_eq!(excerpt.chars().count(), 50);
    }

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        let accented = "canción ".repeat(20);
        let excerpt = OpenSearchClient::excerpt(&accented);
        assert_eq!(excerpt.chars().count(), 50);
    }

    #[test]
    fn test_excerpt_keeps_short_lyrics_whole() {
        assert_eq!(OpenSearchClient::excerpt("short"), "short");
    }
}
