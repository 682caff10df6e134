//! Query service: free text in, ranked matches out.

use std::cmp::Ordering;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use lyrics_enricher_capabilities::EmbeddingProvider;
use lyrics_enricher_repository::VectorIndexClient;
use lyrics_enricher_shared::{Language, ScoredMatch, VectorQuery};

/// Stateless read path over the persisted vector index.
///
/// Embeds the user's request with the language-selected model and runs an
/// approximate nearest-neighbor search against the matching embedding
/// field.
pub struct QueryService {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndexClient>,
}

impl QueryService {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<dyn VectorIndexClient>) -> Self {
        Self { embedder, index }
    }

    /// Search for songs matching `text`.
    ///
    /// Returns at most `limit` matches sorted by descending similarity
    /// score. An empty result set is a normal outcome, not an error.
    pub async fn search(
        &self,
        text: &str,
        language: Language,
        limit: usize,
        num_candidates: usize,
    ) -> Result<Vec<ScoredMatch>> {
        let vector = self
            .embedder
            .embed(text, language)
            .await
            .context("Failed to embed query text")?;

        let query = VectorQuery::new(vector, language)
            .with_limit(limit)
            .with_num_candidates(num_candidates);

        let mut matches = self
            .index
            .search(&query)
            .await
            .context("Vector search failed")?;

        // The backend already ranks hits, but the contract is ours to keep.
        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        matches.truncate(limit);

        debug!(
            language = %language,
            match_count = matches.len(),
            "Query completed"
        );

        Ok(matches)
    }
}
