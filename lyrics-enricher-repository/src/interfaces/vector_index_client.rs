//! Vector index client trait definition.
//!
//! This module defines the abstract interface for the persisted vector
//! index, allowing for different backend implementations (OpenSearch,
//! mock, etc.).

use async_trait::async_trait;

use crate::errors::SearchError;
use lyrics_enricher_shared::{EnrichedLyrics, ScoredMatch, VectorQuery};

/// Abstract interface for the persisted vector index.
///
/// The enrichment pipeline publishes to a stream that a downstream
/// connector applies to this index as upserts keyed by document id; the
/// query path reads from it directly. Implementations must be
/// `Send + Sync` to allow use across async tasks.
#[async_trait]
pub trait VectorIndexClient: Send + Sync {
    /// Run an approximate nearest-neighbor search against the
    /// language-specific embedding field.
    ///
    /// Returns at most `query.limit` matches, sorted by descending
    /// similarity score, with lyrics excerpts truncated to 50 characters.
    async fn search(&self, query: &VectorQuery) -> Result<Vec<ScoredMatch>, SearchError>;

    /// Upsert an enriched record, keyed by its document id.
    ///
    /// Upserting the same document id twice leaves the index in the same
    /// state as upserting it once, which is what makes redelivered events
    /// harmless downstream.
    async fn upsert_document(&self, document: &EnrichedLyrics) -> Result<(), SearchError>;

    /// Ensure the index exists with the k-NN mappings.
    ///
    /// If the index doesn't exist, it is created with a `knn_vector`
    /// field per language at that language's fixed dimensionality.
    async fn ensure_index_exists(&self) -> Result<(), SearchError>;

    /// Check if the index backend is healthy and reachable.
    async fn health_check(&self) -> Result<bool, SearchError>;
}
