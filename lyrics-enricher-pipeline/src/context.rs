//! Dependency container for enrichment tasks.

use std::sync::Arc;

use lyrics_enricher_capabilities::{EmbeddingProvider, TagExtractor};

use crate::sink::RecordSink;

/// Handles to the external collaborators every enrichment task needs.
///
/// Constructed once at startup and shared across the worker pool, so the
/// capability clients and the sink have an explicit lifecycle instead of
/// living in globals. Tests substitute fakes for any of the three.
pub struct PipelineContext {
    /// The sentence-embedding capability.
    pub embedder: Arc<dyn EmbeddingProvider>,
    /// The tag-extraction capability.
    pub tagger: Arc<dyn TagExtractor>,
    /// The sink enriched records are published to.
    pub sink: Arc<dyn RecordSink>,
}

impl PipelineContext {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        tagger: Arc<dyn TagExtractor>,
        sink: Arc<dyn RecordSink>,
    ) -> Self {
        Self {
            embedder,
            tagger,
            sink,
        }
    }
}
