//! Sink module for the lyrics enrichment pipeline.
//!
//! Publishes enriched records to the output topic.

mod kafka_sink;

use async_trait::async_trait;

pub use kafka_sink::{KafkaSink, SinkConfig};

use crate::errors::PipelineError;
use lyrics_enricher_shared::EnrichedLyrics;

/// Abstract interface for the enriched-record sink.
///
/// The sink is shared across all enrichment tasks, so implementations
/// must be safe for concurrent use.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Publish an enriched record, keyed by its document id.
    ///
    /// Returns once the underlying stream has acknowledged the record.
    async fn publish(&self, record: &EnrichedLyrics) -> Result<(), PipelineError>;

    /// Flush anything still buffered and release the sink.
    async fn close(&self) -> Result<(), PipelineError>;
}
