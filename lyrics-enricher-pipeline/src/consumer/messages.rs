//! Message types for the consumer.
//!
//! Defines the messages that flow from the consumer task to the
//! orchestrator.

use lyrics_enricher_shared::ChangeEvent;

/// Messages that flow through the pipeline channel.
#[derive(Debug)]
pub enum StreamMessage {
    /// A parsed change event ready for enrichment.
    Event(ChangeEvent),
    /// A delivery error reported by the source.
    Error(String),
    /// Stream has ended.
    End,
}
