//! Consumer module for the lyrics enrichment pipeline.
//!
//! Provides Kafka consumer functionality for receiving change events from
//! the language-partitioned input topic.

mod kafka_consumer;
mod messages;

pub use kafka_consumer::LyricsConsumer;
pub use messages::StreamMessage;
