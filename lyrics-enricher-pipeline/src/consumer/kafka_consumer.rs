//! Kafka consumer implementation for the lyrics enricher.
//!
//! Consumes change events from the language-partitioned input topic and
//! forwards them to the orchestrator.

use rdkafka::{
    consumer::{Consumer, StreamConsumer},
    message::Message as KafkaMessage,
    TopicPartitionList,
};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

use crate::config::KafkaSettings;
use crate::consumer::messages::StreamMessage;
use crate::errors::PipelineError;
use lyrics_enricher_shared::{ChangeEvent, Language};

/// Change-data-capture envelope carried on the input topic.
///
/// The upstream source wraps each mutation in a `fullDocument` field; the
/// document identifier may be a plain string or an extended-JSON
/// `{"$oid": ...}` object.
#[derive(Debug, Deserialize)]
struct ChangeEnvelope {
    #[serde(rename = "fullDocument")]
    full_document: FullDocument,
}

#[derive(Debug, Deserialize)]
struct FullDocument {
    #[serde(rename = "_id")]
    id: Value,
    lyrics: String,
}

/// Kafka consumer for lyrics change events.
pub struct LyricsConsumer {
    consumer: StreamConsumer,
    topic: String,
    language: Language,
}

impl LyricsConsumer {
    /// Create a new consumer for the given language partition.
    ///
    /// The input topic is derived from the language, mirroring the
    /// upstream partitioning scheme.
    pub fn new(settings: &KafkaSettings, language: Language) -> Result<Self, PipelineError> {
        let consumer: StreamConsumer = settings
            .consumer_config()?
            .create()
            .map_err(|e| PipelineError::kafka(e.to_string()))?;

        let topic = language.input_topic().to_string();

        info!(
            brokers = %settings.brokers,
            group_id = %settings.group_id,
            topic = %topic,
            "Created Kafka consumer"
        );

        Ok(Self {
            consumer,
            topic,
            language,
        })
    }

    /// The input topic this consumer reads from.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Subscribe to the input topic.
    pub fn subscribe(&self) -> Result<(), PipelineError> {
        self.consumer
            .subscribe(&[self.topic.as_str()])
            .map_err(|e| PipelineError::kafka(e.to_string()))?;

        info!(topic = %self.topic, "Subscribed to Kafka topic");
        Ok(())
    }

    /// Start consuming messages and send parsed events through the channel.
    ///
    /// # Arguments
    ///
    /// * `sender` - Channel to send messages to
    /// * `shutdown` - Shutdown signal receiver
    #[instrument(skip(self, sender, shutdown))]
    pub async fn run(
        &self,
        sender: mpsc::Sender<StreamMessage>,
        mut shutdown: tokio::sync::broadcast::Receiver<()>,
    ) -> Result<(), PipelineError> {
        use futures::StreamExt;

        let mut message_stream = self.consumer.stream();

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Consumer received shutdown signal");
                    let _ = sender.send(StreamMessage::End).await;
                    break;
                }
                message = message_stream.next() => {
                    match message {
                        Some(Ok(msg)) => {
                            if let Err(e) = self.process_message(&msg, &sender).await {
                                error!(error = %e, "Failed to process message");
                            }
                        }
                        Some(Err(e)) => {
                            error!(error = %e, "Kafka error");
                            let _ = sender.send(StreamMessage::Error(e.to_string())).await;
                        }
                        None => {
                            info!("Kafka stream ended");
                            let _ = sender.send(StreamMessage::End).await;
                            break;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Process a single Kafka message.
    ///
    /// Malformed payloads are logged and skipped; the offset is committed
    /// either way, so a poison message cannot wedge the partition.
    async fn process_message(
        &self,
        msg: &rdkafka::message::BorrowedMessage<'_>,
        sender: &mpsc::Sender<StreamMessage>,
    ) -> Result<(), PipelineError> {
        let topic = msg.topic();
        let partition = msg.partition();
        let offset = msg.offset();

        match msg.payload() {
            Some(payload) => {
                debug!(
                    topic = %topic,
                    partition = partition,
                    offset = offset,
                    "Processing message"
                );

                match parse_change_event(payload, self.language) {
                    Ok(event) => {
                        sender
                            .send(StreamMessage::Event(event))
                            .await
                            .map_err(|e| PipelineError::channel(e.to_string()))?;
                    }
                    Err(e) => {
                        warn!(
                            offset = offset,
                            error = %e,
                            "Skipping malformed change event"
                        );
                    }
                }
            }
            None => {
                debug!(offset = offset, "Received message with empty payload");
            }
        }

        // Commit offset
        let mut tpl = TopicPartitionList::new();
        tpl.add_partition_offset(topic, partition, rdkafka::Offset::Offset(offset + 1))
            .map_err(|e| PipelineError::kafka(e.to_string()))?;

        self.consumer
            .commit(&tpl, rdkafka::consumer::CommitMode::Async)
            .map_err(|e| PipelineError::kafka(e.to_string()))?;

        Ok(())
    }
}

/// Parse a change-event payload into a `ChangeEvent`.
fn parse_change_event(payload: &[u8], language: Language) -> Result<ChangeEvent, PipelineError> {
    let envelope: ChangeEnvelope = serde_json::from_slice(payload)
        .map_err(|e| PipelineError::parse(format!("Failed to decode change event: {}", e)))?;

    let document_id = document_id_from_value(&envelope.full_document.id)?;

    Ok(ChangeEvent::new(
        document_id,
        envelope.full_document.lyrics,
        language,
    ))
}

/// Extract the document id from a plain string or an extended-JSON
/// `{"$oid": ...}` object.
fn document_id_from_value(value: &Value) -> Result<String, PipelineError> {
    if let Some(id) = value.as_str() {
        return Ok(id.to_string());
    }

    if let Some(oid) = value.get("$oid").and_then(Value::as_str) {
        return Ok(oid.to_string());
    }

    Err(PipelineError::parse(format!(
        "Unsupported _id value: {}",
        value
    )))
}
