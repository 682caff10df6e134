//! Kafka sink implementation.
//!
//! Publishes enriched records as JSON to the output topic, keyed by
//! document id so the downstream store applies them as upserts.

use std::time::Duration;

use async_trait::async_trait;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use tracing::{debug, error, info, warn};

use crate::config::KafkaSettings;
use crate::errors::PipelineError;
use crate::sink::RecordSink;
use lyrics_enricher_shared::EnrichedLyrics;

/// The default output topic for enriched records.
const OUTPUT_TOPIC: &str = "OutputTopic";

/// Configuration for the Kafka sink.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Topic enriched records are published to.
    pub topic: String,
    /// How long to wait for a broker delivery report per attempt.
    pub delivery_timeout: Duration,
    /// Maximum number of retries after a failed publish.
    pub max_retries: u32,
    /// Initial retry delay; doubles per attempt.
    pub initial_retry_delay: Duration,
    /// Ceiling for the retry delay.
    pub max_retry_delay: Duration,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            topic: OUTPUT_TOPIC.to_string(),
            delivery_timeout: Duration::from_secs(5),
            max_retries: 3,
            initial_retry_delay: Duration::from_millis(100),
            max_retry_delay: Duration::from_secs(5),
        }
    }
}

/// Kafka producer for enriched records.
///
/// `publish` awaits the broker's delivery report before returning, which
/// bounds the window of undelivered records at any point in time; a final
/// flush on `close` drains whatever is still queued at shutdown.
pub struct KafkaSink {
    producer: FutureProducer,
    config: SinkConfig,
}

impl KafkaSink {
    /// Create a new sink publishing to the default output topic.
    pub fn new(settings: &KafkaSettings) -> Result<Self, PipelineError> {
        Self::with_config(settings, SinkConfig::default())
    }

    /// Create a new sink with custom configuration.
    pub fn with_config(
        settings: &KafkaSettings,
        config: SinkConfig,
    ) -> Result<Self, PipelineError> {
        let producer: FutureProducer = settings
            .producer_config()?
            .create()
            .map_err(|e| PipelineError::kafka(e.to_string()))?;

        info!(
            brokers = %settings.brokers,
            topic = %config.topic,
            "Created Kafka sink"
        );

        Ok(Self { producer, config })
    }

    /// The output topic this sink publishes to.
    pub fn topic(&self) -> &str {
        &self.config.topic
    }
}

#[async_trait]
impl RecordSink for KafkaSink {
    async fn publish(&self, record: &EnrichedLyrics) -> Result<(), PipelineError> {
        let payload = serde_json::to_string(record)
            .map_err(|e| PipelineError::publish(format!("Failed to serialize record: {}", e)))?;

        let mut delay = self.config.initial_retry_delay;
        let mut attempt = 0;

        loop {
            attempt += 1;

            let future_record = FutureRecord::to(&self.config.topic)
                .key(&record.document_id)
                .payload(&payload);

            match self
                .producer
                .send(future_record, self.config.delivery_timeout)
                .await
            {
                Ok((partition, offset)) => {
                    debug!(
                        document_id = %record.document_id,
                        partition = partition,
                        offset = offset,
                        "Published enriched record"
                    );
                    return Ok(());
                }
                Err((e, _)) if attempt <= self.config.max_retries => {
                    warn!(
                        document_id = %record.document_id,
                        attempt = attempt,
                        error = %e,
                        "Publish failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(self.config.max_retry_delay);
                }
                Err((e, _)) => {
                    error!(
                        document_id = %record.document_id,
                        error = %e,
                        "Publish failed after retries"
                    );
                    return Err(PipelineError::publish(e.to_string()));
                }
            }
        }
    }

    async fn close(&self) -> Result<(), PipelineError> {
        self.producer
            .flush(Duration::from_secs(5))
            .map_err(|e| PipelineError::publish(e.to_string()))?;
        info!("Kafka sink flushed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sink_config() {
        let config = SinkConfig::default();
        assert_eq!(config.topic, "OutputTopic");
        assert_eq!(config.max_retries, 3);
        assert!(config.initial_retry_delay < config.max_retry_delay);
    }
}
