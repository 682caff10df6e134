//! Orchestrator module for the lyrics enrichment pipeline.
//!
//! Owns the consume-dispatch-publish loop for one language partition.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, instrument, warn};

use crate::consumer::{LyricsConsumer, StreamMessage};
use crate::context::PipelineContext;
use crate::errors::PipelineError;
use crate::processor::EnrichmentPool;
use crate::sink::RecordSink;

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Size of the message channel buffer.
    pub channel_buffer_size: usize,
    /// How long to wait for in-flight tasks at shutdown.
    pub drain_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: 1000,
            drain_timeout: Duration::from_secs(30),
        }
    }
}

/// Orchestrator that coordinates the pipeline components.
///
/// The orchestrator:
/// - Runs the consumer on a background task
/// - Submits each event to the enrichment pool, blocking while the pool
///   is saturated so consumption can't outrun enrichment
/// - Handles shutdown signals with a graceful drain
pub struct Orchestrator {
    consumer: Arc<LyricsConsumer>,
    pool: EnrichmentPool,
    context: Arc<PipelineContext>,
    config: OrchestratorConfig,
    shutdown_tx: broadcast::Sender<()>,
}

impl Orchestrator {
    /// Create a new orchestrator with the given components.
    pub fn new(
        consumer: LyricsConsumer,
        pool: EnrichmentPool,
        context: Arc<PipelineContext>,
    ) -> Self {
        Self::with_config(consumer, pool, context, OrchestratorConfig::default())
    }

    /// Create a new orchestrator with custom configuration.
    pub fn with_config(
        consumer: LyricsConsumer,
        pool: EnrichmentPool,
        context: Arc<PipelineContext>,
        config: OrchestratorConfig,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            consumer: Arc::new(consumer),
            pool,
            context,
            config,
            shutdown_tx,
        }
    }

    /// Run the orchestrator.
    ///
    /// This method starts the consumer and coordinates event flow. It
    /// blocks until a shutdown signal is received or the source ends.
    #[instrument(skip(self))]
    pub async fn run(&mut self) -> Result<(), PipelineError> {
        info!(
            topic = %self.consumer.topic(),
            workers = self.pool.capacity(),
            "Starting lyrics enrichment orchestrator"
        );

        self.consumer.subscribe()?;

        let (tx, mut rx) = mpsc::channel::<StreamMessage>(self.config.channel_buffer_size);

        // Start consumer in background
        let consumer = self.consumer.clone();
        let shutdown_rx = self.shutdown_tx.subscribe();

        let consumer_handle = tokio::spawn(async move {
            if let Err(e) = consumer.run(tx, shutdown_rx).await {
                error!(error = %e, "Consumer error");
            }
        });

        // Dispatch events
        loop {
            tokio::select! {
                msg = rx.recv() => {
                    match msg {
                        Some(StreamMessage::Event(event)) => {
                            if let Err(e) = self.pool.submit(self.context.clone(), event).await {
                                error!(error = %e, "Failed to submit enrichment task");
                            }
                        }
                        Some(StreamMessage::Error(e)) => {
                            error!(error = %e, "Received error from consumer");
                        }
                        Some(StreamMessage::End) | None => {
                            info!("Consumer stream ended");
                            break;
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    let _ = self.shutdown_tx.send(());
                    break;
                }
            }
        }

        // Let already-dispatched tasks finish before releasing handles
        let abandoned = self.pool.drain(self.config.drain_timeout).await;
        if abandoned > 0 {
            warn!(
                abandoned = abandoned,
                "Tasks still running at drain timeout; their events rely on redelivery"
            );
        }

        if let Err(e) = self.context.sink.close().await {
            warn!(error = %e, "Failed to flush sink");
        }

        // Wait for consumer to finish
        let _ = consumer_handle.await;

        info!("Orchestrator shutdown complete");
        Ok(())
    }

    /// Trigger a graceful shutdown.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.channel_buffer_size, 1000);
        assert_eq!(config.drain_timeout, Duration::from_secs(30));
    }
}
