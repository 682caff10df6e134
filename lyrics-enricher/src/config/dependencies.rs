//! Dependency initialization and wiring for the lyrics enricher.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::EnricherError;
use lyrics_enricher_capabilities::{HttpEmbeddingProvider, HttpTagExtractor};
use lyrics_enricher_pipeline::{
    config::KafkaSettings,
    consumer::LyricsConsumer,
    orchestrator::Orchestrator,
    processor::EnrichmentPool,
    sink::{KafkaSink, SinkConfig},
    PipelineContext,
};
use lyrics_enricher_shared::Language;

/// Default Kafka broker address.
const DEFAULT_KAFKA_BROKER: &str = "localhost:9092";

/// Default Kafka consumer group ID.
const DEFAULT_KAFKA_GROUP_ID: &str = "lyrics-enricher";

/// Default embedding inference service URL.
const DEFAULT_EMBEDDING_URL: &str = "http://localhost:8080";

/// Default tag-extraction service URL.
const DEFAULT_TAGGING_URL: &str = "http://localhost:8081";

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
}

impl Dependencies {
    /// Initialize all dependencies for one language partition.
    ///
    /// # Environment Variables
    ///
    /// - `KAFKA_BROKER`: Kafka broker address (default: localhost:9092)
    /// - `KAFKA_GROUP_ID`: Consumer group ID (default: lyrics-enricher)
    /// - `KAFKA_PROPERTIES_FILE`: Optional client-properties file, used
    ///   when no `--properties-file` flag is given
    /// - `OUTPUT_TOPIC`: Output topic for enriched records
    /// - `EMBEDDING_URL`: Embedding service URL (default: localhost:8080)
    /// - `TAGGING_URL`: Tagging service URL (default: localhost:8081)
    pub fn new(
        language: Language,
        workers: usize,
        properties_file: Option<PathBuf>,
    ) -> Result<Self, EnricherError> {
        let kafka_broker =
            env::var("KAFKA_BROKER").unwrap_or_else(|_| DEFAULT_KAFKA_BROKER.to_string());
        let kafka_group_id =
            env::var("KAFKA_GROUP_ID").unwrap_or_else(|_| DEFAULT_KAFKA_GROUP_ID.to_string());
        let embedding_url =
            env::var("EMBEDDING_URL").unwrap_or_else(|_| DEFAULT_EMBEDDING_URL.to_string());
        let tagging_url =
            env::var("TAGGING_URL").unwrap_or_else(|_| DEFAULT_TAGGING_URL.to_string());

        let properties_file =
            properties_file.or_else(|| env::var("KAFKA_PROPERTIES_FILE").ok().map(PathBuf::from));

        let mut settings = KafkaSettings::new(kafka_broker.clone(), kafka_group_id.clone());
        if let Some(path) = properties_file {
            settings = settings.with_properties_file(path);
        }

        let mut sink_config = SinkConfig::default();
        if let Ok(topic) = env::var("OUTPUT_TOPIC") {
            sink_config.topic = topic;
        }

        info!(
            kafka_broker = %kafka_broker,
            kafka_group_id = %kafka_group_id,
            language = %language,
            input_topic = %language.input_topic(),
            output_topic = %sink_config.topic,
            workers = workers,
            "Initializing dependencies"
        );

        // Capability clients
        let embedder = HttpEmbeddingProvider::new(&embedding_url)
            .map_err(|e| EnricherError::config(format!("Failed to create embedding client: {}", e)))?;
        let tagger = HttpTagExtractor::new(&tagging_url)
            .map_err(|e| EnricherError::config(format!("Failed to create tagging client: {}", e)))?;

        // Kafka consumer and sink
        let consumer = LyricsConsumer::new(&settings, language)
            .map_err(|e| EnricherError::config(format!("Failed to create Kafka consumer: {}", e)))?;
        let sink = KafkaSink::with_config(&settings, sink_config)
            .map_err(|e| EnricherError::config(format!("Failed to create Kafka sink: {}", e)))?;

        let context = Arc::new(PipelineContext::new(
            Arc::new(embedder),
            Arc::new(tagger),
            Arc::new(sink),
        ));

        let pool = EnrichmentPool::new(workers);

        let orchestrator = Orchestrator::new(consumer, pool, context);

        Ok(Self { orchestrator })
    }
}
