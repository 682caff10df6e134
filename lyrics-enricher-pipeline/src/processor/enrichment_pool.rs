//! Bounded pool of concurrent enrichment tasks.
//!
//! Each task embeds and tags one change event, then publishes the
//! enriched record. A semaphore caps the number of in-flight tasks, and
//! `submit` blocks while the pool is saturated, which backpressures the
//! orchestrator's poll loop and, through it, the consumer.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, error, instrument};

use crate::context::PipelineContext;
use crate::errors::PipelineError;
use crate::sink::RecordSink;
use lyrics_enricher_capabilities::{EmbeddingProvider, TagExtractor};
use lyrics_enricher_shared::{ChangeEvent, EnrichedLyrics};

/// Default number of concurrently in-flight enrichment tasks.
pub const DEFAULT_POOL_CAPACITY: usize = 10;

/// Bounded worker pool for enrichment tasks.
///
/// Tasks complete independently and in any order relative to submission;
/// the downstream store upserts by document id, so no output ordering is
/// required.
pub struct EnrichmentPool {
    semaphore: Arc<Semaphore>,
    tasks: JoinSet<()>,
    capacity: usize,
}

impl EnrichmentPool {
    /// Create a pool with the given task capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            tasks: JoinSet::new(),
            capacity,
        }
    }

    /// The configured task capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of tasks currently holding a slot.
    pub fn in_flight(&self) -> usize {
        self.capacity - self.semaphore.available_permits()
    }

    /// Submit a change event for enrichment.
    ///
    /// Blocks until a pool slot frees when all slots are taken. The task
    /// runs to completion on its own; enrichment or publish failures are
    /// logged and the event is dropped from this attempt, leaving retry
    /// to upstream redelivery.
    pub async fn submit(
        &mut self,
        context: Arc<PipelineContext>,
        event: ChangeEvent,
    ) -> Result<(), PipelineError> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| PipelineError::channel("enrichment pool closed"))?;

        // Reap finished tasks so the join set doesn't grow with every submit.
        while self.tasks.try_join_next().is_some() {}

        self.tasks.spawn(async move {
            let _permit = permit;
            run_task(context, event).await;
        });

        Ok(())
    }

    /// Wait for in-flight tasks to finish, up to `timeout`.
    ///
    /// Tasks still running at the deadline are detached rather than
    /// aborted, so a publish that is already underway can still land;
    /// their events are redelivered on the next run either way. Returns
    /// the number of detached tasks.
    #[instrument(skip(self))]
    pub async fn drain(&mut self, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;

        while !self.tasks.is_empty() {
            match tokio::time::timeout_at(deadline, self.tasks.join_next()).await {
                Ok(Some(_)) => {}
                Ok(None) => break,
                Err(_) => break,
            }
        }

        let abandoned = self.tasks.len();
        if abandoned > 0 {
            let remaining = std::mem::take(&mut self.tasks);
            remaining.detach_all();
        }

        abandoned
    }
}

impl Default for EnrichmentPool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_CAPACITY)
    }
}

/// Run one enrichment task end to end.
///
/// A failure in either capability aborts the task before anything is
/// published, so partial enrichment never reaches the output topic.
async fn run_task(context: Arc<PipelineContext>, event: ChangeEvent) {
    let document_id = event.document_id.clone();

    match enrich(&context, event).await {
        Ok(record) => {
            if let Err(e) = context.sink.publish(&record).await {
                error!(
                    document_id = %document_id,
                    error = %e,
                    "Failed to publish enriched record"
                );
            } else {
                debug!(document_id = %document_id, "Enriched and published");
            }
        }
        Err(e) => {
            error!(
                document_id = %document_id,
                error = %e,
                "Enrichment failed; no record published for this attempt"
            );
        }
    }
}

/// Invoke both capabilities and assemble the enriched record.
pub(crate) async fn enrich(
    context: &PipelineContext,
    event: ChangeEvent,
) -> Result<EnrichedLyrics, PipelineError> {
    let embedding = context.embedder.embed(&event.lyrics, event.language).await?;
    let tags = context.tagger.extract_tags(&event.lyrics).await?;

    Ok(EnrichedLyrics::new(
        event.document_id,
        event.lyrics,
        tags,
        event.language,
        embedding,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lyrics_enricher_capabilities::CapabilityError;
    use lyrics_enricher_shared::Language;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Embedder returning a fixed vector of the language's dimensionality.
    struct FixedEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FixedEmbedder {
        async fn embed(
            &self,
            _text: &str,
            language: Language,
        ) -> Result<Vec<f32>, CapabilityError> {
            Ok(vec![0.5; language.embedding_dim()])
        }
    }

    /// Embedder that tracks how many calls run concurrently.
    struct TrackingEmbedder {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    impl TrackingEmbedder {
        fn new() -> Self {
            Self {
                current: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for TrackingEmbedder {
        async fn embed(
            &self,
            _text: &str,
            language: Language,
        ) -> Result<Vec<f32>, CapabilityError> {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            Ok(vec![0.0; language.embedding_dim()])
        }
    }

    /// Embedder that parks until the test opens the gate.
    struct GatedEmbedder {
        gate: Arc<Semaphore>,
    }

    #[async_trait]
    impl EmbeddingProvider for GatedEmbedder {
        async fn embed(
            &self,
            _text: &str,
            language: Language,
        ) -> Result<Vec<f32>, CapabilityError> {
            let _permit = self
                .gate
                .acquire()
                .await
                .map_err(|_| CapabilityError::request("gate closed"))?;
            Ok(vec![0.0; language.embedding_dim()])
        }
    }

    /// Embedder that always fails.
    struct FailingEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FailingEmbedder {
        async fn embed(
            &self,
            _text: &str,
            _language: Language,
        ) -> Result<Vec<f32>, CapabilityError> {
            Err(CapabilityError::Timeout("model timed out".to_string()))
        }
    }

    struct FixedTagger {
        tags: Vec<String>,
    }

    #[async_trait]
    impl TagExtractor for FixedTagger {
        async fn extract_tags(&self, _text: &str) -> Result<Vec<String>, CapabilityError> {
            Ok(self.tags.clone())
        }
    }

    /// Sink that records everything published to it.
    struct MockSink {
        published: Mutex<Vec<EnrichedLyrics>>,
    }

    impl MockSink {
        fn new() -> Self {
            Self {
                published: Mutex::new(Vec::new()),
            }
        }

        fn published_count(&self) -> usize {
            self.published.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl RecordSink for MockSink {
        async fn publish(&self, record: &EnrichedLyrics) -> Result<(), PipelineError> {
            self.published.lock().unwrap().push(record.clone());
            Ok(())
        }

        async fn close(&self) -> Result<(), PipelineError> {
            Ok(())
        }
    }

    fn context_with(
        embedder: Arc<dyn EmbeddingProvider>,
        sink: Arc<MockSink>,
    ) -> Arc<PipelineContext> {
        Arc::new(PipelineContext::new(
            embedder,
            Arc::new(FixedTagger {
                tags: vec!["baby".to_string()],
            }),
            sink,
        ))
    }

    #[tokio::test]
    async fn test_enrich_assembles_english_record() {
        let sink = Arc::new(MockSink::new());
        let context = context_with(Arc::new(FixedEmbedder), sink);

        let event = ChangeEvent::new("1", "I love you baby", Language::English);
        let record = enrich(&context, event).await.unwrap();

        assert_eq!(record.document_id, "1");
        assert_eq!(record.lyrics, "I love you baby");
        assert_eq!(record.tags, vec!["baby"]);
        assert_eq!(
            record.embedding_en.as_ref().map(Vec::len),
            Some(Language::English.embedding_dim())
        );
        assert!(record.embedding_es.is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_pool_never_exceeds_capacity() {
        let embedder = Arc::new(TrackingEmbedder::new());
        let sink = Arc::new(MockSink::new());
        let context = context_with(embedder.clone(), sink.clone());

        let mut pool = EnrichmentPool::new(2);

        for i in 0..6 {
            let event = ChangeEvent::new(format!("{}", i), "some lyrics", Language::English);
            pool.submit(context.clone(), event).await.unwrap();
        }

        let abandoned = pool.drain(Duration::from_secs(5)).await;

        assert_eq!(abandoned, 0);
        assert!(embedder.peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(sink.published_count(), 6);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_submit_blocks_when_pool_saturated() {
        let gate = Arc::new(Semaphore::new(0));
        let sink = Arc::new(MockSink::new());
        let context = context_with(Arc::new(GatedEmbedder { gate: gate.clone() }), sink.clone());

        let mut pool = EnrichmentPool::new(2);

        for i in 0..2 {
            let event = ChangeEvent::new(format!("{}", i), "held", Language::English);
            pool.submit(context.clone(), event).await.unwrap();
        }
        assert_eq!(pool.in_flight(), 2);

        // Third submit must block while both slots are held.
        let event = ChangeEvent::new("2", "held", Language::English);
        let blocked = tokio::time::timeout(
            Duration::from_millis(50),
            pool.submit(context.clone(), event),
        )
        .await;
        assert!(blocked.is_err());

        // Open the gate; slots free up and the submit goes through.
        gate.add_permits(10);
        let event = ChangeEvent::new("2", "held", Language::English);
        pool.submit(context.clone(), event).await.unwrap();

        let abandoned = pool.drain(Duration::from_secs(5)).await;
        assert_eq!(abandoned, 0);
        assert_eq!(sink.published_count(), 3);
    }

    #[tokio::test]
    async fn test_failed_capability_publishes_nothing() {
        let sink = Arc::new(MockSink::new());
        let context = context_with(Arc::new(FailingEmbedder), sink.clone());

        let mut pool = EnrichmentPool::new(2);
        let event = ChangeEvent::new("2", "doomed lyrics", Language::English);
        pool.submit(context, event).await.unwrap();

        let abandoned = pool.drain(Duration::from_secs(1)).await;

        assert_eq!(abandoned, 0);
        assert_eq!(sink.published_count(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_drain_times_out_on_stuck_tasks() {
        let gate = Arc::new(Semaphore::new(0));
        let sink = Arc::new(MockSink::new());
        let context = context_with(Arc::new(GatedEmbedder { gate }), sink);

        let mut pool = EnrichmentPool::new(2);
        let event = ChangeEvent::new("stuck", "never finishes", Language::English);
        pool.submit(context, event).await.unwrap();

        let abandoned = pool.drain(Duration::from_millis(50)).await;
        assert_eq!(abandoned, 1);
    }

    #[tokio::test]
    async fn test_spanish_event_populates_spanish_field() {
        let sink = Arc::new(MockSink::new());
        let context = context_with(Arc::new(FixedEmbedder), sink.clone());

        let mut pool = EnrichmentPool::new(1);
        let event = ChangeEvent::new("es-1", "te quiero", Language::Spanish);
        pool.submit(context, event).await.unwrap();
        pool.drain(Duration::from_secs(1)).await;

        let published = sink.published.lock().unwrap();
        assert_eq!(published.len(), 1);
        assert!(published[0].embedding_es.is_some());
        assert!(published[0].embedding_en.is_none());
        assert_eq!(
            published[0].embedding_es.as_ref().map(Vec::len),
            Some(Language::Spanish.embedding_dim())
        );
    }
}
