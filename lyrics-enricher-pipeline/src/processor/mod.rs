//! Processor module for the lyrics enrichment pipeline.
//!
//! Executes enrichment tasks with bounded concurrency.

mod enrichment_pool;

pub use enrichment_pool::{EnrichmentPool, DEFAULT_POOL_CAPACITY};
