//! # Lyrics Enricher Repository
//!
//! This crate provides traits and implementations for interacting with the
//! persisted vector index that serves the query path. It includes error
//! definitions, the abstract `VectorIndexClient` interface, and a concrete
//! implementation backed by OpenSearch k-NN.

pub mod errors;
pub mod interfaces;
pub mod opensearch;

pub use errors::SearchError;
pub use interfaces::VectorIndexClient;
pub use opensearch::OpenSearchClient;
