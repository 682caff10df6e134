//! # Lyrics Enricher Capabilities
//!
//! Narrow async interfaces to the two external inference capabilities the
//! pipeline depends on, plus HTTP-backed implementations:
//!
//! 1. **Embedding**: text + language -> dense float vector of fixed
//!    per-language dimensionality
//! 2. **Tag extraction**: text -> up to 10 representative tags,
//!    most frequent first
//!
//! The models themselves are opaque; components depend on the traits so
//! tests can substitute fakes.

pub mod embedding;
pub mod errors;
pub mod tagging;

pub use embedding::{EmbeddingProvider, HttpEmbeddingProvider};
pub use errors::CapabilityError;
pub use tagging::{HttpTagExtractor, TagExtractor};
