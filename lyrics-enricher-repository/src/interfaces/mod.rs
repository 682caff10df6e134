//! Interface definitions for the vector index client.
//!
//! This module defines the abstract `VectorIndexClient` trait that allows
//! for dependency injection and swappable index backend implementations.

mod vector_index_client;

pub use vector_index_client::VectorIndexClient;
