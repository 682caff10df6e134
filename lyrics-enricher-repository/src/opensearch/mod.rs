//! OpenSearch implementation of the vector index client.

mod client;
mod index_config;
mod queries;

pub use client::OpenSearchClient;
pub use index_config::{get_index_settings, INDEX_NAME};
pub use queries::build_knn_search;
