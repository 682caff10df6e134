//! OpenSearch index configuration and mappings.
//!
//! This module defines the settings and mappings for the lyrics index,
//! including the two language-specific `knn_vector` fields.

use serde_json::{json, Value};

/// The name of the lyrics search index.
pub const INDEX_NAME: &str = "lyrics";

/// Get the index settings and mappings for the lyrics index.
///
/// The configuration includes:
/// - **knn_vector** fields for the English (384-dim) and Spanish (512-dim)
///   embeddings, each searchable independently
/// - **Keyword fields** for filtering on artist, genre, and tags
/// - Full-text `lyrics` for display and excerpting
pub fn get_index_settings() -> Value {
    json!({
        "settings": {
            "index.knn": true,
            "number_of_shards": 1,
            "number_of_replicas": 1
        },
        "mappings": {
            "properties": {
                "artist": {
                    "type": "keyword"
                },
                "title": {
                    "type": "text",
                    "fields": {
                        "raw": {
                            "type": "keyword"
                        }
                    }
                },
                "year": {
                    "type": "integer"
                },
                "genre": {
                    "type": "keyword"
                },
                "tags": {
                    "type": "keyword"
                },
                "lyrics": {
                    "type": "text"
                },
                "lyrics_embeddings_en": {
                    "type": "knn_vector",
                    "dimension": 384
                },
                "lyrics_embeddings_es": {
                    "type": "knn_vector",
                    "dimension": 512
                },
                "enriched_at": {
                    "type": "date"
                }
            }
        }
    })
}
