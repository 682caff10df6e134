//! OpenSearch query builders.
//!
//! This module builds the k-NN search body for a vector query against the
//! language-specific embedding field.

use serde_json::{json, Value};

use lyrics_enricher_shared::VectorQuery;

/// Fields projected back for display; embeddings are never returned.
const SOURCE_FIELDS: [&str; 6] = ["artist", "title", "year", "genre", "tags", "lyrics"];

/// Build an OpenSearch k-NN search body from a `VectorQuery`.
///
/// The backend examines `num_candidates` approximate neighbors per shard
/// and the response is sized to `limit`, so the caller receives the top
/// matches by similarity score.
pub fn build_knn_search(query: &VectorQuery) -> Value {
    json!({
        "size": query.limit,
        "_source": SOURCE_FIELDS,
        "query": {
            "knn": {
                query.language.embedding_field(): {
                    "vector": query.vector,
                    "k": query.num_candidates
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyrics_enricher_shared::Language;

    #[test]
    fn test_knn_body_targets_language_field() {
        let query = VectorQuery::new(vec![0.1, 0.2, 0.3], Language::English);
        let body = build_knn_search(&query);

        assert!(body["query"]["knn"]["lyrics_embeddings_en"].is_object());
        assert!(body["query"]["knn"]["lyrics_embeddings_es"].is_null());

        let query = VectorQuery::new(vec![0.1, 0.2, 0.3], Language::Spanish);
        let body = build_knn_search(&query);

        assert!(body["query"]["knn"]["lyrics_embeddings_es"].is_object());
    }

    #[test]
    fn test_knn_body_carries_limit_and_candidates() {
        let query = VectorQuery::new(vec![0.5; 4], Language::English)
            .with_limit(3)
            .with_num_candidates(10);
        let body = build_knn_search(&query);

        assert_eq!(body["size"], 3);
        assert_eq!(body["query"]["knn"]["lyrics_embeddings_en"]["k"], 10);

        let vector = body["query"]["knn"]["lyrics_embeddings_en"]["vector"]
            .as_array()
            .unwrap();
        assert_eq!(vector.len(), 4);
    }

    #[test]
    fn test_knn_body_excludes_embeddings_from_source() {
        let query = VectorQuery::new(vec![0.0; 2], Language::English);
        let body = build_knn_search(&query);

        let source = body["_source"].as_array().unwrap();
        assert!(source.iter().all(|f| {
            let name = f.as_str().unwrap();
            !name.starts_with("lyrics_embeddings")
        }));
    }
}
