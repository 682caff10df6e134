//! Enriched record published to the output stream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::language::Language;

/// Maximum number of tags carried by an enriched record.
pub const MAX_TAGS: usize = 10;

/// The output unit of the enrichment pipeline.
///
/// Serialized as JSON on the output topic with the field names the
/// downstream store indexes: `_id`, `lyrics`, `tags`, and exactly one of
/// `lyrics_embeddings_en` / `lyrics_embeddings_es` depending on the source
/// partition's language. The constructor is the only way to populate an
/// embedding field, which keeps the two fields mutually exclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedLyrics {
    /// Identifier of the document being upserted downstream.
    #[serde(rename = "_id")]
    pub document_id: String,
    /// Raw lyrics text, passed through unchanged.
    pub lyrics: String,
    /// Up to [`MAX_TAGS`] tags, most frequent first, no duplicates.
    pub tags: Vec<String>,
    /// English embedding vector, present only for English-partition events.
    #[serde(
        rename = "lyrics_embeddings_en",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub embedding_en: Option<Vec<f32>>,
    /// Spanish embedding vector, present only for Spanish-partition events.
    #[serde(
        rename = "lyrics_embeddings_es",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub embedding_es: Option<Vec<f32>>,
    /// When the enrichment task assembled this record.
    pub enriched_at: DateTime<Utc>,
}

impl EnrichedLyrics {
    /// Assemble an enriched record, placing the embedding in the field
    /// matching the source event's language.
    pub fn new(
        document_id: impl Into<String>,
        lyrics: impl Into<String>,
        tags: Vec<String>,
        language: Language,
        embedding: Vec<f32>,
    ) -> Self {
        let (embedding_en, embedding_es) = match language {
            Language::English => (Some(embedding), None),
            Language::Spanish => (None, Some(embedding)),
        };

        Self {
            document_id: document_id.into(),
            lyrics: lyrics.into(),
            tags,
            embedding_en,
            embedding_es,
            enriched_at: Utc::now(),
        }
    }

    /// The language this record was enriched for, derived from which
    /// embedding field is populated.
    pub fn language(&self) -> Language {
        if self.embedding_es.is_some() {
            Language::Spanish
        } else {
            Language::English
        }
    }

    /// The populated embedding vector.
    pub fn embedding(&self) -> Option<&[f32]> {
        self.embedding_en
            .as_deref()
            .or(self.embedding_es.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_record_populates_only_english_field() {
        let record = EnrichedLyrics::new(
            "1",
            "I love you baby",
            vec!["baby".to_string()],
            Language::English,
            vec![0.1, 0.2],
        );

        assert!(record.embedding_en.is_some());
        assert!(record.embedding_es.is_none());
        assert_eq!(record.language(), Language::English);
        assert_eq!(record.embedding(), Some(&[0.1_f32, 0.2][..]));
    }

    #[test]
    fn test_spanish_record_populates_only_spanish_field() {
        let record = EnrichedLyrics::new(
            "2",
            "te quiero",
            vec![],
            Language::Spanish,
            vec![0.5; 4],
        );

        assert!(record.embedding_en.is_none());
        assert!(record.embedding_es.is_some());
        assert_eq!(record.language(), Language::Spanish);
    }

    #[test]
    fn test_serialized_shape_omits_absent_embedding() {
        let record = EnrichedLyrics::new(
            "abc",
            "some lyrics",
            vec!["love".to_string()],
            Language::English,
            vec![1.0],
        );

        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["_id"], "abc");
        assert_eq!(value["lyrics"], "some lyrics");
        assert!(value["lyrics_embeddings_en"].is_array());
        assert!(value.get("lyrics_embeddings_es").is_none());
    }

    #[test]
    fn test_round_trips_through_json() {
        let record = EnrichedLyrics::new(
            "xyz",
            "corazón",
            vec!["corazón".to_string()],
            Language::Spanish,
            vec![0.25; 8],
        );

        let json = serde_json::to_string(&record).unwrap();
        let parsed: EnrichedLyrics = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }
}
