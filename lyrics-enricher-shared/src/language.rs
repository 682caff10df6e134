//! Language partition selector.
//!
//! The input stream is partitioned by language, and each partition is tied
//! to a fixed embedding model with a fixed dimensionality. The per-language
//! constants live here so every component agrees on them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The language of a lyrics partition.
///
/// Unknown selectors resolve to `English`, matching the upstream CLI
/// behavior of treating anything that isn't a Spanish selector as English.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    English,
    Spanish,
}

impl Language {
    /// Parse a language selector, defaulting unknown input to English.
    pub fn parse(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "es" | "spanish" => Language::Spanish,
            _ => Language::English,
        }
    }

    /// The input topic carrying change events for this language.
    pub fn input_topic(&self) -> &'static str {
        match self {
            Language::English => "EnglishInputTopic",
            Language::Spanish => "SpanishInputTopic",
        }
    }

    /// The sentence-embedding model used for this language.
    pub fn model_id(&self) -> &'static str {
        match self {
            Language::English => "sentence-transformers/all-MiniLM-L6-v2",
            Language::Spanish => {
                "mrm8488/distiluse-base-multilingual-cased-v2-finetuned-stsb_multi_mt-es"
            }
        }
    }

    /// The embedding field name in enriched records and the vector index.
    pub fn embedding_field(&self) -> &'static str {
        match self {
            Language::English => "lyrics_embeddings_en",
            Language::Spanish => "lyrics_embeddings_es",
        }
    }

    /// The fixed dimensionality of this language's embedding model.
    pub fn embedding_dim(&self) -> usize {
        match self {
            Language::English => 384,
            Language::Spanish => 512,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::English => write!(f, "english"),
            Language::Spanish => write!(f, "spanish"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_spanish_selectors() {
        assert_eq!(Language::parse("es"), Language::Spanish);
        assert_eq!(Language::parse("spanish"), Language::Spanish);
        assert_eq!(Language::parse(" ES "), Language::Spanish);
    }

    #[test]
    fn test_parse_defaults_to_english() {
        assert_eq!(Language::parse("en"), Language::English);
        assert_eq!(Language::parse("english"), Language::English);
        assert_eq!(Language::parse("fr"), Language::English);
        assert_eq!(Language::parse(""), Language::English);
    }

    #[test]
    fn test_per_language_constants() {
        assert_eq!(Language::English.input_topic(), "EnglishInputTopic");
        assert_eq!(Language::Spanish.input_topic(), "SpanishInputTopic");
        assert_eq!(Language::English.embedding_field(), "lyrics_embeddings_en");
        assert_eq!(Language::Spanish.embedding_field(), "lyrics_embeddings_es");
        assert_eq!(Language::English.embedding_dim(), 384);
        assert_eq!(Language::Spanish.embedding_dim(), 512);
    }
}
