//! Vector-search request and response types for the query path.

use serde::{Deserialize, Serialize};

use crate::language::Language;

/// Default number of matches returned to the user.
pub const DEFAULT_LIMIT: usize = 3;

/// Default number of approximate-nearest-neighbor candidates examined.
pub const DEFAULT_NUM_CANDIDATES: usize = 10;

/// An approximate nearest-neighbor search request.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorQuery {
    /// Query embedding, produced by the same model family as the index.
    pub vector: Vec<f32>,
    /// Selects the language-specific embedding field to search.
    pub language: Language,
    /// Maximum number of matches to return.
    pub limit: usize,
    /// Number of candidates the index examines before ranking.
    pub num_candidates: usize,
}

impl VectorQuery {
    pub fn new(vector: Vec<f32>, language: Language) -> Self {
        Self {
            vector,
            language,
            limit: DEFAULT_LIMIT,
            num_candidates: DEFAULT_NUM_CANDIDATES,
        }
    }

    /// Override the number of matches returned.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Override the number of candidates examined.
    pub fn with_num_candidates(mut self, num_candidates: usize) -> Self {
        self.num_candidates = num_candidates;
        self
    }
}

/// One ranked result from a vector search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMatch {
    pub artist: Option<String>,
    pub title: Option<String>,
    pub year: Option<i64>,
    pub genre: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Truncated lyrics excerpt, at most 50 characters.
    pub lyrics: String,
    /// Similarity score, higher is more similar.
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults() {
        let query = VectorQuery::new(vec![0.0; 4], Language::English);
        assert_eq!(query.limit, DEFAULT_LIMIT);
        assert_eq!(query.num_candidates, DEFAULT_NUM_CANDIDATES);
    }

    #[test]
    fn test_query_overrides() {
        let query = VectorQuery::new(vec![0.0; 4], Language::Spanish)
            .with_limit(5)
            .with_num_candidates(50);
        assert_eq!(query.limit, 5);
        assert_eq!(query.num_candidates, 50);
    }
}
