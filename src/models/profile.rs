use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Splits a genre cell such as `"Fantasy, Literary Fiction"` into lowercase labels
///
/// Blank entries are dropped and repeats keep their first position.
pub fn split_genres(raw: &str) -> Vec<String> {
    let mut genres: Vec<String> = Vec::new();
    for genre in raw.split(',').map(|g| g.trim().to_lowercase()) {
        if !genre.is_empty() && !genres.contains(&genre) {
            genres.push(genre);
        }
    }
    genres
}

/// Mean user rating for one source, with its sample size
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourcePerformance {
    pub source: String,
    pub average_rating: f64,
    pub sample_size: usize,
}

/// Taste profile aggregated from the user's read history
///
/// Derived and read-only: rebuilding from the same records yields the same profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    /// Identity keys of every identifiable read book
    #[serde(skip)]
    pub read_keys: HashSet<String>,
    pub average_user_rating: f64,
    pub average_external_rating: f64,
    /// `average_user_rating − average_external_rating`, `0` when no paired signal exists
    pub rating_bias: f64,
    /// Authors rated ≥ 4.0 at least once, first-seen order
    pub favorite_authors: Vec<String>,
    /// Lowercase genre → mean user rating, genres with ≥ 2 rated books only
    pub genre_preferences: BTreeMap<String, f64>,
    /// First-seen order, sources with ≥ 2 rated books only
    pub source_performance: Vec<SourcePerformance>,
    pub rated_count: usize,
}

impl UserProfile {
    pub fn has_read(&self, key: &str) -> bool {
        self.read_keys.contains(key)
    }

    /// Case-insensitive membership in `favorite_authors`
    pub fn is_favorite_author(&self, author: &str) -> bool {
        let author = author.trim().to_lowercase();
        !author.is_empty()
            && self
                .favorite_authors
                .iter()
                .any(|fav| fav.trim().to_lowercase() == author)
    }

    pub fn genre_average(&self, genre: &str) -> Option<f64> {
        self.genre_preferences
            .get(&genre.trim().to_lowercase())
            .copied()
    }

    /// First profile source whose name occurs (case-sensitively) inside `candidate_source`
    pub fn matching_source(&self, candidate_source: &str) -> Option<&SourcePerformance> {
        self.source_performance
            .iter()
            .find(|perf| candidate_source.contains(perf.source.as_str()))
    }

    pub fn read_count(&self) -> usize {
        self.read_keys.len()
    }
}
