pub mod book;
pub mod candidate;
pub mod profile;
pub mod recommendation;

pub use book::{cell_text, deserialize_rows, identity_key, BookDetails, BookRecord, EnrichedBook, RatingsTrend, RawRow};
pub use candidate::{factor, CandidateBook, CandidateSeed, ScoreBreakdown};
pub use profile::{split_genres, SourcePerformance, UserProfile};
pub use recommendation::{
    DailyRecommendation, PipelineReport, Recommendation, RecommendationOutcome,
    RecommendationResult, STATUS_NEW,
};

use serde::{Deserialize, Serialize};

/// Metadata returned by an external book lookup
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BookMetadata {
    pub title: String,
    pub authors: Vec<String>,
    pub average_rating: Option<f64>,
    pub ratings_count: Option<i64>,
    pub categories: Vec<String>,
    pub cover_url: Option<String>,
}

impl BookMetadata {
    pub fn primary_author(&self) -> Option<&str> {
        self.authors.first().map(String::as_str)
    }

    /// First category, lowercased
    pub fn primary_genre(&self) -> Option<String> {
        self.categories
            .iter()
            .map(|c| c.trim().to_lowercase())
            .find(|c| !c.is_empty())
    }
}
