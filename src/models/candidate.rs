use serde::{Deserialize, Serialize};

use super::book::identity_key;

/// Factor names as they appear in score breakdowns
pub mod factor {
    pub const GOODREADS_QUALITY: &str = "goodreads_quality";
    pub const USER_TASTE_ALIGNMENT: &str = "user_taste_alignment";
    pub const FAVORITE_AUTHOR_BOOST: &str = "favorite_author_boost";
    pub const GENRE_PREFERENCE: &str = "genre_preference";
    pub const SOURCE_RELIABILITY: &str = "source_reliability";
    pub const POPULARITY_BALANCE: &str = "popularity_balance";
}

/// Unscored candidate as supplied by a candidate pool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateSeed {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub external_rating: f64,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
}

/// Per-factor sub-scores, each in `[0, 1]`
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ScoreBreakdown {
    pub goodreads_quality: f64,
    pub user_taste_alignment: f64,
    pub favorite_author_boost: f64,
    pub genre_preference: f64,
    pub source_reliability: f64,
    pub popularity_balance: f64,
}

impl ScoreBreakdown {
    /// (factor name, sub-score) pairs in declaration order
    pub fn factors(&self) -> [(&'static str, f64); 6] {
        [
            (factor::GOODREADS_QUALITY, self.goodreads_quality),
            (factor::USER_TASTE_ALIGNMENT, self.user_taste_alignment),
            (factor::FAVORITE_AUTHOR_BOOST, self.favorite_author_boost),
            (factor::GENRE_PREFERENCE, self.genre_preference),
            (factor::SOURCE_RELIABILITY, self.source_reliability),
            (factor::POPULARITY_BALANCE, self.popularity_balance),
        ]
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.factors()
            .into_iter()
            .find(|(factor, _)| *factor == name)
            .map(|(_, score)| score)
    }
}

/// A candidate book, scored in place by the scoring engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateBook {
    pub title: String,
    pub author: String,
    pub source: String,
    pub external_rating: f64,
    pub genre: Option<String>,
    pub cover_url: Option<String>,
    pub recommendation_score: f64,
    pub score_breakdown: ScoreBreakdown,
    pub reasoning: String,
}

impl CandidateBook {
    pub fn identity_key(&self) -> String {
        identity_key(&self.title, &self.author)
    }

    /// Candidates without a title or author cannot be scored
    pub fn is_scorable(&self) -> bool {
        !self.title.trim().is_empty() && !self.author.trim().is_empty()
    }
}

impl From<CandidateSeed> for CandidateBook {
    fn from(seed: CandidateSeed) -> Self {
        Self {
            title: seed.title,
            author: seed.author,
            source: seed.source,
            external_rating: seed.external_rating,
            genre: seed.genre.filter(|g| !g.trim().is_empty()),
            cover_url: seed.cover_url,
            recommendation_score: 0.0,
            score_breakdown: ScoreBreakdown::default(),
            reasoning: String::new(),
        }
    }
}
