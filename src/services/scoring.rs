//! Scoring Engine
//!
//! Scores a [`CandidateBook`] against a [`UserProfile`] with six weighted
//! factors. Every factor lands in `[0, 1]` and the weights sum to `1.0`, so the
//! final score is in `[0, 1]` as well. Missing or malformed candidate fields
//! fall back to neutral values; scoring never fails.
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::{split_genres, CandidateBook, ScoreBreakdown, UserProfile};

/// Sub-score used when a factor has no data to work with
pub const NEUTRAL_SCORE: f64 = 0.5;
/// Assumed crowd rating for candidates without one
pub const DEFAULT_EXTERNAL_RATING: f64 = 3.5;

const MAX_RATING: f64 = 5.0;
const MIN_PREDICTED_RATING: f64 = 1.0;
const FAVORITE_AUTHOR_SCORE: f64 = 1.0;
const OTHER_AUTHOR_SCORE: f64 = 0.3;
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoringWeights {
    pub goodreads_quality: f64,
    pub user_taste_alignment: f64,
    pub favorite_author_boost: f64,
    pub genre_preference: f64,
    pub source_reliability: f64,
    pub popularity_balance: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            goodreads_quality: 0.25,
            user_taste_alignment: 0.20,
            favorite_author_boost: 0.20,
            genre_preference: 0.15,
            source_reliability: 0.10,
            popularity_balance: 0.10,
        }
    }
}

impl ScoringWeights {
    fn as_array(&self) -> [f64; 6] {
        [
            self.goodreads_quality,
            self.user_taste_alignment,
            self.favorite_author_boost,
            self.genre_preference,
            self.source_reliability,
            self.popularity_balance,
        ]
    }

    /// Weights must be finite, non-negative and sum to 1.0
    pub fn validate(self) -> AppResult<Self> {
        let weights = self.as_array();
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(AppError::Configuration(format!(
                "Scoring weights must be finite and non-negative: {:?}",
                self
            )));
        }

        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(AppError::Configuration(format!(
                "Scoring weights must sum to 1.0, got {:.4}",
                sum
            )));
        }

        Ok(self)
    }

    /// Weighted sum of a breakdown
    pub fn combine(&self, breakdown: &ScoreBreakdown) -> f64 {
        let total = self.goodreads_quality * breakdown.goodreads_quality
            + self.user_taste_alignment * breakdown.user_taste_alignment
            + self.favorite_author_boost * breakdown.favorite_author_boost
            + self.genre_preference * breakdown.genre_preference
            + self.source_reliability * breakdown.source_reliability
            + self.popularity_balance * breakdown.popularity_balance;
        total.clamp(0.0, 1.0)
    }
}

/// Pure, deterministic candidate scorer
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine {
    weights: ScoringWeights,
}

impl ScoringEngine {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Computes the sub-scores for a candidate without touching it
    pub fn breakdown(&self, candidate: &CandidateBook, profile: &UserProfile) -> ScoreBreakdown {
        let external = effective_external_rating(candidate.external_rating);

        ScoreBreakdown {
            goodreads_quality: (external / MAX_RATING).min(1.0),
            user_taste_alignment: taste_alignment(external, profile.rating_bias),
            favorite_author_boost: if profile.is_favorite_author(&candidate.author) {
                FAVORITE_AUTHOR_SCORE
            } else {
                OTHER_AUTHOR_SCORE
            },
            genre_preference: genre_preference(candidate.genre.as_deref(), profile),
            source_reliability: profile
                .matching_source(&candidate.source)
                .map(|perf| (perf.average_rating / MAX_RATING).clamp(0.0, 1.0))
                .unwrap_or(NEUTRAL_SCORE),
            popularity_balance: NEUTRAL_SCORE,
        }
    }

    /// Fills in score, breakdown and reasoning on the candidate
    pub fn score(&self, candidate: &mut CandidateBook, profile: &UserProfile) {
        let breakdown = self.breakdown(candidate, profile);
        candidate.recommendation_score = self.weights.combine(&breakdown);
        candidate.score_breakdown = breakdown;
        candidate.reasoning = reasoning(candidate, profile);
    }
}

/// Ratings outside `(0, 5]` are unknown
fn effective_external_rating(rating: f64) -> f64 {
    if rating.is_finite() && rating > 0.0 && rating <= MAX_RATING {
        rating
    } else {
        DEFAULT_EXTERNAL_RATING
    }
}

fn taste_alignment(external: f64, rating_bias: f64) -> f64 {
    let bias = if rating_bias.is_finite() { rating_bias } else { 0.0 };
    let predicted = (external + bias).clamp(MIN_PREDICTED_RATING, MAX_RATING);
    predicted / MAX_RATING
}

/// Mean of profile averages over the candidate's genres, neutral when none match
fn genre_preference(genre: Option<&str>, profile: &UserProfile) -> f64 {
    let Some(genre) = genre else {
        return NEUTRAL_SCORE;
    };

    let matches: Vec<f64> = split_genres(genre)
        .iter()
        .filter_map(|g| profile.genre_average(g))
        .collect();

    if matches.is_empty() {
        return NEUTRAL_SCORE;
    }

    let mean = matches.iter().sum::<f64>() / matches.len() as f64;
    (mean / MAX_RATING).clamp(0.0, 1.0)
}

fn reasoning(candidate: &CandidateBook, profile: &UserProfile) -> String {
    if profile.is_favorite_author(&candidate.author) {
        format!(
            "Another book by {}, one of your favorite authors",
            candidate.author.trim()
        )
    } else {
        "A new discovery picked to match your reading history".to_string()
    }
}
