use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{CandidateBook, ScoreBreakdown, UserProfile};

/// Result record for one scored book
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResult {
    pub title: String,
    pub author: String,
    pub source: String,
    pub external_rating: f64,
    pub recommendation_score: f64,
    pub score_breakdown: ScoreBreakdown,
    pub reasoning: String,
    pub cover_url: Option<String>,
}

impl From<CandidateBook> for RecommendationResult {
    fn from(book: CandidateBook) -> Self {
        Self {
            title: book.title,
            author: book.author,
            source: book.source,
            external_rating: book.external_rating,
            recommendation_score: book.recommendation_score,
            score_breakdown: book.score_breakdown,
            reasoning: book.reasoning,
            cover_url: book.cover_url,
        }
    }
}

/// Top pick plus up to three runner-ups
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub top: RecommendationResult,
    pub alternatives: Vec<RecommendationResult>,
}

/// Terminal outcome of the selector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecommendationOutcome {
    Recommended(Recommendation),
    NoRecommendation { reason: String },
}

impl RecommendationOutcome {
    pub fn recommendation(&self) -> Option<&Recommendation> {
        match self {
            RecommendationOutcome::Recommended(rec) => Some(rec),
            RecommendationOutcome::NoRecommendation { .. } => None,
        }
    }
}

/// Row of `daily_recommendations`, one per calendar date
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct DailyRecommendation {
    pub date: NaiveDate,
    pub title: String,
    pub author: String,
    pub source: String,
    pub goodreads_rating: f64,
    pub recommendation_score: f64,
    pub reasoning: String,
    pub status: String,
    pub cover_url: Option<String>,
    pub score_breakdown: sqlx::types::Json<ScoreBreakdown>,
    pub alternatives: sqlx::types::Json<Vec<RecommendationResult>>,
    pub created_at: DateTime<Utc>,
}

pub const STATUS_NEW: &str = "new";

impl DailyRecommendation {
    pub fn from_recommendation(date: NaiveDate, rec: &Recommendation) -> Self {
        Self {
            date,
            title: rec.top.title.clone(),
            author: rec.top.author.clone(),
            source: rec.top.source.clone(),
            goodreads_rating: rec.top.external_rating,
            recommendation_score: rec.top.recommendation_score,
            reasoning: rec.top.reasoning.clone(),
            status: STATUS_NEW.to_string(),
            cover_url: rec.top.cover_url.clone(),
            score_breakdown: sqlx::types::Json(rec.top.score_breakdown),
            alternatives: sqlx::types::Json(rec.alternatives.clone()),
            created_at: Utc::now(),
        }
    }
}

/// Summary of one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub date: NaiveDate,
    pub rows_read: usize,
    pub records_used: usize,
    pub records_skipped: usize,
    pub records_enriched: usize,
    pub candidates_considered: usize,
    pub profile: UserProfile,
    pub outcome: RecommendationOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(title: &str) -> RecommendationResult {
        RecommendationResult {
            title: title.to_string(),
            author: "Ted Chiang".to_string(),
            source: "Hugo Awards".to_string(),
            external_rating: 4.3,
            recommendation_score: 0.71,
            score_breakdown: ScoreBreakdown::default(),
            reasoning: "A new discovery".to_string(),
            cover_url: None,
        }
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome = RecommendationOutcome::NoRecommendation {
            reason: "empty pool".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "no_recommendation");
        assert_eq!(json["reason"], "empty pool");
        assert!(outcome.recommendation().is_none());
    }

    #[test]
    fn test_daily_recommendation_from_top_pick() {
        let rec = Recommendation {
            top: result("Exhalation"),
            alternatives: vec![result("Stories of Your Life")],
        };
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let daily = DailyRecommendation::from_recommendation(date, &rec);
        assert_eq!(daily.title, "Exhalation");
        assert_eq!(daily.goodreads_rating, 4.3);
        assert_eq!(daily.status, STATUS_NEW);
        assert_eq!(daily.alternatives.0.len(), 1);
    }
}
