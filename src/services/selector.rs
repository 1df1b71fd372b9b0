use crate::models::{
    CandidateBook, Recommendation, RecommendationOutcome, RecommendationResult, UserProfile,
};
use crate::services::scoring::ScoringEngine;

/// Runner-ups returned alongside the top pick
pub const MAX_ALTERNATIVES: usize = 3;

/// Ranks candidates for a profile and picks the next book to read
///
/// Already-read books are always excluded. Candidates without a title or
/// author are dropped before scoring. Equal scores keep their input order.
pub fn select_recommendation(
    profile: &UserProfile,
    candidates: Vec<CandidateBook>,
    engine: &ScoringEngine,
) -> RecommendationOutcome {
    let total = candidates.len();
    let mut already_read = 0;
    let mut malformed = 0;

    let mut scored: Vec<CandidateBook> = candidates
        .into_iter()
        .filter(|candidate| {
            if profile.has_read(&candidate.identity_key()) {
                already_read += 1;
                return false;
            }
            if !candidate.is_scorable() {
                malformed += 1;
                tracing::warn!(
                    title = %candidate.title,
                    author = %candidate.author,
                    "Dropping candidate without title or author"
                );
                return false;
            }
            true
        })
        .map(|mut candidate| {
            engine.score(&mut candidate, profile);
            candidate
        })
        .collect();

    // Stable sort: ties keep input order
    scored.sort_by(|a, b| b.recommendation_score.total_cmp(&a.recommendation_score));

    tracing::info!(
        total,
        already_read,
        malformed,
        scored = scored.len(),
        "Scored candidate pool"
    );

    let mut ranked = scored.into_iter().map(RecommendationResult::from);
    match ranked.next() {
        Some(top) => RecommendationOutcome::Recommended(Recommendation {
            top,
            alternatives: ranked.take(MAX_ALTERNATIVES).collect(),
        }),
        None => RecommendationOutcome::NoRecommendation {
            reason: if total == 0 {
                "Candidate pool is empty".to_string()
            } else {
                format!(
                    "No unread candidates left ({} already read, {} malformed)",
                    already_read, malformed
                )
            },
        },
    }
}
