use std::sync::Arc;

use chrono::NaiveDate;

use crate::{
    db::RecommendationStore,
    error::AppResult,
    models::{
        BookRecord, CandidateBook, CandidateSeed, DailyRecommendation, EnrichedBook,
        PipelineReport, RawRow, RecommendationOutcome, UserProfile,
    },
    services::{
        enrichment,
        normalizer::normalize_rows,
        profile::build_profile,
        providers::{CandidateProvider, MetadataProvider},
        scoring::ScoringEngine,
        selector::select_recommendation,
        sources::RecordSource,
    },
};

/// Report plus the normalized books to persist
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub report: PipelineReport,
    pub books: Vec<EnrichedBook>,
}

/// Builds the profile and selects a pick from already-loaded records
fn score_pool(
    records: &[BookRecord],
    seeds: Vec<CandidateSeed>,
    engine: &ScoringEngine,
) -> (UserProfile, RecommendationOutcome, usize) {
    let profile = build_profile(records);
    let candidates: Vec<CandidateBook> = seeds.into_iter().map(CandidateBook::from).collect();
    let considered = candidates.len();
    let outcome = select_recommendation(&profile, candidates, engine);
    (profile, outcome, considered)
}

/// Runs normalizer → profile → selector on in-memory input, without enrichment or persistence
pub fn preview(
    rows: &[RawRow],
    seeds: Vec<CandidateSeed>,
    engine: &ScoringEngine,
    date: NaiveDate,
) -> PipelineReport {
    let (records, skipped) = normalize_rows(rows);
    let (profile, outcome, considered) = score_pool(&records, seeds, engine);

    PipelineReport {
        date,
        rows_read: rows.len(),
        records_used: records.len(),
        records_skipped: skipped,
        records_enriched: 0,
        candidates_considered: considered,
        profile,
        outcome,
    }
}

/// One recommendation run over injected collaborators
///
/// Each run is an isolated batch: load rows, normalize, optionally enrich,
/// build the profile, score the candidate pool and select.
#[derive(Clone)]
pub struct RecommendationPipeline {
    records: Arc<dyn RecordSource>,
    candidates: Arc<dyn CandidateProvider>,
    metadata: Option<Arc<dyn MetadataProvider>>,
    engine: ScoringEngine,
}

impl RecommendationPipeline {
    pub fn new(
        records: Arc<dyn RecordSource>,
        candidates: Arc<dyn CandidateProvider>,
        engine: ScoringEngine,
    ) -> Self {
        Self {
            records,
            candidates,
            metadata: None,
            engine,
        }
    }

    pub fn with_metadata(mut self, provider: Arc<dyn MetadataProvider>) -> Self {
        self.metadata = Some(provider);
        self
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    pub async fn run(&self, date: NaiveDate) -> AppResult<PipelineRun> {
        tracing::info!(
            date = %date,
            records = self.records.name(),
            candidates = self.candidates.name(),
            "Starting recommendation run"
        );

        let rows = self.records.fetch_rows().await?;
        let (records, skipped) = normalize_rows(&rows);

        let mut seeds = self.candidates.fetch_candidates().await?;

        let (records, enriched) = match &self.metadata {
            Some(provider) => {
                let (records, enriched) =
                    enrichment::enrich_records(provider.clone(), records).await;
                seeds = enrichment::enrich_candidates(provider.clone(), seeds).await;
                (records, enriched)
            }
            None => (records, 0),
        };

        let (profile, outcome, considered) = score_pool(&records, seeds, &self.engine);

        match &outcome {
            RecommendationOutcome::Recommended(rec) => tracing::info!(
                title = %rec.top.title,
                author = %rec.top.author,
                score = rec.top.recommendation_score,
                alternatives = rec.alternatives.len(),
                "Selected next book"
            ),
            RecommendationOutcome::NoRecommendation { reason } => {
                tracing::warn!(reason = %reason, "No recommendation produced")
            }
        }

        let books = records.iter().map(EnrichedBook::from).collect();

        Ok(PipelineRun {
            report: PipelineReport {
                date,
                rows_read: rows.len(),
                records_used: records.len(),
                records_skipped: skipped,
                records_enriched: enriched,
                candidates_considered: considered,
                profile,
                outcome,
            },
            books,
        })
    }

    /// Runs and persists: read books are upserted, and the pick is stored for `date`
    pub async fn run_and_store(
        &self,
        store: &dyn RecommendationStore,
        date: NaiveDate,
    ) -> AppResult<PipelineReport> {
        let run = self.run(date).await?;

        store.save_books(&run.books).await?;

        if let Some(rec) = run.report.outcome.recommendation() {
            store
                .upsert_daily(&DailyRecommendation::from_recommendation(date, rec))
                .await?;
        }

        Ok(run.report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::MockRecommendationStore;
    use crate::error::AppError;
    use crate::services::providers::{MockCandidateProvider, StaticCandidatePool};
    use crate::services::sources::{InMemorySource, MockRecordSource};

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn history() -> Vec<RawRow> {
        vec![
            row(&[
                ("Title", "Normal People"),
                ("Author", "Sally Rooney"),
                ("Rating", "5"),
                ("Goodreads Rating", "3.85"),
                ("Genre", "literary fiction"),
            ]),
            row(&[
                ("Title", "Beautiful World, Where Are You"),
                ("Author", "Sally Rooney"),
                ("Rating", "4"),
                ("Goodreads Rating", "3.6"),
                ("Genre", "literary fiction"),
            ]),
            row(&[("Title", ""), ("Rating", "5")]),
        ]
    }

    fn seed(title: &str, author: &str, rating: f64) -> CandidateSeed {
        CandidateSeed {
            title: title.to_string(),
            author: author.to_string(),
            source: String::new(),
            external_rating: rating,
            genre: None,
            cover_url: None,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn test_preview_prefers_favorite_author() {
        let report = preview(
            &history(),
            vec![
                seed("Lessons in Chemistry", "Bonnie Garmus", 4.3),
                seed("Intermezzo", "Sally Rooney", 3.9),
                seed("Normal People", "sally rooney", 3.85),
            ],
            &ScoringEngine::default(),
            date(),
        );

        assert_eq!(report.rows_read, 3);
        assert_eq!(report.records_used, 2);
        assert_eq!(report.records_skipped, 1);
        assert_eq!(report.candidates_considered, 3);

        let rec = report.outcome.recommendation().unwrap();
        assert_eq!(rec.top.title, "Intermezzo");
        assert_eq!(rec.alternatives.len(), 1);
        assert_eq!(rec.alternatives[0].title, "Lessons in Chemistry");
    }

    #[test]
    fn test_preview_with_no_input() {
        let report = preview(&[], vec![], &ScoringEngine::default(), date());
        assert!(report.outcome.recommendation().is_none());
        assert_eq!(report.profile.rated_count, 0);
    }

    #[tokio::test]
    async fn test_run_stores_books_and_pick() {
        let pipeline = RecommendationPipeline::new(
            Arc::new(InMemorySource::new(history())),
            Arc::new(StaticCandidatePool::new(vec![seed("Intermezzo", "Sally Rooney", 3.9)])),
            ScoringEngine::default(),
        );

        let mut store = MockRecommendationStore::new();
        store
            .expect_save_books()
            .withf(|books| books.len() == 2)
            .times(1)
            .returning(|books| Ok(books.len()));
        store
            .expect_upsert_daily()
            .withf(|rec| rec.title == "Intermezzo" && rec.status == "new")
            .times(1)
            .returning(|_| Ok(()));

        let report = pipeline.run_and_store(&store, date()).await.unwrap();
        assert!(report.outcome.recommendation().is_some());
    }

    #[tokio::test]
    async fn test_empty_pool_stores_books_only() {
        let pipeline = RecommendationPipeline::new(
            Arc::new(InMemorySource::new(history())),
            Arc::new(StaticCandidatePool::new(vec![])),
            ScoringEngine::default(),
        );

        let mut store = MockRecommendationStore::new();
        store.expect_save_books().times(1).returning(|_| Ok(2));
        store.expect_upsert_daily().never();

        let report = pipeline.run_and_store(&store, date()).await.unwrap();
        assert!(matches!(
            report.outcome,
            RecommendationOutcome::NoRecommendation { .. }
        ));
    }

    #[tokio::test]
    async fn test_source_failure_propagates() {
        let mut source = MockRecordSource::new();
        source
            .expect_fetch_rows()
            .returning(|| Err(AppError::ExternalApi("sheets returned 403".to_string())));
        source.expect_name().return_const("mock");

        let mut candidates = MockCandidateProvider::new();
        candidates.expect_fetch_candidates().never();
        candidates.expect_name().return_const("mock");

        let pipeline = RecommendationPipeline::new(
            Arc::new(source),
            Arc::new(candidates),
            ScoringEngine::default(),
        );

        assert!(matches!(
            pipeline.run(date()).await,
            Err(AppError::ExternalApi(_))
        ));
    }
}
