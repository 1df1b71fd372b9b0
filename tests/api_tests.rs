use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use tower::ServiceExt;

use nextread_api::{
    db::RecommendationStore,
    error::AppResult,
    models::{CandidateSeed, DailyRecommendation, EnrichedBook, RawRow},
    routes::{create_router, AppState},
    services::{
        providers::StaticCandidatePool, sources::InMemorySource, RecommendationPipeline,
        ScoringEngine,
    },
};

/// Store kept in memory so the routes can be exercised without PostgreSQL
#[derive(Default)]
struct MemoryStore {
    books: Mutex<BTreeMap<String, EnrichedBook>>,
    daily: Mutex<BTreeMap<NaiveDate, DailyRecommendation>>,
}

#[async_trait::async_trait]
impl RecommendationStore for MemoryStore {
    async fn save_books(&self, books: &[EnrichedBook]) -> AppResult<usize> {
        let mut stored = self.books.lock().unwrap();
        for book in books {
            stored.insert(book.identity_key.clone(), book.clone());
        }
        Ok(books.len())
    }

    async fn list_books(&self) -> AppResult<Vec<EnrichedBook>> {
        let mut books: Vec<_> = self.books.lock().unwrap().values().cloned().collect();
        books.sort_by(|a, b| {
            b.year_read
                .cmp(&a.year_read)
                .then_with(|| a.title.cmp(&b.title))
        });
        Ok(books)
    }

    async fn count_books(&self) -> AppResult<i64> {
        Ok(self.books.lock().unwrap().len() as i64)
    }

    async fn upsert_daily(&self, recommendation: &DailyRecommendation) -> AppResult<()> {
        self.daily
            .lock()
            .unwrap()
            .insert(recommendation.date, recommendation.clone());
        Ok(())
    }

    async fn recommendation_for(&self, date: NaiveDate) -> AppResult<Option<DailyRecommendation>> {
        Ok(self.daily.lock().unwrap().get(&date).cloned())
    }

    async fn latest_recommendation(&self) -> AppResult<Option<DailyRecommendation>> {
        Ok(self.daily.lock().unwrap().values().next_back().cloned())
    }
}

fn row(pairs: &[(&str, &str)]) -> RawRow {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn reading_log() -> Vec<RawRow> {
    vec![
        row(&[
            ("Title", "Normal People"),
            ("Author", "Sally Rooney"),
            ("Rating", "5"),
            ("Goodreads Rating", "3.85"),
            ("Genre", "literary fiction"),
            ("Year Read", "2021"),
        ]),
        row(&[
            ("Title", "Conversations with Friends"),
            ("Author", "Sally Rooney"),
            ("Rating", "4"),
            ("Goodreads Rating", "3.75"),
            ("Genre", "literary fiction"),
            ("Year Read", "2021"),
        ]),
        row(&[
            ("Title", "Project Hail Mary"),
            ("Author", "Andy Weir"),
            ("Rating", "3 - liked it"),
            ("Goodreads Rating", "4.5"),
            ("Genre", "science fiction"),
            ("Year Read", "2023"),
        ]),
    ]
}

fn seed(title: &str, author: &str, rating: f64, genre: &str) -> CandidateSeed {
    CandidateSeed {
        title: title.to_string(),
        author: author.to_string(),
        source: "Staff Picks".to_string(),
        external_rating: rating,
        genre: Some(genre.to_string()),
        cover_url: None,
    }
}

fn create_test_app(seeds: Vec<CandidateSeed>) -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let pipeline = RecommendationPipeline::new(
        Arc::new(InMemorySource::new(reading_log())),
        Arc::new(StaticCandidatePool::new(seeds)),
        ScoringEngine::default(),
    );
    let app = create_router(AppState::new(store.clone(), pipeline));
    (app, store)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = create_test_app(vec![]);
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let (app, _) = create_test_app(vec![]);
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "trace-42")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "trace-42");
}

#[tokio::test]
async fn test_today_placeholder_before_first_run() {
    let (app, _) = create_test_app(vec![]);
    let (status, body) = send(&app, get("/api/v1/recommendations/today")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "none");
    assert!(body["title"].is_null());
}

#[tokio::test]
async fn test_latest_is_not_found_before_first_run() {
    let (app, _) = create_test_app(vec![]);
    let (status, body) = send(&app, get("/api/v1/recommendations/latest")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("No recommendations"));
}

#[tokio::test]
async fn test_run_persists_pick_and_books() {
    let (app, store) = create_test_app(vec![
        seed("Intermezzo", "Sally Rooney", 3.9, "literary fiction"),
        seed("The Martian", "Andy Weir", 4.4, "science fiction"),
        seed("Normal People", "SALLY ROONEY", 3.85, "literary fiction"),
    ]);

    let (status, report) = send(&app, post_json("/api/v1/recommendations/run", &json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["records_used"], 3);
    assert_eq!(report["candidates_considered"], 3);
    assert_eq!(report["outcome"]["status"], "recommended");
    assert_eq!(report["outcome"]["top"]["title"], "Intermezzo");
    assert_eq!(report["outcome"]["alternatives"].as_array().unwrap().len(), 1);

    assert_eq!(store.count_books().await.unwrap(), 3);

    let (status, today) = send(&app, get("/api/v1/recommendations/today")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(today["title"], "Intermezzo");
    assert_eq!(today["status"], "new");

    let (status, latest) = send(&app, get("/api/v1/recommendations/latest")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(latest["title"], "Intermezzo");
    assert_eq!(latest["alternatives"][0]["title"], "The Martian");
}

#[tokio::test]
async fn test_run_with_empty_pool_stores_nothing() {
    let (app, store) = create_test_app(vec![]);

    let (status, report) = send(&app, post_json("/api/v1/recommendations/run", &json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["outcome"]["status"], "no_recommendation");
    assert!(store.latest_recommendation().await.unwrap().is_none());
}

#[tokio::test]
async fn test_books_are_listed_most_recent_first() {
    let (app, _) = create_test_app(vec![]);
    send(&app, post_json("/api/v1/recommendations/run", &json!({}))).await;

    let (status, body) = send(&app, get("/api/v1/books")).await;
    assert_eq!(status, StatusCode::OK);

    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|book| book["title"].as_str().unwrap())
        .collect();
    assert_eq!(
        titles,
        vec!["Project Hail Mary", "Conversations with Friends", "Normal People"]
    );

    let (status, health) = send(&app, get("/api/v1/health/db")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["books"], 3);
}

#[tokio::test]
async fn test_preview_scores_json_typed_cells_without_persisting() {
    let (app, store) = create_test_app(vec![]);

    let body = json!({
        "rows": [
            { "Title": "Dune", "Author": "Frank Herbert", "Rating": 5, "Goodreads Rating": 4.3, "Genre": null },
            { "Title": "", "Rating": "4" }
        ],
        "candidates": [
            { "title": "Dune Messiah", "author": "Frank Herbert", "external_rating": 3.9 },
            { "title": "Dune", "author": "frank herbert", "external_rating": 4.3 }
        ]
    });

    let (status, report) = send(&app, post_json("/api/v1/recommendations/preview", &body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["records_skipped"], 1);
    assert_eq!(report["outcome"]["top"]["title"], "Dune Messiah");
    assert_eq!(
        report["outcome"]["top"]["score_breakdown"]["favorite_author_boost"],
        1.0
    );

    assert_eq!(store.count_books().await.unwrap(), 0);
}

#[tokio::test]
async fn test_preview_rejects_empty_body() {
    let (app, _) = create_test_app(vec![]);
    let (status, _) = send(
        &app,
        post_json("/api/v1/recommendations/preview", &json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
