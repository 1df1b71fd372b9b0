use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    db::RecommendationStore,
    middleware::{make_span_with_request_id, request_id_middleware},
    services::RecommendationPipeline,
};

pub mod books;
pub mod recommendations;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecommendationStore>,
    pub pipeline: RecommendationPipeline,
}

impl AppState {
    pub fn new(store: Arc<dyn RecommendationStore>, pipeline: RecommendationPipeline) -> Self {
        Self { store, pipeline }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health/db", get(books::db_health))
        .route("/books", get(books::list))
        .route("/recommendations/today", get(recommendations::today))
        .route("/recommendations/latest", get(recommendations::latest))
        .route("/recommendations/run", post(recommendations::run))
        .route("/recommendations/preview", post(recommendations::preview))
}

async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
