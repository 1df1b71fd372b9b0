use axum::{extract::State, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    models::{deserialize_rows, CandidateSeed, DailyRecommendation, PipelineReport, RawRow},
    routes::AppState,
    services::pipeline,
};

/// Status reported when nothing has been stored for today
pub const STATUS_NONE: &str = "none";

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    #[serde(default, deserialize_with = "deserialize_rows")]
    pub rows: Vec<RawRow>,
    #[serde(default)]
    pub candidates: Vec<CandidateSeed>,
}

/// Today's pick, or a placeholder telling the caller to run the pipeline
pub async fn today(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let date = Utc::now().date_naive();

    match state.store.recommendation_for(date).await? {
        Some(rec) => Ok(Json(serde_json::to_value(rec).map_err(|e| {
            AppError::Internal(format!("Failed to serialize recommendation: {}", e))
        })?)),
        None => Ok(Json(json!({
            "date": date,
            "title": null,
            "author": null,
            "status": STATUS_NONE,
            "reasoning": "No recommendation for today yet. Run the pipeline to generate one.",
        }))),
    }
}

pub async fn latest(State(state): State<AppState>) -> AppResult<Json<DailyRecommendation>> {
    state
        .store
        .latest_recommendation()
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No recommendations found".to_string()))
}

/// Runs the full pipeline for today and persists the result
pub async fn run(State(state): State<AppState>) -> AppResult<Json<PipelineReport>> {
    let report = state
        .pipeline
        .run_and_store(state.store.as_ref(), Utc::now().date_naive())
        .await?;
    Ok(Json(report))
}

/// Scores posted rows and candidates without touching the store
pub async fn preview(
    State(state): State<AppState>,
    Json(request): Json<PreviewRequest>,
) -> AppResult<Json<PipelineReport>> {
    if request.rows.is_empty() && request.candidates.is_empty() {
        return Err(AppError::InvalidInput(
            "Provide at least one row or candidate".to_string(),
        ));
    }

    let report = pipeline::preview(
        &request.rows,
        request.candidates,
        state.pipeline.engine(),
        Utc::now().date_naive(),
    );
    Ok(Json(report))
}
