use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{error::AppResult, models::EnrichedBook, routes::AppState};

/// Read books, most recent first
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<EnrichedBook>>> {
    let books = state.store.list_books().await?;
    Ok(Json(books))
}

/// Confirms the store is reachable and reports how many books it holds
pub async fn db_health(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let count = state.store.count_books().await?;
    Ok(Json(json!({ "status": "ok", "books": count })))
}
