use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

pub async fn health(State(_state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn get_status(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let stored_specs = state.store.count().await.unwrap_or(0);
    let embedding_reachable = state.embedder.health_check().await.unwrap_or(false);
    let generation_reachable = state.generator.health_check().await.unwrap_or(false);

    Ok(Json(json!({
        "stored_specs": stored_specs,
        "embedding_provider": state.embedder.name(),
        "embedding_reachable": embedding_reachable,
        "generation_provider": state.generator.name(),
        "generation_reachable": generation_reachable,
        "confidence_threshold": state.config.confidence_threshold,
        "embedding_dimension": state.config.embedding_dimension,
        "uptime_secs": (Utc::now() - state.started_at).num_seconds(),
    })))
}
