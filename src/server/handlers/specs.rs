use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::spec::{BatterySpec, Source, SpecQuery};
use crate::state::AppState;

/// GET /api/specs/resolve?make=..&model=..&year=..
pub async fn resolve_spec(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SpecQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let spec = state.oracle.resolve(&query).await?;
    Ok(Json(spec))
}

#[derive(Debug, Deserialize)]
pub struct AddSpecRequest {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub capacity_kwh: f64,
    pub power_kw: f64,
    pub chemistry: String,
}

/// POST /api/specs — manual seeding of known specifications.
///
/// The stored embedding comes from the same canonical text the resolver
/// embeds at query time.
pub async fn add_spec(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddSpecRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let query = SpecQuery::new(&req.make, &req.model, req.year);
    query.validate()?;

    if req.capacity_kwh <= 0.0 {
        return Err(ApiError::BadRequest(
            "capacity_kwh must be positive".to_string(),
        ));
    }
    if req.power_kw <= 0.0 {
        return Err(ApiError::BadRequest("power_kw must be positive".to_string()));
    }
    if req.chemistry.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "chemistry must not be empty".to_string(),
        ));
    }

    let spec = BatterySpec {
        make: req.make,
        model: req.model,
        year: req.year,
        capacity_kwh: req.capacity_kwh,
        power_kw: req.power_kw,
        chemistry: req.chemistry.trim().to_string(),
        confidence: 1.0,
        source: Source::Database,
    };

    let vector = state.embedder.embed(&query.embedding_text()).await?;
    state.store.upsert(&spec, &vector).await?;

    tracing::info!("stored spec for {}", query);
    Ok(Json(spec))
}

/// GET /api/specs/count
pub async fn count_specs(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let count = state.store.count().await?;
    Ok(Json(json!({ "count": count })))
}
