//! API liveness endpoint

use axum::extract::State;
use axum::Json;

use crate::dto::HealthResponse;
use crate::AppState;

/// GET /health - liveness of the API process itself.
/// Says nothing about the search index; that is `/index/status`.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::new(state.uptime()))
}
