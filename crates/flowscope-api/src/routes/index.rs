//! Index status and configuration endpoints

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use flowscope_core::IndexConfig;
use session_index_client::status::detect_status;
use session_index_client::IndexHealth;

use crate::dto::{ApiError, IndexConfigRequest, IndexStatusResponse};
use crate::AppState;

/// Create index routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(get_status))
        .route("/configure", post(configure))
}

/// GET /index/status - Probe the search backend
pub async fn get_status(
    State(state): State<AppState>,
) -> Result<Json<IndexStatusResponse>, (StatusCode, Json<ApiError>)> {
    let config = state.config().await;

    match state.index_client().await {
        Some(client) => {
            let status = detect_status(&client).await;
            Ok(Json(IndexStatusResponse {
                connected: status.is_online,
                url: config.index.url,
                index: config.index.index,
                cluster_status: status.cluster_status,
                health: status.health.as_str().to_string(),
                doc_count: status.doc_count,
                page_size: config.index.page_size,
            }))
        }
        None => Ok(Json(IndexStatusResponse {
            connected: false,
            url: config.index.url,
            index: config.index.index,
            cluster_status: None,
            health: IndexHealth::Unreachable.as_str().to_string(),
            doc_count: None,
            page_size: config.index.page_size,
        })),
    }
}

/// POST /index/configure - Update index configuration
pub async fn configure(
    State(state): State<AppState>,
    Json(request): Json<IndexConfigRequest>,
) -> Result<Json<IndexStatusResponse>, (StatusCode, Json<ApiError>)> {
    let defaults = IndexConfig::default();
    let index_config = IndexConfig {
        url: request.url,
        api_key: request.api_key,
        index: request.index.unwrap_or(defaults.index),
        page_size: request.page_size.unwrap_or(defaults.page_size),
    };
    state.set_index_config(index_config).await;

    get_status(State(state)).await
}
