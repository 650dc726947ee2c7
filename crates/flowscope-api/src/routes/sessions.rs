//! Session feed endpoints
//!
//! These map the feed contract onto REST: GET returns the current
//! accumulation (fetching the first page for a feed that has none yet),
//! POST /next loads exactly one more page, POST /reset invalidates the
//! feed. Page loads happen only on these explicit calls; nothing refetches
//! on its own.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use session_feed::FeedPhase;

use crate::dto::{ApiError, FeedResponse, ResetResponse, SessionFilterParams};
use crate::AppState;

/// Create session routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/next", post(next_page))
        .route("/reset", post(reset))
}

/// GET /sessions - Current accumulation for a filter.
///
/// A feed that has never fetched loads its first page here; otherwise the
/// snapshot is returned as-is.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<SessionFilterParams>,
) -> Result<Json<FeedResponse>, (StatusCode, Json<ApiError>)> {
    let cache = state.feed_cache().await.ok_or_else(index_unavailable)?;
    let feed = cache.get_or_create(&params.into_filter()).await;

    let snap = feed.snapshot().await;
    let snap = if snap.phase == FeedPhase::Idle {
        feed.fetch_next_page().await
    } else {
        snap
    };

    Ok(Json(FeedResponse::from(snap)))
}

/// POST /sessions/next - Load one more page for a filter.
///
/// No-op while a fetch for this feed is outstanding or the feed is
/// exhausted; the current snapshot is returned either way.
pub async fn next_page(
    State(state): State<AppState>,
    Json(params): Json<SessionFilterParams>,
) -> Result<Json<FeedResponse>, (StatusCode, Json<ApiError>)> {
    let cache = state.feed_cache().await.ok_or_else(index_unavailable)?;
    let feed = cache.get_or_create(&params.into_filter()).await;

    Ok(Json(FeedResponse::from(feed.fetch_next_page().await)))
}

/// POST /sessions/reset - Drop the accumulation for a filter
pub async fn reset(
    State(state): State<AppState>,
    Json(params): Json<SessionFilterParams>,
) -> Result<Json<ResetResponse>, (StatusCode, Json<ApiError>)> {
    let cache = state.feed_cache().await.ok_or_else(index_unavailable)?;
    cache.invalidate(&params.into_filter()).await;

    Ok(Json(ResetResponse { invalidated: true }))
}

fn index_unavailable() -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ApiError::index_unavailable()),
    )
}
