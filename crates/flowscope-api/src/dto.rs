//! Data Transfer Objects for API requests and responses

use std::time::Duration;

use flowscope_core::{Address, Session, SessionFilter, SessionId};
use serde::{Deserialize, Serialize};
use session_feed::FeedSnapshot;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

impl HealthResponse {
    pub fn new(uptime: Duration) -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: uptime.as_secs(),
        }
    }
}

/// Index status response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStatusResponse {
    pub connected: bool,
    pub url: String,
    pub index: String,
    pub cluster_status: Option<String>,
    pub health: String,
    pub doc_count: Option<u64>,
    pub page_size: usize,
}

/// Index configuration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfigRequest {
    pub url: String,
    #[serde(default)]
    pub api_key: String,
    /// Index name; the default session index when omitted
    pub index: Option<String>,
    /// Sessions per page; the default when omitted
    pub page_size: Option<usize>,
}

/// Filter parameters, accepted both as query string and JSON body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionFilterParams {
    pub session_id: Option<String>,
    pub address: Option<String>,
    pub since: Option<String>,
}

impl SessionFilterParams {
    /// Values are forwarded as-is; malformed filters are backend-defined
    pub fn into_filter(self) -> SessionFilter {
        SessionFilter {
            session_id: self.session_id.map(SessionId::new),
            address: self.address.map(Address::new),
            since: self.since,
        }
    }
}

/// Feed snapshot response, the incremental-loading contract
#[derive(Debug, Clone, Serialize)]
pub struct FeedResponse {
    /// All accumulated sessions in page order
    pub sessions: Vec<Session>,
    /// Number of pages retrieved so far
    pub page_count: usize,
    pub total_hits: Option<u64>,
    pub phase: String,
    pub is_loading: bool,
    pub is_fetching_next_page: bool,
    pub exhausted: bool,
    /// Message of the last failed fetch; accumulated sessions stay valid
    pub error: Option<String>,
}

impl From<FeedSnapshot> for FeedResponse {
    fn from(snap: FeedSnapshot) -> Self {
        Self {
            sessions: snap.sessions().cloned().collect(),
            page_count: snap.pages.len(),
            total_hits: snap.total_hits,
            phase: snap.phase.as_str().to_string(),
            is_loading: snap.is_loading,
            is_fetching_next_page: snap.is_fetching_next_page,
            exhausted: snap.exhausted,
            error: snap.last_error.clone(),
        }
    }
}

/// Feed reset response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetResponse {
    pub invalidated: bool,
}

/// Generic API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn index_unavailable() -> Self {
        Self::new("index_unavailable", "Search index is not reachable")
    }
}
