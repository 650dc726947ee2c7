//! session-index-client: HTTP client for the session search index
//!
//! This crate provides a high-level client for fetching session pages from
//! an OpenSearch-compatible index, including query construction, request
//! cancellation, and cluster health detection.

pub mod query;
pub mod status;

use flowscope_core::{IndexConfig, IndexError, Page, Session, SessionFilter};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

pub use status::{IndexHealth, IndexStatus};

/// Default timeout for index API calls (30 seconds).
/// Long enough for slow clusters, short enough to avoid perpetual spinners.
const INDEX_REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Result type for index client operations
pub type Result<T> = std::result::Result<T, IndexError>;

/// High-level search index client
#[derive(Clone)]
pub struct IndexClient {
    http: reqwest::Client,
    config: IndexConfig,
}

impl IndexClient {
    /// Create a new index client
    pub fn new(config: IndexConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(INDEX_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| IndexError::ApiError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self { http, config })
    }

    /// Get the current index configuration
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Fetch one page of sessions matching the filter.
    ///
    /// The page cursor counts already-retrieved pages; page 0 is the first.
    /// If the cancellation token fires before the request completes, the
    /// in-flight request is abandoned and `Ok(None)` is returned: no page is
    /// produced and the caller's cursor must not advance. Cancellation is
    /// not an error.
    pub async fn fetch_page(
        &self,
        filter: &SessionFilter,
        page: usize,
        cancel: &CancellationToken,
    ) -> Result<Option<Page>> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(page, "Page fetch cancelled");
                Ok(None)
            }
            result = self.search_page(filter, page) => result.map(Some),
        }
    }

    /// Execute the `_search` request for one page
    async fn search_page(&self, filter: &SessionFilter, page: usize) -> Result<Page> {
        let body = query::build_search_query(filter, page, self.config.page_size);
        let url = format!("{}/{}/_search", self.config.url, self.config.index);

        let mut request = self.http.post(&url).json(&body);
        if !self.config.api_key.is_empty() {
            request = request.header("Authorization", format!("ApiKey {}", self.config.api_key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| map_request_error(e, &self.config.url))?;

        if !response.status().is_success() {
            return Err(IndexError::ApiError {
                message: format!("Search request failed with status {}", response.status()),
            });
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| IndexError::ParseError(format!("Invalid search response: {}", e)))?;

        parse_search_response(&json)
    }

    /// Get the total document count for the session index
    pub async fn doc_count(&self) -> Result<u64> {
        let url = format!("{}/{}/_count", self.config.url, self.config.index);
        let json = self.get_json(&url).await?;

        json["count"].as_u64().ok_or_else(|| {
            IndexError::ParseError("Missing count in _count response".to_string())
        })
    }

    /// Get the cluster status string ("green", "yellow", "red")
    pub async fn cluster_health(&self) -> Result<String> {
        let url = format!("{}/_cluster/health", self.config.url);
        let json = self.get_json(&url).await?;

        json["status"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                IndexError::ParseError("Missing status in cluster health response".to_string())
            })
    }

    /// Check if the index is reachable
    pub async fn is_online(&self) -> bool {
        self.cluster_health().await.is_ok()
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        let mut request = self.http.get(url);
        if !self.config.api_key.is_empty() {
            request = request.header("Authorization", format!("ApiKey {}", self.config.api_key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| map_request_error(e, &self.config.url))?;

        if !response.status().is_success() {
            return Err(IndexError::ApiError {
                message: format!("Request failed with status {}", response.status()),
            });
        }

        response
            .json()
            .await
            .map_err(|e| IndexError::ParseError(e.to_string()))
    }
}

/// Parse an OpenSearch `_search` response into a [`Page`].
///
/// Malformed hits are skipped with a warning rather than failing the whole
/// page; the index may hold documents written by older engine versions.
fn parse_search_response(json: &Value) -> Result<Page> {
    let hits = json["hits"]["hits"]
        .as_array()
        .ok_or_else(|| IndexError::ParseError("Missing hits in search response".to_string()))?;

    // The raw hit count drives exhaustion decisions downstream; a skipped
    // malformed document must not look like a shorter backend page
    let hit_count = hits.len();

    let sessions: Vec<Session> = hits
        .iter()
        .filter_map(|hit| {
            match serde_json::from_value::<Session>(hit["_source"].clone()) {
                Ok(session) => Some(session),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping malformed session document");
                    None
                }
            }
        })
        .collect();

    // OpenSearch reports {"total": {"value": N}}; older engines report a bare number
    let total_hits = json["hits"]["total"]["value"]
        .as_u64()
        .or_else(|| json["hits"]["total"].as_u64())
        .unwrap_or(0);

    Ok(Page {
        sessions,
        hit_count,
        total_hits,
    })
}

/// Convert a reqwest error into an IndexError
fn map_request_error(e: reqwest::Error, url: &str) -> IndexError {
    if e.is_timeout() {
        IndexError::Timeout {
            secs: INDEX_REQUEST_TIMEOUT.as_secs(),
        }
    } else if e.is_connect() {
        IndexError::Unreachable {
            url: url.to_string(),
        }
    } else {
        IndexError::ApiError {
            message: e.to_string(),
        }
    }
}
