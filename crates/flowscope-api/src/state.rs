//! Application state shared across API handlers

use std::sync::Arc;
use std::time::{Duration, Instant};

use flowscope_core::{AppConfig, IndexConfig};
use session_feed::FeedCache;
use session_index_client::IndexClient;
use tokio::sync::RwLock;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: RwLock<AppConfig>,
    client: RwLock<Option<IndexClient>>,
    feeds: RwLock<Option<Arc<FeedCache<IndexClient>>>>,
    started_at: Instant,
}

impl AppState {
    /// Create a new application state with default config
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create with a specific config
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config: RwLock::new(config),
                client: RwLock::new(None),
                feeds: RwLock::new(None),
                started_at: Instant::now(),
            }),
        }
    }

    /// Get current config
    pub async fn config(&self) -> AppConfig {
        self.inner.config.read().await.clone()
    }

    /// Time since this state was created
    pub fn uptime(&self) -> Duration {
        self.inner.started_at.elapsed()
    }

    /// Update index configuration.
    ///
    /// Drops the cached client and every accumulated feed: results fetched
    /// against the old index must not leak into views of the new one.
    pub async fn set_index_config(&self, index_config: IndexConfig) {
        {
            let mut config = self.inner.config.write().await;
            config.index = index_config;
        }

        let mut client = self.inner.client.write().await;
        *client = None;

        let stale = {
            let mut feeds = self.inner.feeds.write().await;
            feeds.take()
        };
        if let Some(cache) = stale {
            cache.clear().await;
        }
    }

    /// Get or create the index client
    pub async fn index_client(&self) -> Option<IndexClient> {
        {
            let client = self.inner.client.read().await;
            if client.is_some() {
                return client.clone();
            }
        }

        let config = self.inner.config.read().await;
        tracing::info!("Creating index client for URL: {}", config.index.url);
        match IndexClient::new(config.index.clone()) {
            Ok(client) => {
                let mut cached = self.inner.client.write().await;
                *cached = Some(client.clone());
                Some(client)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to create index client for {}: {}",
                    config.index.url,
                    e
                );
                None
            }
        }
    }

    /// Get or create the feed cache backed by the index client
    pub async fn feed_cache(&self) -> Option<Arc<FeedCache<IndexClient>>> {
        {
            let feeds = self.inner.feeds.read().await;
            if let Some(cache) = feeds.as_ref() {
                return Some(cache.clone());
            }
        }

        let client = self.index_client().await?;
        let page_size = self.inner.config.read().await.index.page_size;

        let mut feeds = self.inner.feeds.write().await;

        // Double-check after acquiring write lock
        if let Some(cache) = feeds.as_ref() {
            return Some(cache.clone());
        }

        let cache = Arc::new(FeedCache::new(Arc::new(client), page_size));
        *feeds = Some(cache.clone());
        Some(cache)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
