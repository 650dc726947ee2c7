//! Process-wide feed cache keyed by filter
//!
//! One feed per filter: repeated views of the same filter share one
//! accumulation, and invalidation is an explicit call rather than ambient
//! memoization.

use std::collections::HashMap;
use std::sync::Arc;

use flowscope_core::SessionFilter;
use tokio::sync::RwLock;

use crate::{PageFetcher, SessionFeed};

/// Cache of session feeds, one per filter
pub struct FeedCache<F> {
    fetcher: Arc<F>,
    page_size: usize,
    feeds: RwLock<HashMap<SessionFilter, Arc<SessionFeed<F>>>>,
}

impl<F: PageFetcher> FeedCache<F> {
    pub fn new(fetcher: Arc<F>, page_size: usize) -> Self {
        Self {
            fetcher,
            page_size,
            feeds: RwLock::new(HashMap::new()),
        }
    }

    /// Get the feed bound to this filter, creating it on first use
    pub async fn get_or_create(&self, filter: &SessionFilter) -> Arc<SessionFeed<F>> {
        // Fast path: the feed already exists
        {
            let feeds = self.feeds.read().await;
            if let Some(feed) = feeds.get(filter) {
                return feed.clone();
            }
        }

        let mut feeds = self.feeds.write().await;

        // Double-check after acquiring the write lock
        if let Some(feed) = feeds.get(filter) {
            return feed.clone();
        }

        tracing::debug!("Creating session feed for new filter");
        let feed = Arc::new(SessionFeed::new(
            self.fetcher.clone(),
            filter.clone(),
            self.page_size,
        ));
        feeds.insert(filter.clone(), feed.clone());
        feed
    }

    /// Drop the feed for this filter, cancelling any outstanding fetch
    pub async fn invalidate(&self, filter: &SessionFilter) {
        let removed = {
            let mut feeds = self.feeds.write().await;
            feeds.remove(filter)
        };
        if let Some(feed) = removed {
            feed.cancel().await;
        }
    }

    /// Drop all feeds
    pub async fn clear(&self) {
        let drained: Vec<_> = {
            let mut feeds = self.feeds.write().await;
            feeds.drain().map(|(_, feed)| feed).collect()
        };
        for feed in drained {
            feed.cancel().await;
        }
    }

    pub async fn len(&self) -> usize {
        self.feeds.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.feeds.read().await.is_empty()
    }
}
