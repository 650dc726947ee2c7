//! session-feed: Incremental loading of session pages
//!
//! A feed owns the accumulated pages for one filter and enforces the
//! pagination contract: pages append strictly in cursor order, one fetch
//! outstanding at a time. Feeds never rebind: the [`FeedCache`] keys feeds
//! by filter, so switching filters means switching feeds, and repeated
//! views of the same filter share one accumulation.

pub mod cache;
pub mod feed;

use async_trait::async_trait;
use flowscope_core::{IndexError, Page, SessionFilter};
use session_index_client::IndexClient;
use tokio_util::sync::CancellationToken;

pub use cache::FeedCache;
pub use feed::{FeedPhase, FeedSnapshot, SessionFeed};

/// Source of session pages.
///
/// The seam between the feed state machine and the search backend; tests
/// substitute an in-memory implementation.
#[async_trait]
pub trait PageFetcher: Send + Sync + 'static {
    /// Fetch one page for the given cursor position.
    ///
    /// Returns `Ok(None)` when the cancellation token fired before the
    /// request completed; cancellation is not an error.
    async fn fetch_page(
        &self,
        filter: &SessionFilter,
        page: usize,
        cancel: &CancellationToken,
    ) -> Result<Option<Page>, IndexError>;
}

#[async_trait]
impl PageFetcher for IndexClient {
    async fn fetch_page(
        &self,
        filter: &SessionFilter,
        page: usize,
        cancel: &CancellationToken,
    ) -> Result<Option<Page>, IndexError> {
        IndexClient::fetch_page(self, filter, page, cancel).await
    }
}
