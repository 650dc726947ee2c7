//! The per-filter pagination state machine
//!
//! Lifecycle: `Idle -> Loading -> HasData -> Loading -> ... -> Exhausted`.
//! Exhausted is terminal. A feed is bound to one filter for its whole life;
//! viewing a different filter means a different feed, handed out by the
//! [`FeedCache`](crate::FeedCache). A failed fetch parks the feed in Failed
//! with the accumulation intact; fetching again retries.

use std::sync::Arc;

use flowscope_core::{IndexError, Page, Session, SessionFilter};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::PageFetcher;

/// Feed lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedPhase {
    /// No fetch issued yet for this filter
    Idle,
    /// A fetch is outstanding
    Loading,
    /// At least one page accumulated, more may follow
    HasData,
    /// The backend returned a short page; no further pages exist
    Exhausted,
    /// The last fetch failed; accumulated pages remain valid
    Failed,
}

impl FeedPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::HasData => "has_data",
            Self::Exhausted => "exhausted",
            Self::Failed => "failed",
        }
    }
}

/// Point-in-time view of a feed, the consumer-facing contract
#[derive(Debug, Clone, Serialize)]
pub struct FeedSnapshot {
    pub filter: SessionFilter,
    pub pages: Vec<Page>,
    pub phase: FeedPhase,
    /// First page is being fetched
    pub is_loading: bool,
    /// A subsequent page is being fetched
    pub is_fetching_next_page: bool,
    pub exhausted: bool,
    /// Total matching documents as reported with the latest page
    pub total_hits: Option<u64>,
    pub last_error: Option<String>,
}

impl FeedSnapshot {
    /// All accumulated sessions in page order
    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.pages.iter().flat_map(|p| p.sessions.iter())
    }

    pub fn session_count(&self) -> usize {
        self.pages.iter().map(Page::len).sum()
    }
}

struct FeedState {
    filter: SessionFilter,
    pages: Vec<Page>,
    phase: FeedPhase,
    /// Number of pages already retrieved; the next fetch requests this page
    cursor: usize,
    cancel: CancellationToken,
    last_error: Option<IndexError>,
}

impl FeedState {
    fn snapshot(&self) -> FeedSnapshot {
        let loading = self.phase == FeedPhase::Loading;
        FeedSnapshot {
            filter: self.filter.clone(),
            pages: self.pages.clone(),
            phase: self.phase,
            is_loading: loading && self.cursor == 0,
            is_fetching_next_page: loading && self.cursor > 0,
            exhausted: self.phase == FeedPhase::Exhausted,
            total_hits: self.pages.last().map(|p| p.total_hits),
            last_error: self.last_error.as_ref().map(|e| e.to_string()),
        }
    }

    /// Phase a cancelled or discarded fetch falls back to
    fn settled_phase(&self) -> FeedPhase {
        if self.pages.is_empty() {
            FeedPhase::Idle
        } else {
            FeedPhase::HasData
        }
    }
}

/// Accumulates session pages for a single filter
pub struct SessionFeed<F> {
    fetcher: Arc<F>,
    page_size: usize,
    state: RwLock<FeedState>,
}

impl<F: PageFetcher> SessionFeed<F> {
    pub fn new(fetcher: Arc<F>, filter: SessionFilter, page_size: usize) -> Self {
        Self {
            fetcher,
            page_size,
            state: RwLock::new(FeedState {
                filter,
                pages: Vec::new(),
                phase: FeedPhase::Idle,
                cursor: 0,
                cancel: CancellationToken::new(),
                last_error: None,
            }),
        }
    }

    /// Get the current consumer-facing view without touching the backend
    pub async fn snapshot(&self) -> FeedSnapshot {
        self.state.read().await.snapshot()
    }

    /// Fetch the next page and append it to the accumulation.
    ///
    /// No-op while a fetch is already outstanding or the feed is exhausted.
    /// A failed fetch leaves the accumulated pages displayable; calling
    /// again retries the same cursor position.
    pub async fn fetch_next_page(&self) -> FeedSnapshot {
        let (filter, cursor, cancel) = {
            let mut state = self.state.write().await;
            match state.phase {
                FeedPhase::Loading | FeedPhase::Exhausted => return state.snapshot(),
                FeedPhase::Idle | FeedPhase::HasData | FeedPhase::Failed => {}
            }
            state.phase = FeedPhase::Loading;
            (state.filter.clone(), state.cursor, state.cancel.clone())
        };

        let result = self.fetcher.fetch_page(&filter, cursor, &cancel).await;

        let mut state = self.state.write().await;
        match result {
            Ok(Some(page)) if !cancel.is_cancelled() => {
                // Exhaustion follows the backend's raw hit count: a document
                // skipped during parsing is not a shorter backend page
                state.phase = if page.hit_count < self.page_size {
                    FeedPhase::Exhausted
                } else {
                    FeedPhase::HasData
                };
                tracing::debug!(
                    cursor,
                    hits = page.hit_count,
                    sessions = page.len(),
                    exhausted = state.phase == FeedPhase::Exhausted,
                    "Appended session page"
                );
                state.pages.push(page);
                state.cursor += 1;
                state.last_error = None;
            }
            // Cancellation observed either by the fetcher or after a late
            // completion: no page appended, cursor does not advance
            Ok(_) => {
                let settled = state.settled_phase();
                state.phase = settled;
            }
            Err(e) => {
                tracing::warn!(cursor, error = %e, "Session page fetch failed");
                state.phase = FeedPhase::Failed;
                state.last_error = Some(e);
            }
        }

        state.snapshot()
    }

    /// Cancel an outstanding fetch, if any.
    ///
    /// The accumulation is untouched; the feed settles back to the state it
    /// had before the fetch was issued.
    pub async fn cancel(&self) {
        let mut state = self.state.write().await;
        if state.phase == FeedPhase::Loading {
            state.cancel.cancel();
            state.cancel = CancellationToken::new();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use flowscope_core::{Address, SessionId};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    const PAGE_SIZE: usize = 25;

    /// In-memory page source over `total` sessions with descending timestamps
    struct FakeFetcher {
        total: usize,
        delay: Option<Duration>,
        /// When set, sleeps ignore the cancellation token, simulating a
        /// request that completes after its signal fired
        ignore_cancel: bool,
        /// Documents on the first page that fail to parse: dropped from the
        /// sessions while still counted in `hit_count`
        malformed_on_first_page: usize,
        fail_next: AtomicBool,
        calls: AtomicUsize,
    }

    impl FakeFetcher {
        fn new(total: usize) -> Self {
            Self {
                total,
                delay: None,
                ignore_cancel: false,
                malformed_on_first_page: 0,
                fail_next: AtomicBool::new(false),
                calls: AtomicUsize::new(0),
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        fn session(k: usize) -> Session {
            Session {
                session_id: SessionId::new(format!("s{}", k)),
                timestamp: 2_000_000_000_000 - k as u64,
                address: Address::new("9fRus"),
                payload: Default::default(),
            }
        }
    }

    #[async_trait]
    impl PageFetcher for FakeFetcher {
        async fn fetch_page(
            &self,
            _filter: &SessionFilter,
            page: usize,
            cancel: &CancellationToken,
        ) -> Result<Option<Page>, IndexError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if let Some(delay) = self.delay {
                if self.ignore_cancel {
                    tokio::time::sleep(delay).await;
                } else {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Ok(None),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
            if !self.ignore_cancel && cancel.is_cancelled() {
                return Ok(None);
            }

            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(IndexError::ApiError {
                    message: "boom".to_string(),
                });
            }

            let start = page * PAGE_SIZE;
            let end = (start + PAGE_SIZE).min(self.total);
            let skip = if page == 0 {
                self.malformed_on_first_page
            } else {
                0
            };
            let sessions = (start + skip..end).map(Self::session).collect();
            Ok(Some(Page {
                sessions,
                hit_count: end - start,
                total_hits: self.total as u64,
            }))
        }
    }

    fn feed(fetcher: Arc<FakeFetcher>) -> SessionFeed<FakeFetcher> {
        SessionFeed::new(fetcher, SessionFilter::default(), PAGE_SIZE)
    }

    #[tokio::test]
    async fn first_fetch_appends_one_page() {
        let feed = feed(Arc::new(FakeFetcher::new(60)));

        assert_eq!(feed.snapshot().await.phase, FeedPhase::Idle);

        let snap = feed.fetch_next_page().await;
        assert_eq!(snap.phase, FeedPhase::HasData);
        assert_eq!(snap.pages.len(), 1);
        assert_eq!(snap.session_count(), PAGE_SIZE);
        assert_eq!(snap.total_hits, Some(60));
        assert_eq!(snap.pages[0].sessions[0].session_id.as_str(), "s0");
    }

    #[tokio::test]
    async fn accumulation_is_monotonic_until_exhausted() {
        let fetcher = Arc::new(FakeFetcher::new(60));
        let feed = feed(fetcher.clone());

        let mut prev_len = 0;
        for _ in 0..3 {
            let snap = feed.fetch_next_page().await;
            assert!(snap.session_count() >= prev_len);
            prev_len = snap.session_count();
        }

        let snap = feed.snapshot().await;
        assert_eq!(snap.pages.len(), 3);
        assert_eq!(snap.session_count(), 60);
        assert_eq!(snap.phase, FeedPhase::Exhausted);

        // Pages were appended in cursor order
        assert_eq!(snap.pages[1].sessions[0].session_id.as_str(), "s25");
        assert_eq!(snap.pages[2].sessions[0].session_id.as_str(), "s50");

        // Exhausted is terminal: no further backend calls
        feed.fetch_next_page().await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn short_first_page_exhausts() {
        let feed = feed(Arc::new(FakeFetcher::new(10)));
        let snap = feed.fetch_next_page().await;
        assert_eq!(snap.phase, FeedPhase::Exhausted);
        assert_eq!(snap.session_count(), 10);
    }

    #[tokio::test]
    async fn skipped_documents_do_not_exhaust_feed() {
        // A full backend page where one document fails to parse must keep
        // paginating: 50 matching sessions, one unparseable on page 0
        let mut fetcher = FakeFetcher::new(50);
        fetcher.malformed_on_first_page = 1;
        let fetcher = Arc::new(fetcher);
        let feed = feed(fetcher.clone());

        let snap = feed.fetch_next_page().await;
        assert_eq!(snap.phase, FeedPhase::HasData);
        assert_eq!(snap.session_count(), 24);

        // The second page is still reachable
        let snap = feed.fetch_next_page().await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
        assert_eq!(snap.phase, FeedPhase::HasData);
        assert_eq!(snap.session_count(), 49);

        let snap = feed.fetch_next_page().await;
        assert_eq!(snap.phase, FeedPhase::Exhausted);
        assert_eq!(snap.session_count(), 49);
    }

    #[tokio::test]
    async fn only_one_fetch_outstanding() {
        let fetcher =
            Arc::new(FakeFetcher::new(100).with_delay(Duration::from_millis(50)));
        let feed = Arc::new(feed(fetcher.clone()));

        let a = tokio::spawn({
            let feed = feed.clone();
            async move { feed.fetch_next_page().await }
        });
        let b = tokio::spawn({
            let feed = feed.clone();
            async move { feed.fetch_next_page().await }
        });
        let _ = tokio::join!(a, b);

        // One of the two calls observed Loading and returned without fetching
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(feed.snapshot().await.pages.len(), 1);
    }

    #[tokio::test]
    async fn loading_flags_distinguish_first_and_next_page() {
        let fetcher =
            Arc::new(FakeFetcher::new(100).with_delay(Duration::from_millis(50)));
        let feed = Arc::new(feed(fetcher));

        let task = tokio::spawn({
            let feed = feed.clone();
            async move { feed.fetch_next_page().await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;

        let snap = feed.snapshot().await;
        assert!(snap.is_loading);
        assert!(!snap.is_fetching_next_page);
        task.await.unwrap();

        let task = tokio::spawn({
            let feed = feed.clone();
            async move { feed.fetch_next_page().await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;

        let snap = feed.snapshot().await;
        assert!(!snap.is_loading);
        assert!(snap.is_fetching_next_page);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn cancellation_is_idempotent() {
        let fetcher =
            Arc::new(FakeFetcher::new(100).with_delay(Duration::from_millis(50)));
        let feed = Arc::new(feed(fetcher));

        let task = tokio::spawn({
            let feed = feed.clone();
            async move { feed.fetch_next_page().await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        feed.cancel().await;
        task.await.unwrap();

        // As if the cancelled fetch never happened
        let snap = feed.snapshot().await;
        assert_eq!(snap.phase, FeedPhase::Idle);
        assert!(snap.pages.is_empty());
        assert!(snap.last_error.is_none());

        // A fresh fetch proceeds normally
        let snap = feed.fetch_next_page().await;
        assert_eq!(snap.phase, FeedPhase::HasData);
        assert_eq!(snap.pages.len(), 1);
    }

    #[tokio::test]
    async fn late_completion_after_cancel_is_discarded() {
        let mut fetcher = FakeFetcher::new(100).with_delay(Duration::from_millis(50));
        fetcher.ignore_cancel = true;
        let feed = Arc::new(feed(Arc::new(fetcher)));

        let task = tokio::spawn({
            let feed = feed.clone();
            async move { feed.fetch_next_page().await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        feed.cancel().await;

        // The fetch completes with a page, but its signal already fired
        task.await.unwrap();
        let snap = feed.snapshot().await;
        assert_eq!(snap.phase, FeedPhase::Idle);
        assert!(snap.pages.is_empty());
    }

    #[tokio::test]
    async fn failure_keeps_pages_and_is_retryable() {
        let fetcher = Arc::new(FakeFetcher::new(60));
        let feed = feed(fetcher.clone());

        feed.fetch_next_page().await;
        fetcher.fail_next.store(true, Ordering::SeqCst);

        let snap = feed.fetch_next_page().await;
        assert_eq!(snap.phase, FeedPhase::Failed);
        assert_eq!(snap.pages.len(), 1);
        assert!(snap.last_error.is_some());

        // Retry resumes at the same cursor
        let snap = feed.fetch_next_page().await;
        assert_eq!(snap.phase, FeedPhase::HasData);
        assert_eq!(snap.pages.len(), 2);
        assert!(snap.last_error.is_none());
        assert_eq!(snap.pages[1].sessions[0].session_id.as_str(), "s25");
    }
}
