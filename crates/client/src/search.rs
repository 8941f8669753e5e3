//! Debounced, cancellable search-as-you-type.
//!
//! Every call to [`DebouncedSearch::search`] takes a generation ticket. The
//! request is only issued once the quiet window passes without a newer call,
//! and its response is only delivered if no newer call started while it was
//! in flight. Superseded calls resolve to [`SearchOutcome::Superseded`], so a
//! slow, stale response can never overwrite newer results.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use qkart_core::Product;
use tracing::debug;

use crate::api::{ApiClient, ApiError};

/// Anything that can answer a product search.
pub trait ProductSearch: Send + Sync {
    /// Search the catalog.
    fn search(&self, query: &str) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send;
}

impl ProductSearch for ApiClient {
    async fn search(&self, query: &str) -> Result<Vec<Product>, ApiError> {
        let products = self.search_products(query).await?;
        Ok(products.as_ref().clone())
    }
}

/// Result of a debounced search call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// This call is the latest one; show its results.
    Results(Vec<Product>),
    /// A newer call (or [`DebouncedSearch::cancel`]) made this one obsolete.
    Superseded,
}

/// Debounces search calls and drops stale responses.
///
/// Clones share the same generation counter, so a clone handed to a spawned
/// task still supersedes (and is superseded by) the original.
pub struct DebouncedSearch<S> {
    inner: Arc<Inner<S>>,
}

struct Inner<S> {
    source: S,
    window: Duration,
    generation: AtomicU64,
}

impl<S> Clone for DebouncedSearch<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: ProductSearch> DebouncedSearch<S> {
    /// Wrap `source` with a quiet window of `window`.
    #[must_use]
    pub fn new(source: S, window: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                window,
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// The quiet window.
    #[must_use]
    pub fn window(&self) -> Duration {
        self.inner.window
    }

    /// Search once the user pauses typing.
    ///
    /// # Errors
    ///
    /// Returns the source's error, but only if this call is still the latest
    /// when the response arrives.
    pub async fn search(&self, query: &str) -> Result<SearchOutcome, ApiError> {
        let ticket = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;

        tokio::time::sleep(self.inner.window).await;
        if !self.is_current(ticket) {
            debug!(query, "Search superseded before request");
            return Ok(SearchOutcome::Superseded);
        }

        let result = self.inner.source.search(query).await;
        if !self.is_current(ticket) {
            debug!(query, "Discarding stale search response");
            return Ok(SearchOutcome::Superseded);
        }

        result.map(SearchOutcome::Results)
    }

    /// Supersede every pending call.
    pub fn cancel(&self) {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.inner.generation.load(Ordering::SeqCst) == ticket
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    use qkart_core::{Money, ProductId, Rating};

    use super::*;

    /// Search source that answers after a per-query delay and records calls.
    #[derive(Default)]
    struct FakeSearch {
        calls: AtomicUsize,
        queries: Mutex<Vec<String>>,
        delays: HashMap<&'static str, Duration>,
    }

    impl FakeSearch {
        fn with_delay(query: &'static str, delay: Duration) -> Self {
            Self {
                delays: HashMap::from([(query, delay)]),
                ..Self::default()
            }
        }
    }

    impl ProductSearch for FakeSearch {
        async fn search(&self, query: &str) -> Result<Vec<Product>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.queries.lock().unwrap().push(query.to_owned());
            if let Some(delay) = self.delays.get(query) {
                tokio::time::sleep(*delay).await;
            }
            Ok(vec![Product {
                id: ProductId::new(query),
                name: query.to_owned(),
                category: "Electronics".to_owned(),
                cost: Money::from_units(10),
                rating: Rating::new(3).unwrap(),
                image: String::new(),
            }])
        }
    }

    fn names(outcome: &SearchOutcome) -> Vec<String> {
        match outcome {
            SearchOutcome::Results(products) => products.iter().map(|p| p.name.clone()).collect(),
            SearchOutcome::Superseded => Vec::new(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_search_waits_for_window() {
        let search = DebouncedSearch::new(FakeSearch::default(), Duration::from_millis(500));

        let started = tokio::time::Instant::now();
        let outcome = search.search("shoes").await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(500));
        assert_eq!(names(&outcome), ["shoes"]);
        assert_eq!(search.inner.source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_burst_issues_one_request() {
        let search = DebouncedSearch::new(FakeSearch::default(), Duration::from_millis(500));

        let mut handles = Vec::new();
        for query in ["s", "sh", "sho", "shoe"] {
            let search = search.clone();
            handles.push(tokio::spawn(async move { search.search(query).await }));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        let mut outcomes = Vec::new();
        for handle in handles {
            outcomes.push(handle.await.unwrap().unwrap());
        }

        assert!(outcomes[..3].iter().all(|o| *o == SearchOutcome::Superseded));
        assert_eq!(names(&outcomes[3]), ["shoe"]);
        assert_eq!(search.inner.source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(*search.inner.source.queries.lock().unwrap(), ["shoe"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_is_discarded() {
        let source = FakeSearch::with_delay("slow", Duration::from_secs(2));
        let search = DebouncedSearch::new(source, Duration::from_millis(500));

        let first = {
            let search = search.clone();
            tokio::spawn(async move { search.search("slow").await })
        };

        // Let the first request go out, then type again while it is in flight.
        tokio::time::sleep(Duration::from_millis(700)).await;
        let second = search.search("fast").await.unwrap();

        assert_eq!(names(&second), ["fast"]);
        assert_eq!(first.await.unwrap().unwrap(), SearchOutcome::Superseded);
        assert_eq!(search.inner.source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_supersedes_pending_search() {
        let search = DebouncedSearch::new(FakeSearch::default(), Duration::from_millis(500));

        let pending = {
            let search = search.clone();
            tokio::spawn(async move { search.search("bag").await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        search.cancel();

        assert_eq!(pending.await.unwrap().unwrap(), SearchOutcome::Superseded);
        assert_eq!(search.inner.source.calls.load(Ordering::SeqCst), 0);
    }
}
