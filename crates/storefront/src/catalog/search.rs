//! Debounced, last-query-wins product search.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use kkomi_core::{Page, Product};
use tokio::sync::watch;
use tracing::{debug, warn};

use super::{Debouncer, ProductSource};
use crate::messages;

/// What the catalog view should show.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A fetch for `query` is in flight.
    Loading { query: String },
    /// Results for `query`.
    Ready { query: String, page: Page<Product> },
    /// The fetch for `query` failed.
    Failed { query: String, message: String },
}

impl SearchState {
    /// Products to display; empty unless [`SearchState::Ready`].
    #[must_use]
    pub fn products(&self) -> &[Product] {
        match self {
            Self::Ready { page, .. } => &page.data,
            _ => &[],
        }
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }
}

/// Product search that coalesces keystrokes and drops stale results.
///
/// Every call to [`search`](Self::search) bumps a generation counter. Only
/// the task holding the latest generation may publish; older tasks are
/// aborted by the debouncer or, if they race past it, discard their result.
pub struct ProductSearch<S: ProductSource> {
    source: Arc<S>,
    debouncer: Debouncer,
    generation: Arc<AtomicU64>,
    state: Arc<watch::Sender<SearchState>>,
}

impl<S: ProductSource> ProductSearch<S> {
    /// Create a search over `source` with the given quiet period.
    pub fn new(source: S, quiet: Duration) -> Self {
        let (state, _) = watch::channel(SearchState::Idle);
        Self {
            source: Arc::new(source),
            debouncer: Debouncer::new(quiet),
            generation: Arc::new(AtomicU64::new(0)),
            state: Arc::new(state),
        }
    }

    /// Watch state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Search for `query` once typing pauses. A blank query lists the
    /// unfiltered first page.
    pub fn search(&self, query: impl Into<String>) {
        let query = query.into();
        let generation = self.next_generation();
        let task = run(
            Arc::clone(&self.source),
            Arc::clone(&self.generation),
            Arc::clone(&self.state),
            generation,
            query,
        );
        self.debouncer.schedule(task);
    }

    /// Search for `query` right away, cancelling any pending search.
    pub async fn search_now(&self, query: impl Into<String>) -> SearchState {
        self.debouncer.cancel();
        let generation = self.next_generation();
        run(
            Arc::clone(&self.source),
            Arc::clone(&self.generation),
            Arc::clone(&self.state),
            generation,
            query.into(),
        )
        .await;
        self.state()
    }

    /// Drop any pending search without publishing.
    pub fn cancel(&self) {
        self.next_generation();
        self.debouncer.cancel();
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl<S: ProductSource> std::fmt::Debug for ProductSearch<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductSearch")
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

async fn run<S: ProductSource>(
    source: Arc<S>,
    latest: Arc<AtomicU64>,
    state: Arc<watch::Sender<SearchState>>,
    generation: u64,
    query: String,
) {
    let is_current = || latest.load(Ordering::SeqCst) == generation;
    if !is_current() {
        return;
    }

    state.send_replace(SearchState::Loading {
        query: query.clone(),
    });

    let filter = Some(query.trim().to_string()).filter(|q| !q.is_empty());
    let result = source.search_products(filter).await;

    if !is_current() {
        debug!(%query, generation, "Discarding stale search result");
        return;
    }

    let next = match result {
        Ok(page) => SearchState::Ready { query, page },
        Err(e) => {
            warn!(%query, error = %e, "Product search failed");
            SearchState::Failed {
                query,
                message: e.user_message_or(messages::PRODUCTS_LOAD_FAILED),
            }
        }
    };
    state.send_replace(next);
}
