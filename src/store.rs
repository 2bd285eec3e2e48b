//! Catalog store: the single writer of cached state.
//!
//! Every mutation goes through [`CatalogStore`]. State changes are applied
//! under one lock that is never held across an `.await`, and each change
//! publishes a fresh [`ViewModel`] on a `watch` channel, so consumers only
//! ever observe complete snapshots.

use crate::config::StoreConfig;
use crate::core::item::{Category, CategoryId, Item};
use crate::core::page::RemotePage;
use crate::core::query::{Bookmark, Query};
use crate::core::status::{RequestStatus, RequestStatusTracker, StatusFlag};
use crate::error::Result;
use crate::index::{PageIndex, SelectionSet};
use crate::query::filter::{compute_view, Highlight, TextMatcher};
use crate::storage::{CatalogSource, EntityTable};
use crate::view::{PaginationView, ViewModel};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// What a primary search ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The response became the current page
    Applied,
    /// The page was already cached; only the pointer moved
    Cached,
    /// Empty search term, nothing happened
    Skipped,
    /// A newer request for the same term was issued meanwhile; the
    /// response was cached but did not move the pointer or the status
    Superseded,
    /// The search term changed while the request was in flight; the
    /// response was dropped
    Discarded,
}

#[derive(Debug, Default)]
struct StoreState {
    search_term: String,
    matcher: TextMatcher,
    entities: EntityTable,
    pages: PageIndex,
    status: RequestStatusTracker,
    selection: SelectionSet<CategoryId>,
    categories: Vec<Arc<Category>>,
    /// Monotonic ticket counter, kept across resets
    issued: u64,
    latest_search: u64,
    latest_categories: u64,
}

impl StoreState {
    fn next_ticket(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    fn clear_partition(&mut self) {
        self.entities.clear();
        self.pages.clear_all_pages();
    }

    fn known_category_ids(&self) -> BTreeSet<CategoryId> {
        let loaded = self.categories.iter().map(|c| c.id.clone());
        let referenced = self
            .entities
            .all()
            .into_iter()
            .flat_map(|item| item.category_ids.clone());
        loaded.chain(referenced).collect()
    }

    fn compose(&self, config: &StoreConfig, highlight: &Highlight) -> ViewModel {
        let items = self
            .pages
            .current()
            .map(|page| self.entities.get_many(&page.item_ids))
            .unwrap_or_default();
        let filtered = compute_view(
            &items,
            &self.matcher,
            Some(self.selection.ids()),
            highlight,
        );

        ViewModel {
            query: Query {
                search_term: self.search_term.clone(),
                filter_text: self.matcher.text().to_string(),
                selected_category_ids: self.selection.ids().clone(),
            },
            items,
            filtered,
            pagination: PaginationView::new(self.pages.meta(), self.pages.page_numbers()),
            status: self.status.status(&config.results_resource),
            categories_status: self.status.status(&config.categories_resource),
            categories: self.categories.clone(),
            cached_items: self.entities.len(),
        }
    }
}

struct Inner {
    source: Arc<dyn CatalogSource>,
    config: StoreConfig,
    highlight: Highlight,
    state: Mutex<StoreState>,
    snapshots: watch::Sender<Arc<ViewModel>>,
    prefetches: Mutex<Vec<JoinHandle<()>>>,
}

/// Paginated, filterable, selectable cache over a [`CatalogSource`].
///
/// Cloning is cheap and every clone drives the same store.
#[derive(Clone)]
pub struct CatalogStore {
    inner: Arc<Inner>,
}

impl fmt::Debug for CatalogStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogStore")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl CatalogStore {
    /// Create a store with default configuration
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self::with_config(source, StoreConfig::default())
    }

    /// Create a store with explicit configuration
    pub fn with_config(source: Arc<dyn CatalogSource>, config: StoreConfig) -> Self {
        let highlight = config.highlight();
        let state = StoreState::default();
        let initial = Arc::new(state.compose(&config, &highlight));
        let (snapshots, _) = watch::channel(initial);

        Self {
            inner: Arc::new(Inner {
                source,
                config,
                highlight,
                state: Mutex::new(state),
                snapshots,
                prefetches: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Receive every future snapshot; the current one is available immediately
    pub fn subscribe(&self) -> watch::Receiver<Arc<ViewModel>> {
        self.inner.snapshots.subscribe()
    }

    /// The latest snapshot
    pub fn snapshot(&self) -> Arc<ViewModel> {
        self.inner.snapshots.borrow().clone()
    }

    /// Current query criteria, for reflecting into URL parameters
    pub fn bookmark(&self) -> Bookmark {
        self.snapshot().bookmark()
    }

    /// Status of any tracked resource
    pub fn status(&self, resource: &str) -> RequestStatus {
        self.state().status.status(resource)
    }

    /// Search the configured initial term
    pub async fn start(&self) -> Result<SearchOutcome> {
        let term = self.inner.config.initial_search_term.clone();
        self.search(&term, 1).await
    }

    /// Apply a bookmark: set its filter, then search its term and page
    pub async fn restore(&self, bookmark: &Bookmark) -> Result<SearchOutcome> {
        self.update_filter(&bookmark.filter_text);
        self.search(&bookmark.search_term, bookmark.seed_page()).await
    }

    /// Fetch `page` of `term` and make it the current page.
    ///
    /// A different term clears the whole cache first. If the term changes
    /// again before the response arrives, the response is dropped.
    pub async fn search(&self, term: &str, page: u32) -> Result<SearchOutcome> {
        if term.is_empty() {
            return Ok(SearchOutcome::Skipped);
        }
        let page = page.max(1);
        let resource = self.inner.config.results_resource.as_str();

        let ticket = {
            let mut state = self.state();
            if state.search_term != term {
                info!(from = %state.search_term, to = %term, "search term changed, clearing cache");
                state.clear_partition();
                state.search_term = term.to_string();
            }
            let ticket = state.next_ticket();
            state.latest_search = ticket;
            state.status.set_status(resource, StatusFlag::Pending);
            self.publish(&state);
            ticket
        };

        let response = self.inner.source.search(term, page).await;

        let mut state = self.state();
        if state.search_term != term {
            debug!(term = %term, page, current = %state.search_term, "discarding stale response");
            return Ok(SearchOutcome::Discarded);
        }
        let latest = state.latest_search == ticket;

        let remote = match response {
            Ok(remote) => remote,
            Err(e) => {
                warn!(term = %term, page, error = %e, "search failed");
                if latest {
                    state.status.set_error(resource, e.to_string());
                    self.publish(&state);
                }
                return Err(e);
            }
        };

        if !latest {
            debug!(term = %term, page, "superseded response kept as cache fill");
            Self::fill_page(&mut state, remote, page);
            self.publish(&state);
            return Ok(SearchOutcome::Superseded);
        }

        if let Err(e) = Self::apply_search_page(&mut state, remote, page) {
            warn!(term = %term, page, error = %e, "response does not fit its pagination");
            state.status.set_error(resource, e.to_string());
            self.publish(&state);
            return Err(e);
        }
        state.status.set_status(resource, StatusFlag::Success);
        info!(
            term = %term,
            page,
            total = state.pages.meta().total_items,
            "search applied"
        );
        self.publish(&state);
        drop(state);

        self.prefetch_next(term, page);
        Ok(SearchOutcome::Applied)
    }

    /// Switch to `page`, fetching it only when it is not cached.
    ///
    /// Pages outside `[1, last_page]` are rejected once results are known.
    pub async fn select_page(&self, page: u32) -> Result<SearchOutcome> {
        let term = {
            let mut state = self.state();
            if state.pages.select_current_page(page) {
                debug!(page, "page served from cache");
                self.publish(&state);
                let term = state.search_term.clone();
                drop(state);
                self.prefetch_next(&term, page);
                return Ok(SearchOutcome::Cached);
            }
            if state.pages.meta().is_populated() {
                state.pages.check_range(page)?;
            }
            state.search_term.clone()
        };
        self.search(&term, page).await
    }

    /// Register a page of items without moving the current page.
    ///
    /// Returns `Ok(false)` for an empty page. Out-of-range pages fail and
    /// leave the store untouched.
    pub fn add_page(&self, items: Vec<Item>, page: u32) -> Result<bool> {
        let mut state = self.state();
        let ids = items.iter().map(|item| item.id.clone()).collect();
        if !state.pages.add_page(page, ids)? {
            return Ok(false);
        }
        state.entities.upsert(items);
        self.publish(&state);
        Ok(true)
    }

    /// Change the filter text. Only the derived view is recomputed.
    pub fn update_filter(&self, text: &str) {
        let matcher = TextMatcher::new(text);
        let mut state = self.state();
        state.matcher = matcher;
        self.publish(&state);
    }

    /// Remove the filter text
    pub fn clear_filter(&self) {
        self.update_filter("")
    }

    /// Select categories, replacing (`clear_others`) or extending the selection
    pub fn select_categories<I>(&self, ids: I, clear_others: bool)
    where
        I: IntoIterator<Item = CategoryId>,
    {
        let mut state = self.state();
        state.selection.select(ids, clear_others);
        self.publish(&state);
    }

    /// Select every known category, or none
    pub fn select_all_categories(&self, flag: bool) {
        let mut state = self.state();
        let universe = state.known_category_ids();
        state.selection.select_all(universe, flag);
        self.publish(&state);
    }

    /// Fetch the full category list
    pub async fn load_categories(&self) -> Result<()> {
        let resource = self.inner.config.categories_resource.as_str();
        let ticket = {
            let mut state = self.state();
            let ticket = state.next_ticket();
            state.latest_categories = ticket;
            state.status.set_status(resource, StatusFlag::Pending);
            self.publish(&state);
            ticket
        };

        let response = self.inner.source.load_categories().await;

        let mut state = self.state();
        if state.latest_categories != ticket {
            debug!("discarding superseded category list");
            return Ok(());
        }
        match response {
            Ok(categories) => {
                debug!(count = categories.len(), "categories loaded");
                state.categories = categories.into_iter().map(Arc::new).collect();
                state.status.set_status(resource, StatusFlag::Success);
                self.publish(&state);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "loading categories failed");
                state.status.set_error(resource, e.to_string());
                self.publish(&state);
                Err(e)
            }
        }
    }

    /// Mark a resource as loading (`pending`) or not (`idle`)
    pub fn set_loading(&self, resource: &str, loading: bool) {
        let flag = if loading { StatusFlag::Pending } else { StatusFlag::Idle };
        let mut state = self.state();
        state.status.set_status(resource, flag);
        self.publish(&state);
    }

    /// Drop all cached data and criteria
    pub fn reset(&self) {
        for task in self.tasks().drain(..) {
            task.abort();
        }
        let mut state = self.state();
        let issued = state.issued;
        *state = StoreState {
            issued,
            ..StoreState::default()
        };
        info!("store reset");
        self.publish(&state);
    }

    /// Wait for every background prefetch to finish
    pub async fn settle(&self) {
        loop {
            let pending: Vec<_> = self.tasks().drain(..).collect();
            if pending.is_empty() {
                return;
            }
            for result in futures::future::join_all(pending).await {
                if let Err(e) = result {
                    if !e.is_cancelled() {
                        warn!(error = %e, "prefetch task failed");
                    }
                }
            }
        }
    }

    fn apply_search_page(state: &mut StoreState, remote: RemotePage, page: u32) -> Result<()> {
        let RemotePage { items, pagination } = &remote;
        let meta = remote.meta_update(page);
        if pagination.total_pages != 0 && pagination.per_page != 0 {
            let derived = pagination.total_results.div_ceil(u64::from(pagination.per_page));
            if derived != u64::from(pagination.total_pages) {
                debug!(
                    reported = pagination.total_pages,
                    derived, "remote page count disagrees with totals"
                );
            }
        }

        let added = state.pages.establish(meta, page, remote.item_ids())?;
        if !added && !state.pages.meta().is_populated() {
            state.entities.clear();
        }
        let categories: Vec<CategoryId> = items
            .iter()
            .flat_map(|item| item.category_ids.iter().cloned())
            .collect();
        state.entities.upsert(remote.items);
        state.selection.select(categories, true);
        Ok(())
    }

    fn fill_page(state: &mut StoreState, remote: RemotePage, page: u32) {
        match state.pages.add_page(page, remote.item_ids()) {
            Ok(true) => {
                state.entities.upsert(remote.items);
            }
            Ok(false) => {}
            Err(e) => debug!(page, error = %e, "page not cached"),
        }
    }

    fn prefetch_next(&self, term: &str, page: u32) {
        if !self.inner.config.prefetch {
            return;
        }
        let next = page.saturating_add(1);
        {
            let state = self.state();
            if state.search_term != term
                || !state.pages.page_in_range(next)
                || state.pages.has_page(next)
            {
                return;
            }
        }

        debug!(term = %term, page = next, "prefetching");
        let store = self.clone();
        let term = term.to_string();
        let task = tokio::spawn(async move { store.prefetch(term, next).await });

        let mut tasks = self.tasks();
        tasks.retain(|task| !task.is_finished());
        tasks.push(task);
    }

    async fn prefetch(&self, term: String, page: u32) {
        let response = self.inner.source.search(&term, page).await;

        let mut state = self.state();
        if state.search_term != term {
            debug!(term = %term, page, "dropping prefetch for a previous term");
            return;
        }
        match response {
            Ok(remote) => {
                Self::fill_page(&mut state, remote, page);
                self.publish(&state);
            }
            Err(e) => warn!(term = %term, page, error = %e, "prefetch failed"),
        }
    }

    fn publish(&self, state: &StoreState) {
        let vm = state.compose(&self.inner.config, &self.inner.highlight);
        self.inner.snapshots.send_replace(Arc::new(vm));
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn tasks(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.inner.prefetches.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
