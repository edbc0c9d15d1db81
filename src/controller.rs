use crate::cache::{CacheStats, FilteredResult, ResultCache};
use crate::config::EngineConfig;
use crate::debounce::Debouncer;
use crate::filter::{normalize_query, Facet, FilterState};
use crate::paginator::Paginator;
use crate::types::{Bill, BillStatus, SharedBill};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

/// Distinct values offered by each facet, sorted lexicographically
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FacetOptions {
    pub topics: Vec<String>,
    pub sponsors: Vec<String>,
    pub statuses: Vec<String>,
}

impl FacetOptions {
    fn from_bills(bills: &[SharedBill]) -> Self {
        let mut topics = BTreeSet::new();
        let mut sponsors = BTreeSet::new();
        let mut statuses = BTreeSet::new();

        for bill in bills {
            topics.extend(bill.topics.iter().cloned());
            sponsors.extend(bill.sponsor_names().map(str::to_string));
            if !bill.status.as_str().is_empty() {
                statuses.insert(bill.status.as_str().to_string());
            }
        }

        Self {
            topics: topics.into_iter().collect(),
            sponsors: sponsors.into_iter().collect(),
            statuses: statuses.into_iter().collect(),
        }
    }
}

/// What a renderer needs to draw the current results
#[derive(Debug, Clone, Serialize)]
pub struct ResultsView<'a> {
    pub bills: &'a [SharedBill],
    pub total_count: usize,
    pub filtered_count: usize,
    pub visible_count: usize,
    pub page: usize,
    pub has_more: bool,
}

/// Owns the bill collection and the filter, cache and pagination state built
/// on top of it.
///
/// Every filter mutation replaces the [`FilterState`], resets pagination to
/// the first page and recomputes the result through the cache. Free-text
/// input is debounced; facet and status changes apply immediately.
#[derive(Debug)]
pub struct FilterController {
    cache: ResultCache,
    paginator: Paginator,
    state: FilterState,
    current: FilteredResult,
    facets: FacetOptions,
    text_debouncer: Debouncer,
    text_tx: UnboundedSender<String>,
    text_rx: UnboundedReceiver<String>,
}

impl FilterController {
    /// Create a controller with an empty collection
    pub fn new(config: &EngineConfig) -> Self {
        let (text_tx, text_rx) = mpsc::unbounded_channel();
        let mut cache = ResultCache::new(Vec::<SharedBill>::new().into(), config.cache_capacity);
        let state = FilterState::empty();
        let current = cache.get_or_compute(&state);

        Self {
            cache,
            paginator: Paginator::new(config.page_size),
            state,
            current,
            facets: FacetOptions::default(),
            text_debouncer: Debouncer::new(config.text_debounce),
            text_tx,
            text_rx,
        }
    }

    /// Install the session's bill collection. Clears all filters and any
    /// pending text change.
    pub fn set_bill_collection<I>(&mut self, bills: I)
    where
        I: IntoIterator<Item = Bill>,
    {
        let collection: Arc<[SharedBill]> = bills.into_iter().map(Arc::new).collect();
        self.facets = FacetOptions::from_bills(&collection);
        info!(
            bills = collection.len(),
            topics = self.facets.topics.len(),
            sponsors = self.facets.sponsors.len(),
            "bill collection loaded"
        );

        self.cache = ResultCache::new(collection, self.cache_capacity());
        self.discard_pending_text();
        self.apply_state(FilterState::empty());
    }

    /// Queue a free-text change. It is committed once the input has been
    /// quiet for the configured debounce period; see
    /// [`FilterController::next_text_commit`].
    ///
    /// Must be called from within a tokio runtime.
    pub fn set_text_query(&mut self, raw: &str) {
        let query = normalize_query(raw);
        // an already-fired but uncommitted query is superseded as well
        self.discard_pending_text();
        let tx = self.text_tx.clone();
        self.text_debouncer.schedule(move || {
            // The receiver lives in the controller; a closed channel means
            // the controller is gone and there is nothing to update.
            let _ = tx.send(query);
        });
    }

    /// Wait for the pending free-text change to fire and commit it.
    ///
    /// Returns `None` immediately when nothing is pending, otherwise whether
    /// the committed query changed the filter state.
    pub async fn next_text_commit(&mut self) -> Option<bool> {
        match self.text_rx.try_recv() {
            Ok(query) => return Some(self.apply_text_query(&query)),
            Err(TryRecvError::Disconnected) => return None,
            Err(TryRecvError::Empty) => {}
        }

        if !self.text_debouncer.is_pending() {
            // the task may have sent right after the first try_recv
            let query = self.text_rx.try_recv().ok()?;
            return Some(self.apply_text_query(&query));
        }

        let query = self.text_rx.recv().await?;
        Some(self.apply_text_query(&query))
    }

    /// A free-text change is scheduled or fired but not yet committed
    pub fn has_pending_text(&self) -> bool {
        self.text_debouncer.is_pending() || !self.text_rx.is_empty()
    }

    /// Commit a free-text query right away, bypassing the debouncer.
    /// Returns whether the filter state changed.
    pub fn apply_text_query(&mut self, raw: &str) -> bool {
        let query = normalize_query(raw);
        if query == self.state.search() {
            debug!(query = %query, "text query unchanged");
            return false;
        }
        let next = self.state.clone().with_search(&query);
        self.apply_state(next);
        true
    }

    /// Replace the selection of a multi-value facet
    pub fn set_facet<I, S>(&mut self, facet: Facet, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let next = self.state.clone().with_facet(facet, values);
        self.apply_state(next);
    }

    /// Select a single status, or `None` for any status
    pub fn set_status(&mut self, status: Option<BillStatus>) {
        let next = self.state.clone().with_status(status);
        self.apply_state(next);
    }

    /// Drop every filter, including a pending text change
    pub fn clear_all(&mut self) {
        self.discard_pending_text();
        self.apply_state(FilterState::empty());
    }

    /// Reveal the next page. Does not recompute the filtered set.
    pub fn load_more(&mut self) -> bool {
        let advanced = self.paginator.advance(self.current.len());
        debug!(
            page = self.paginator.pages(),
            visible = self.visible_count(),
            advanced,
            "load more"
        );
        advanced
    }

    /// Use a different page size, e.g. for a narrow viewport
    pub fn set_page_size(&mut self, page_size: usize) {
        self.paginator.set_page_size(page_size);
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn filtered(&self) -> &FilteredResult {
        &self.current
    }

    pub fn visible_slice(&self) -> &[SharedBill] {
        self.paginator.visible_slice(self.current.bills())
    }

    /// Size of the whole collection
    pub fn total_count(&self) -> usize {
        self.cache.collection().len()
    }

    /// Bills matching the current filters
    pub fn filtered_count(&self) -> usize {
        self.current.len()
    }

    /// Bills currently exposed to the renderer
    pub fn visible_count(&self) -> usize {
        self.paginator.visible_count(self.current.len())
    }

    pub fn has_more(&self) -> bool {
        self.paginator.has_more(self.current.len())
    }

    pub fn current_page(&self) -> usize {
        self.paginator.pages()
    }

    pub fn page_size(&self) -> usize {
        self.paginator.page_size()
    }

    pub fn facet_options(&self) -> &FacetOptions {
        &self.facets
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn view(&self) -> ResultsView<'_> {
        ResultsView {
            bills: self.visible_slice(),
            total_count: self.total_count(),
            filtered_count: self.filtered_count(),
            visible_count: self.visible_count(),
            page: self.current_page(),
            has_more: self.has_more(),
        }
    }

    fn apply_state(&mut self, state: FilterState) {
        self.state = state;
        self.paginator.reset();
        self.current = self.cache.get_or_compute(&self.state);
        debug!(
            key = %self.state.canonical_key(),
            filtered = self.current.len(),
            total = self.total_count(),
            "filter applied"
        );
    }

    fn discard_pending_text(&mut self) {
        self.text_debouncer.cancel();
        while self.text_rx.try_recv().is_ok() {}
    }

    fn cache_capacity(&self) -> Option<usize> {
        self.cache.capacity()
    }
}

impl Default for FilterController {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}
