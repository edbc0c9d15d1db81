//! Read-through cache of filter results.
//!
//! The bill collection is loaded once per session and never changes, so a
//! cached result stays valid for as long as the cache exists. Entries are only
//! removed by the optional LRU bound.

use crate::filter::{retain_matching, FilterState};
use crate::types::SharedBill;
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::debug;

/// Cache key derived from [`FilterState::canonical_key`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(state: &FilterState) -> Self {
        Self(state.canonical_key())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Bills matching a filter state, in original collection order
#[derive(Debug, Clone)]
pub struct FilteredResult {
    state: FilterState,
    bills: Arc<[SharedBill]>,
}

impl FilteredResult {
    /// Stable filter of `collection` through `state`
    pub fn compute(collection: &[SharedBill], state: &FilterState) -> Self {
        Self {
            state: state.clone(),
            bills: retain_matching(collection, state).into(),
        }
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn bills(&self) -> &[SharedBill] {
        &self.bills
    }

    pub fn len(&self) -> usize {
        self.bills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bills.is_empty()
    }

    /// True when both results share the same stored sequence
    pub fn ptr_eq(&self, other: &FilteredResult) -> bool {
        Arc::ptr_eq(&self.bills, &other.bills)
    }
}

/// Hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Memoizes filter results per canonical filter state
#[derive(Debug)]
pub struct ResultCache {
    collection: Arc<[SharedBill]>,
    entries: IndexMap<CacheKey, FilteredResult>,
    capacity: Option<usize>,
    hits: u64,
    misses: u64,
}

impl ResultCache {
    /// Create a cache over a bill collection. `capacity` of `None` keeps
    /// every entry; otherwise the least recently used entry is evicted.
    pub fn new(collection: Arc<[SharedBill]>, capacity: Option<usize>) -> Self {
        Self {
            collection,
            entries: IndexMap::new(),
            capacity: capacity.map(|c| c.max(1)),
            hits: 0,
            misses: 0,
        }
    }

    pub fn collection(&self) -> &[SharedBill] {
        &self.collection
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Return the cached result for `state`, computing and storing it first
    /// on a miss
    pub fn get_or_compute(&mut self, state: &FilterState) -> FilteredResult {
        let key = CacheKey::new(state);

        if let Some(index) = self.entries.get_index_of(&key) {
            let index = match self.capacity {
                Some(_) => {
                    let last = self.entries.len() - 1;
                    self.entries.move_index(index, last);
                    last
                }
                None => index,
            };
            if let Some((_, result)) = self.entries.get_index(index) {
                let result = result.clone();
                self.hits += 1;
                debug!(key = key.as_str(), "filter cache hit");
                return result;
            }
        }

        self.misses += 1;
        let result = FilteredResult::compute(&self.collection, state);
        debug!(
            key = key.as_str(),
            matched = result.len(),
            total = self.collection.len(),
            "filter cache miss"
        );

        self.entries.insert(key, result.clone());
        if let Some(capacity) = self.capacity {
            while self.entries.len() > capacity {
                if let Some((evicted, _)) = self.entries.shift_remove_index(0) {
                    debug!(key = evicted.as_str(), "evicted filter result");
                }
            }
        }

        result
    }

    /// Whether a result for `state` is already stored
    pub fn contains(&self, state: &FilterState) -> bool {
        self.entries.contains_key(&CacheKey::new(state))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }
}
