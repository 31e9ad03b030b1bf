//! Per-calendar memo of resolved specifications.
//!
//! Entries never expire; they live until [`ResolutionCache::clear`] is called
//! or the owning resolver is dropped.

use std::collections::HashMap;
use std::sync::Arc;

use almanac_core::ResolvedSpec;
use tracing::debug;

/// Cache of resolved specifications keyed by calendar id.
///
/// Values are shared through `Arc`, so a hit hands back the very same
/// allocation the first resolution produced.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: HashMap<String, Arc<ResolvedSpec>>,
}

impl ResolutionCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if an entry exists for `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Gets the cached specification for `id`.
    pub fn get(&self, id: &str) -> Option<Arc<ResolvedSpec>> {
        self.entries.get(id).cloned()
    }

    /// Inserts or replaces the entry for `id`.
    pub fn put(&mut self, id: impl Into<String>, spec: Arc<ResolvedSpec>) {
        let id = id.into();
        if self.entries.insert(id.clone(), spec).is_some() {
            debug!(id = %id, "Replaced resolution cache entry");
        } else {
            debug!(id = %id, "Inserted resolution cache entry");
        }
    }

    /// Removes the entry for `id`.
    pub fn remove(&mut self, id: &str) -> Option<Arc<ResolvedSpec>> {
        let entry = self.entries.remove(id);
        if entry.is_some() {
            debug!(id = %id, "Removed resolution cache entry");
        }
        entry
    }

    /// Clears all entries.
    pub fn clear(&mut self) {
        let count = self.entries.len();
        self.entries.clear();
        debug!(count = count, "Cleared resolution cache");
    }

    /// Returns the number of cached calendars.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over all cached calendar ids.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|s| s.as_str())
    }
}
