//! Shared caches keyed by property identity.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::property::{AnyProperty, PropertyId};

/// Read-mostly map from property identity to a shared value.
///
/// Readers take the read lock only and never block each other. Population
/// goes through [`PropertyCache::get_or_add`]: when several threads race to
/// fill the same key, the first insert wins and every caller receives that
/// winner.
pub struct PropertyCache<V> {
    entries: RwLock<HashMap<PropertyId, Arc<V>>>,
}

impl<V> PropertyCache<V> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, property: &AnyProperty) -> Option<Arc<V>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&property.id())
            .cloned()
    }

    /// Returns the cached value for `property`, building it with `factory` on a miss.
    ///
    /// The factory runs outside the lock, so a racing thread may build a value
    /// that is then discarded in favour of the one already inserted.
    pub fn get_or_add<F>(&self, property: &AnyProperty, factory: F) -> Arc<V>
    where
        F: FnOnce() -> V,
    {
        if let Some(existing) = self.get(property) {
            return existing;
        }
        let candidate = Arc::new(factory());
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let winner = entries.entry(property.id()).or_insert_with(|| {
            debug!(property = property.name(), "populated property cache entry");
            candidate
        });
        Arc::clone(winner)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl<V> Default for PropertyCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for PropertyCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyCache")
            .field("len", &self.len())
            .finish()
    }
}
