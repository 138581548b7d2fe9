//! Memoized fulfillments keyed by order and catalog version.

use std::time::Duration;

use moka::sync::Cache;

use crate::types::Fulfillment;

/// Cache key: order quantity and the catalog version it was solved against.
pub type CacheKey = (u64, u64);

/// TTL-bounded cache of solved orders.
///
/// Entries carry the catalog version in their key, so an entry from an older
/// catalog can never answer a lookup for a newer one. The service also flushes
/// the cache on every catalog change to free the memory early.
#[derive(Clone)]
pub struct ResultCache {
    cache: Cache<CacheKey, Fulfillment>,
}

impl ResultCache {
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();

        Self { cache }
    }

    pub fn get(&self, order: u64, version: u64) -> Option<Fulfillment> {
        self.cache.get(&(order, version))
    }

    pub fn insert(&self, order: u64, version: u64, fulfillment: Fulfillment) {
        self.cache.insert((order, version), fulfillment);
    }

    pub fn clear(&self) {
        self.cache.invalidate_all();
    }

    /// Approximate number of live entries.
    pub fn len(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let cache = ResultCache::new(100, Duration::from_secs(60));
        let f = Fulfillment::single(250, 1);
        cache.insert(1, 0, f.clone());
        assert_eq!(cache.get(1, 0), Some(f));
    }

    #[test]
    fn test_other_version_misses() {
        let cache = ResultCache::new(100, Duration::from_secs(60));
        cache.insert(1, 0, Fulfillment::single(250, 1));
        assert_eq!(cache.get(1, 1), None);
    }

    #[test]
    fn test_clear_invalidates_entries() {
        let cache = ResultCache::new(100, Duration::from_secs(60));
        cache.insert(1, 0, Fulfillment::single(250, 1));
        cache.insert(2, 0, Fulfillment::single(250, 1));
        cache.clear();
        assert_eq!(cache.get(1, 0), None);
        assert_eq!(cache.get(2, 0), None);
    }

    #[test]
    fn test_expired_entries_are_not_served() {
        let cache = ResultCache::new(100, Duration::from_millis(20));
        cache.insert(1, 0, Fulfillment::single(250, 1));
        std::thread::sleep(Duration::from_millis(60));
        assert_eq!(cache.get(1, 0), None);
    }
}
