//! Fixed-capacity key/value store with insertion-order eviction.

use std::borrow::Borrow;
use std::hash::Hash;

use indexmap::IndexMap;

/// Capacity used when no explicit bucket size is provided.
pub const DEFAULT_BUCKET_SIZE: usize = 20;

/// Bounded cache that evicts the oldest inserted key once full.
///
/// This is FIFO, not LRU: reading an entry never changes its position and
/// overwriting an existing key keeps the slot it was first inserted into.
#[derive(Debug, Clone)]
pub struct Cache<K, V> {
    store: IndexMap<K, V>,
    bucket_size: usize,
}

impl<K: Hash + Eq, V> Cache<K, V> {
    /// Create a cache holding at most [`DEFAULT_BUCKET_SIZE`] entries.
    pub fn new() -> Self {
        Self::with_bucket_size(DEFAULT_BUCKET_SIZE)
    }

    /// Create a cache holding at most `bucket_size` entries.
    ///
    /// A bucket size of zero falls back to [`DEFAULT_BUCKET_SIZE`].
    pub fn with_bucket_size(bucket_size: usize) -> Self {
        let bucket_size = if bucket_size == 0 {
            DEFAULT_BUCKET_SIZE
        } else {
            bucket_size
        };

        Self {
            store: IndexMap::with_capacity(bucket_size),
            bucket_size,
        }
    }

    /// Maximum number of entries retained.
    pub fn bucket_size(&self) -> usize {
        self.bucket_size
    }

    /// Insert or overwrite `key`.
    ///
    /// When the cache already holds `bucket_size` entries the single oldest
    /// key is evicted first, even if `key` itself is already present.
    pub fn set(&mut self, key: K, value: V) {
        if self.store.len() >= self.bucket_size {
            self.store.shift_remove_index(0);
        }

        self.store.insert(key, value);
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.get(key)
    }

    pub fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.contains_key(key)
    }

    /// Number of entries currently stored.
    pub fn count(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Remove `key`, returning whether it was present.
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.shift_remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.store.clear();
    }

    /// Keys in eviction order, oldest first.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.store.keys()
    }
}

impl<K: Hash + Eq, V> Default for Cache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_and_reads_back_values() {
        let mut cache = Cache::new();
        cache.set("fooKey", "fooValue");

        assert_eq!(cache.get("fooKey"), Some(&"fooValue"));
        assert!(cache.has("fooKey"));
        assert_eq!(cache.bucket_size(), DEFAULT_BUCKET_SIZE);
    }

    #[test]
    fn evicts_oldest_entry_when_full() {
        let mut cache = Cache::with_bucket_size(2);
        cache.set("fooKey", "fooValue");
        cache.set("barKey", "barValue");
        cache.set("bazKey", "bazValue");
        cache.set("totoKey", "totoValue");

        assert_eq!(cache.count(), 2);
        assert_eq!(cache.get("fooKey"), None);
        assert_eq!(cache.get("barKey"), None);
        assert_eq!(
            cache.keys().copied().collect::<Vec<_>>(),
            vec!["bazKey", "totoKey"]
        );
    }

    #[test]
    fn one_past_capacity_drops_only_the_first_key() {
        let mut cache = Cache::with_bucket_size(5);
        for index in 0..6 {
            cache.set(index, index * 10);
        }

        assert_eq!(cache.count(), 5);
        assert!(!cache.has(&0));
        assert!((1..6).all(|index| cache.has(&index)));
    }

    #[test]
    fn reads_do_not_refresh_eviction_order() {
        let mut cache = Cache::with_bucket_size(2);
        cache.set("a", 1);
        cache.set("b", 2);
        assert_eq!(cache.get("a"), Some(&1));

        cache.set("c", 3);

        assert!(!cache.has("a"));
        assert!(cache.has("b"));
        assert!(cache.has("c"));
    }

    #[test]
    fn overwriting_keeps_original_slot() {
        let mut cache = Cache::with_bucket_size(3);
        cache.set("a", 1);
        cache.set("b", 2);
        cache.set("a", 10);

        assert_eq!(cache.count(), 2);
        assert_eq!(cache.get("a"), Some(&10));
        assert_eq!(cache.keys().copied().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn count_tracks_distinct_keys() {
        let mut cache = Cache::new();
        cache.set("fooKey", "fooValue");
        cache.set("barKey", "barValue");
        cache.set("bazKey", "bazValue");
        cache.set("totoKey", "totoValue");

        assert_eq!(cache.count(), 4);
    }

    #[test]
    fn delete_reports_presence() {
        let mut cache = Cache::new();
        cache.set("fooKey", "fooValue");
        cache.set("barKey", "barValue");
        cache.set("bazKey", "bazValue");
        cache.set("totoKey", "totoValue");

        assert!(cache.delete("bazKey"));
        assert!(!cache.delete("bazKey"));
        assert_eq!(cache.get("bazKey"), None);
        assert_eq!(cache.count(), 3);
    }

    #[test]
    fn zero_bucket_size_uses_default() {
        let cache: Cache<String, u8> = Cache::with_bucket_size(0);
        assert_eq!(cache.bucket_size(), DEFAULT_BUCKET_SIZE);
        assert!(cache.is_empty());
    }
}
