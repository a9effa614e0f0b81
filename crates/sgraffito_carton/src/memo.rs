//! Append-only memoization caches.
//!
//! A [`MemoCache`] maps a key to the first value that was successfully
//! computed for it and keeps it for the lifetime of the cache. Entries are
//! never replaced. Initializers run without any shard lock held, so two
//! callers racing on the same key may both compute a value; only the first
//! one to finish is stored and both callers observe that stored value.

use std::future::Future;
use std::hash::Hash;

use dashmap::DashMap;
use rustc_hash::FxBuildHasher;

/// Concurrent, append-only memoization cache.
pub struct MemoCache<K, V> {
    entries: DashMap<K, V, FxBuildHasher>,
}

impl<K, V> MemoCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            entries: DashMap::with_hasher(FxBuildHasher),
        }
    }

    /// Get a clone of the cached value for `key`
    #[inline]
    pub fn get(&self, key: &K) -> Option<V> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Check whether a value is cached for `key`
    #[inline]
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Get the cached value, computing and storing it on a miss.
    pub fn get_or_insert_with(&self, key: K, init: impl FnOnce() -> V) -> V {
        if let Some(value) = self.get(&key) {
            return value;
        }
        let value = init();
        self.store(key, value)
    }

    /// Fallible variant of [`MemoCache::get_or_insert_with`].
    ///
    /// Errors are returned to the caller and never cached.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: K,
        init: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let value = init()?;
        Ok(self.store(key, value))
    }

    /// Async fallible variant. The initializer future is awaited outside of
    /// any lock.
    pub async fn get_or_try_insert_async<E, F, Fut>(&self, key: K, init: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let value = init().await?;
        Ok(self.store(key, value))
    }

    /// Number of cached entries
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every cached entry
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Insert unless another caller got there first; returns the stored value.
    #[inline]
    fn store(&self, key: K, value: V) -> V {
        self.entries.entry(key).or_insert(value).value().clone()
    }
}

impl<K, V> Default for MemoCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> std::fmt::Debug for MemoCache<K, V>
where
    K: Eq + Hash,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoCache")
            .field("len", &self.entries.len())
            .finish()
    }
}
