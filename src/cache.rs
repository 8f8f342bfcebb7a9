//! # Loading Cache
//!
//! Bounded, thread-safe cache that computes each key's value on first request
//! and memoizes it. Concurrent requests for the same missing key share one
//! load; requests for other keys are never blocked by it.
//!
//! ## Architecture
//!
//! ```text
//!   get(&k)
//!     │
//!     ▼
//!   ┌────────────────────────────────────────────────────────────────┐
//!   │ RwLock<LruCore<K, Arc<Entry>>>                                 │
//!   │                                                                │
//!   │  read():  peek(k) ── hit ──► push k onto access log            │
//!   │              │                                                 │
//!   │             miss                                               │
//!   │              ▼                                                 │
//!   │  write(): replay access log (touch) ─► get(k) ─► insert Entry  │
//!   └──────────────────────────────┬─────────────────────────────────┘
//!                                  │ Arc<Entry> (lock released)
//!                                  ▼
//!   ┌────────────────────────────────────────────────────────────────┐
//!   │ Entry::get_or_load                                             │
//!   │   Invalid ─CAS─► Loading ─► loader(k) ─► Active / discarded    │
//!   │   Loading        wait on latch                                 │
//!   │   Active         return Arc<V>                                 │
//!   └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Recency Under Shared Access
//!
//! Hits found under the shared lock cannot reorder the recency list. They are
//! appended to a short access log instead, and every exclusive section replays
//! the log (`touch`) before doing structural work. Eviction therefore always
//! sees strict LRU order. A reader that fills the log drains it itself.
//!
//! ## Eviction Notification
//!
//! The container reports every entry it drops. The cache forwards the drop to
//! the `on_evicted` callback only if the entry holds a loaded value; entries
//! still loading, or discarded after a failed load, are dropped silently.
//! The callback runs under the exclusive lock and must not call back into the
//! same cache.
//!
//! ## Example
//!
//! ```
//! use loadcache::cache::LoadingCache;
//! use std::sync::Arc;
//!
//! let cache = LoadingCache::new(2, |k: &u32| Ok::<_, std::io::Error>(Some(k * 10)));
//!
//! assert_eq!(cache.get(&1).unwrap(), Arc::new(10));
//! assert_eq!(*cache.get(&2).unwrap(), 20);
//! assert_eq!(cache.len(), 2);
//!
//! cache.get(&3).unwrap();
//! assert!(!cache.contains(&1));
//! ```

use std::error::Error;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock, RwLockWriteGuard};
use tracing::{debug, trace};

use crate::builder::LoadingCacheBuilder;
use crate::entry::Entry;
#[cfg(feature = "metrics")]
use crate::entry::Status;
use crate::error::{ConfigError, LoadError};
#[cfg(feature = "metrics")]
use crate::metrics::{
    LoadingMetrics, LoadingMetricsRecorder, LoadingMetricsSnapshot, MetricsSnapshotProvider,
};
use crate::policy::lru::LruCore;
use crate::traits::{CoreCache, LruCacheTrait, MutableCache};

/// Number of logged hits after which a reader replays the log itself.
pub const ACCESS_LOG_CAPACITY: usize = 128;

/// Computes the value for a key. `Ok(None)` means the key has no value.
pub type Loader<K, V, E> = Box<dyn Fn(&K) -> Result<Option<V>, E> + Send + Sync>;

/// Called with each loaded entry the cache drops.
pub type EvictionCallback<K, V> = Box<dyn Fn(&K, &V) + Send + Sync>;

type Slots<K, V, E> = LruCore<K, Arc<Entry<V, E>>>;

/// Bounded, single-flight loading cache.
///
/// See the [module documentation](self) for the locking scheme.
pub struct LoadingCache<K, V, E> {
    slots: RwLock<Slots<K, V, E>>,
    access_log: Mutex<Vec<K>>,
    loader: Loader<K, V, E>,
    #[cfg(feature = "metrics")]
    metrics: Arc<LoadingMetrics>,
}

impl<K, V, E> LoadingCache<K, V, E>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
    E: Error + Send + Sync + 'static,
{
    /// Creates a cache holding at most `capacity` keys.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0. For a non-panicking alternative, use
    /// [`try_new`](Self::try_new).
    pub fn new<F>(capacity: usize, loader: F) -> Self
    where
        F: Fn(&K) -> Result<Option<V>, E> + Send + Sync + 'static,
    {
        match Self::try_new(capacity, loader) {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    /// Creates a cache, returning an error on invalid parameters instead of
    /// panicking.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `capacity` is 0.
    pub fn try_new<F>(capacity: usize, loader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&K) -> Result<Option<V>, E> + Send + Sync + 'static,
    {
        Self::from_parts(capacity, Box::new(loader), None)
    }

    /// Returns a builder for configuring the cache.
    ///
    /// # Example
    ///
    /// ```
    /// use loadcache::cache::LoadingCache;
    /// use std::sync::{Arc, Mutex};
    ///
    /// let evicted = Arc::new(Mutex::new(Vec::new()));
    /// let sink = Arc::clone(&evicted);
    ///
    /// let cache = LoadingCache::builder(1)
    ///     .on_evicted(move |k: &u32, v: &String| sink.lock().unwrap().push((*k, v.clone())))
    ///     .build(|k: &u32| Ok::<_, std::io::Error>(Some(k.to_string())));
    ///
    /// cache.get(&1).unwrap();
    /// cache.get(&22).unwrap();
    /// assert_eq!(*evicted.lock().unwrap(), vec![(1, "1".to_string())]);
    /// ```
    pub fn builder(capacity: usize) -> LoadingCacheBuilder<K, V, E> {
        LoadingCacheBuilder::new(capacity)
    }

    pub(crate) fn from_parts(
        capacity: usize,
        loader: Loader<K, V, E>,
        on_evicted: Option<EvictionCallback<K, V>>,
    ) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("loading cache capacity must be > 0"));
        }

        #[cfg(feature = "metrics")]
        let metrics = Arc::new(LoadingMetrics::new());

        let slots = match on_evicted {
            Some(callback) => {
                #[cfg(feature = "metrics")]
                let metrics = Arc::clone(&metrics);
                LruCore::with_eviction_hook(capacity, move |key: &K, entry: &Arc<Entry<V, E>>| {
                    // Only loaded entries are reported.
                    if let Some(value) = entry.active_value() {
                        debug!("notifying eviction");
                        #[cfg(feature = "metrics")]
                        metrics.record_eviction_notified();
                        callback(key, &value);
                    }
                })
            },
            None => LruCore::new(capacity),
        };

        Ok(Self {
            slots: RwLock::new(slots),
            access_log: Mutex::new(Vec::with_capacity(ACCESS_LOG_CAPACITY)),
            loader,
            #[cfg(feature = "metrics")]
            metrics,
        })
    }

    /// Returns the value for `key`, loading it if needed.
    ///
    /// At most one caller runs the loader for a given entry; concurrent
    /// callers for the same key block until that load settles and then
    /// receive the same value or a clone of the same error.
    ///
    /// # Errors
    ///
    /// - [`LoadError::Loader`] if the loader returned an error,
    /// - [`LoadError::Absent`] if it returned `Ok(None)`,
    /// - [`LoadError::Panicked`] if it panicked while this caller waited.
    ///
    /// The failed entry is discarded, so a later call loads again.
    pub fn get(&self, key: &K) -> Result<Arc<V>, LoadError<E>>
    where
        K: fmt::Debug,
    {
        let entry = self.entry(key);

        #[cfg(feature = "metrics")]
        {
            self.metrics.record_get_call();
            if entry.status() == Status::Active {
                self.metrics.record_get_hit();
            } else {
                self.metrics.record_get_miss();
            }
        }

        entry.get_or_load(
            key,
            |key| {
                let loaded = (self.loader)(key);
                #[cfg(feature = "metrics")]
                match &loaded {
                    Ok(Some(_)) => self.metrics.record_load_success(),
                    Ok(None) => self.metrics.record_absent_value(),
                    Err(_) => self.metrics.record_load_failure(),
                }
                loaded
            },
            || self.discard(key, &entry),
        )
    }

    /// Removes `key` if present. Returns whether an entry was removed.
    pub fn remove(&self, key: &K) -> bool {
        self.write().remove(key).is_some()
    }

    /// Removes the least recently used entry. Returns `false` if empty.
    pub fn remove_oldest(&self) -> bool {
        self.write().pop_lru().is_some()
    }

    /// Removes up to `n` entries, least recently used first, in one
    /// exclusive section. Returns how many were removed.
    pub fn remove_oldest_n(&self, n: usize) -> usize {
        let mut slots = self.write();
        (0..n).take_while(|_| slots.pop_lru().is_some()).count()
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.write().clear();
    }

    /// Number of entries, including ones still loading.
    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.read().capacity()
    }

    /// Whether an entry exists for `key`, loaded or loading.
    ///
    /// Does not affect recency.
    pub fn contains(&self, key: &K) -> bool {
        self.slots.read().contains(key)
    }

    /// Loaded value for `key`, without loading and without affecting recency.
    pub fn peek(&self, key: &K) -> Option<Arc<V>> {
        self.slots.read().peek(key).and_then(|entry| entry.value())
    }

    /// Finds or creates the entry for `key`.
    fn entry(&self, key: &K) -> Arc<Entry<V, E>> {
        {
            let slots = self.slots.read();
            if let Some(entry) = slots.peek(key) {
                let entry = Arc::clone(entry);
                let log_full = {
                    let mut log = self.access_log.lock();
                    log.push(key.clone());
                    log.len() >= ACCESS_LOG_CAPACITY
                };
                drop(slots);
                if log_full {
                    drop(self.write());
                }
                return entry;
            }
        }

        let mut slots = self.write();
        if let Some(entry) = slots.get(key) {
            return Arc::clone(entry);
        }
        trace!("creating entry");
        let entry = Arc::new(Entry::new());
        slots.insert(key.clone(), Arc::clone(&entry));
        entry
    }

    /// Unlinks `entry` after a failed load, unless a newer entry already
    /// replaced it.
    fn discard(&self, key: &K, entry: &Arc<Entry<V, E>>) {
        self.write()
            .remove_if(key, |current| Arc::ptr_eq(current, entry));
    }

    /// Takes the exclusive lock and applies pending recency updates.
    fn write(&self) -> RwLockWriteGuard<'_, Slots<K, V, E>> {
        let mut slots = self.slots.write();
        let mut log = self.access_log.lock();
        if !log.is_empty() {
            trace!(pending = log.len(), "replaying access log");
            for key in log.drain(..) {
                slots.touch(&key);
            }
        }
        drop(log);
        slots
    }
}

#[cfg(feature = "metrics")]
impl<K, V, E> LoadingCache<K, V, E>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
    E: Error + Send + Sync + 'static,
{
    pub fn metrics_snapshot(&self) -> LoadingMetricsSnapshot {
        let slots = self.slots.read();
        self.metrics.snapshot(slots.len(), slots.capacity())
    }
}

#[cfg(feature = "metrics")]
impl<K, V, E> MetricsSnapshotProvider<LoadingMetricsSnapshot> for LoadingCache<K, V, E>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
    E: Error + Send + Sync + 'static,
{
    fn snapshot(&self) -> LoadingMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V, E> fmt::Debug for LoadingCache<K, V, E>
where
    K: Clone + Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.slots.read();
        f.debug_struct("LoadingCache")
            .field("len", &slots.len())
            .field("capacity", &slots.capacity())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Evicted = Arc<Mutex<Vec<(u32, String)>>>;

    fn counting(capacity: usize) -> (LoadingCache<u32, String, io::Error>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let cache = LoadingCache::new(capacity, move |k: &u32| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Some(format!("v{k}")))
        });
        (cache, calls)
    }

    fn recording(capacity: usize) -> (LoadingCache<u32, String, io::Error>, Evicted) {
        let evicted: Evicted = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&evicted);
        let cache = LoadingCache::builder(capacity)
            .on_evicted(move |k: &u32, v: &String| sink.lock().push((*k, v.clone())))
            .build(|k: &u32| Ok(Some(format!("v{k}"))));
        (cache, evicted)
    }

    mod construction {
        use super::*;

        #[test]
        fn zero_capacity_is_rejected() {
            let err = LoadingCache::<u32, u32, io::Error>::try_new(0, |k| Ok(Some(*k)))
                .unwrap_err();
            assert!(err.message().contains("capacity"));
        }

        #[test]
        #[should_panic(expected = "capacity")]
        fn new_panics_on_zero_capacity() {
            let _ = LoadingCache::<u32, u32, io::Error>::new(0, |k| Ok(Some(*k)));
        }

        #[test]
        fn reports_configuration() {
            let (cache, _) = counting(4);
            assert_eq!(cache.capacity(), 4);
            assert!(cache.is_empty());
            assert!(format!("{cache:?}").contains("capacity: 4"));
        }

        #[test]
        fn unbounded_capacity_builds_without_reserving() {
            let cache = LoadingCache::<u32, u32, io::Error>::try_new(usize::MAX, |k| Ok(Some(*k)))
                .unwrap();
            assert_eq!(cache.capacity(), usize::MAX);

            for k in 0..2_000 {
                assert_eq!(*cache.get(&k).unwrap(), k);
            }
            assert_eq!(cache.len(), 2_000);

            let built = LoadingCache::builder(usize::MAX)
                .on_evicted(|_: &u32, _: &u32| {})
                .build(|k: &u32| Ok::<_, io::Error>(Some(*k)));
            assert_eq!(*built.get(&9).unwrap(), 9);
        }
    }

    mod loading {
        use super::*;

        #[test]
        fn memoizes_loaded_values() {
            let (cache, calls) = counting(4);

            let first = cache.get(&1).unwrap();
            let second = cache.get(&1).unwrap();

            assert!(Arc::ptr_eq(&first, &second));
            assert_eq!(first.as_str(), "v1");
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }

        #[test]
        fn absent_value_is_not_cached() {
            let calls = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&calls);
            let cache = LoadingCache::new(4, move |_: &u32| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<Option<u32>, io::Error>(None)
            });

            let err = cache.get(&5).unwrap_err();
            assert_eq!(err.to_string(), "can't load value of key: [5]");
            assert!(!cache.contains(&5));

            assert!(cache.get(&5).is_err());
            assert_eq!(calls.load(Ordering::SeqCst), 2);
        }

        #[test]
        fn loader_error_is_exposed_as_source() {
            let cache = LoadingCache::new(4, |_: &u32| {
                Err::<Option<u32>, _>(io::Error::new(io::ErrorKind::NotFound, "no such row"))
            });

            let err = cache.get(&1).unwrap_err();
            let source = err.source().expect("loader error");
            assert_eq!(source.to_string(), "no such row");
            assert_eq!(err.loader_error().unwrap().kind(), io::ErrorKind::NotFound);
            assert!(cache.is_empty());
        }

        #[test]
        fn peek_does_not_load() {
            let (cache, calls) = counting(4);
            assert!(cache.peek(&1).is_none());
            assert_eq!(calls.load(Ordering::SeqCst), 0);

            cache.get(&1).unwrap();
            assert_eq!(cache.peek(&1).as_deref().map(String::as_str), Some("v1"));
        }
    }

    mod recency {
        use super::*;

        #[test]
        fn shared_hits_protect_from_eviction() {
            let (cache, evicted) = recording(3);
            for k in 1..=3 {
                cache.get(&k).unwrap();
            }
            // Hit 1 on the shared path; it must be replayed before eviction.
            cache.get(&1).unwrap();
            cache.get(&4).unwrap();

            assert!(cache.contains(&1));
            assert!(!cache.contains(&2));
            assert_eq!(*evicted.lock(), vec![(2, "v2".to_string())]);
        }

        #[test]
        fn peek_and_contains_do_not_refresh() {
            let (cache, _) = recording(2);
            cache.get(&1).unwrap();
            cache.get(&2).unwrap();
            assert!(cache.contains(&1));
            assert!(cache.peek(&1).is_some());

            cache.get(&3).unwrap();
            assert!(!cache.contains(&1));
        }

        #[test]
        fn full_access_log_is_drained_by_reader() {
            let (cache, _) = counting(2);
            cache.get(&1).unwrap();
            for _ in 0..ACCESS_LOG_CAPACITY {
                cache.get(&1).unwrap();
            }
            assert!(cache.access_log.lock().is_empty());
        }
    }

    mod removal {
        use super::*;

        #[test]
        fn remove_is_idempotent_and_notifies_once() {
            let (cache, evicted) = recording(4);
            cache.get(&1).unwrap();

            assert!(cache.remove(&1));
            assert!(!cache.remove(&1));
            assert!(!cache.remove(&9));
            assert_eq!(*evicted.lock(), vec![(1, "v1".to_string())]);
        }

        #[test]
        fn remove_oldest_follows_recency() {
            let (cache, evicted) = recording(4);
            for k in 1..=3 {
                cache.get(&k).unwrap();
            }
            cache.get(&1).unwrap();

            assert!(cache.remove_oldest());
            assert_eq!(cache.remove_oldest_n(5), 2);
            assert!(!cache.remove_oldest());
            assert_eq!(cache.remove_oldest_n(1), 0);

            let keys: Vec<_> = evicted.lock().iter().map(|(k, _)| *k).collect();
            assert_eq!(keys, vec![2, 3, 1]);
        }

        #[test]
        fn clear_notifies_every_loaded_entry() {
            let (cache, evicted) = recording(4);
            for k in 1..=3 {
                cache.get(&k).unwrap();
            }
            cache.clear();

            assert!(cache.is_empty());
            assert_eq!(evicted.lock().len(), 3);
        }

        #[test]
        fn reload_after_remove() {
            let (cache, calls) = counting(4);
            cache.get(&1).unwrap();
            cache.remove(&1);
            cache.get(&1).unwrap();
            assert_eq!(calls.load(Ordering::SeqCst), 2);
        }
    }

    #[cfg(feature = "metrics")]
    mod metrics {
        use super::*;

        #[test]
        fn snapshot_counts_hits_misses_and_loads() {
            let (cache, _) = recording(1);
            cache.get(&1).unwrap();
            cache.get(&1).unwrap();
            cache.get(&2).unwrap();

            let snapshot = cache.snapshot();
            assert_eq!(snapshot.get_calls, 3);
            assert_eq!(snapshot.hits, 1);
            assert_eq!(snapshot.misses, 2);
            assert_eq!(snapshot.loads, 2);
            assert_eq!(snapshot.load_successes, 2);
            assert_eq!(snapshot.evictions_notified, 1);
            assert_eq!(snapshot.cache_len, 1);
            assert_eq!(snapshot.capacity, 1);
        }

        #[test]
        fn snapshot_counts_absent_values() {
            let cache = LoadingCache::new(2, |_: &u32| Ok::<Option<u32>, io::Error>(None));
            let _ = cache.get(&1);

            let snapshot = cache.metrics_snapshot();
            assert_eq!(snapshot.load_failures, 1);
            assert_eq!(snapshot.absent_values, 1);
            assert_eq!(snapshot.hit_rate(), 0.0);
        }
    }
}
