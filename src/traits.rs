//! # Container Trait Hierarchy
//!
//! Traits implemented by the bounded recency container that backs
//! [`LoadingCache`](crate::cache::LoadingCache). The loading cache itself is a
//! façade over these operations plus the per-key load protocol.
//!
//! ## Architecture
//!
//! ```text
//!   ┌─────────────────────────────────────────┐
//!   │            CoreCache<K, V>              │
//!   │                                         │
//!   │  insert(&mut, K, V) → Option<V>         │
//!   │  get(&mut, &K) → Option<&V>             │
//!   │  contains(&, &K) → bool                 │
//!   │  len / is_empty / capacity / clear      │
//!   └──────────────────┬──────────────────────┘
//!                      │
//!                      ▼
//!   ┌─────────────────────────────────────────┐
//!   │           MutableCache<K, V>            │
//!   │  remove(&K) → Option<V>                 │
//!   └──────────────────┬──────────────────────┘
//!                      │
//!                      ▼
//!   ┌─────────────────────────────────────────┐
//!   │          LruCacheTrait<K, V>            │
//!   │  pop_lru() → (K, V)                     │
//!   │  touch(&K) → bool                       │
//!   └─────────────────────────────────────────┘
//! ```
//!
//! ## Trait Summary
//!
//! | Trait           | Extends        | Purpose                            |
//! |-----------------|----------------|------------------------------------|
//! | `CoreCache`     | -              | Universal container operations     |
//! | `MutableCache`  | `CoreCache`    | Adds arbitrary key removal         |
//! | `LruCacheTrait` | `MutableCache` | Recency-ordered eviction and touch |

/// Core container operations.
///
/// # Example
///
/// ```
/// use loadcache::policy::lru::LruCore;
/// use loadcache::traits::CoreCache;
///
/// fn warm<C: CoreCache<u64, String>>(cache: &mut C, data: &[(u64, String)]) {
///     for (key, value) in data {
///         cache.insert(*key, value.clone());
///     }
/// }
///
/// let mut cache = LruCore::new(100);
/// warm(&mut cache, &[(1, "one".to_string()), (2, "two".to_string())]);
/// assert_eq!(cache.len(), 2);
/// ```
pub trait CoreCache<K, V> {
    /// Inserts a key-value pair, returning the previous value if it existed.
    ///
    /// If the container is full and `key` is new, the least valuable entry is
    /// evicted first.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Gets a reference to a value by key, updating access order.
    ///
    /// # Example
    ///
    /// ```
    /// use loadcache::policy::lru::LruCore;
    /// use loadcache::traits::CoreCache;
    ///
    /// let mut cache = LruCore::new(10);
    /// cache.insert(1, "value");
    ///
    /// assert_eq!(cache.get(&1), Some(&"value"));
    /// assert_eq!(cache.get(&99), None);
    /// ```
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Checks if a key exists without updating access order.
    fn contains(&self, key: &K) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries.
    fn capacity(&self) -> usize;

    /// Removes all entries.
    fn clear(&mut self);
}

/// Containers that support arbitrary key-based removal.
pub trait MutableCache<K, V>: CoreCache<K, V> {
    /// Removes a specific key-value pair.
    ///
    /// # Example
    ///
    /// ```
    /// use loadcache::policy::lru::LruCore;
    /// use loadcache::traits::{CoreCache, MutableCache};
    ///
    /// let mut cache = LruCore::new(10);
    /// cache.insert(1, "value");
    ///
    /// assert_eq!(cache.remove(&1), Some("value"));
    /// assert_eq!(cache.remove(&1), None);
    /// ```
    fn remove(&mut self, key: &K) -> Option<V>;
}

/// LRU-specific operations that respect access order.
///
/// # Example
///
/// ```
/// use loadcache::policy::lru::LruCore;
/// use loadcache::traits::{CoreCache, LruCacheTrait};
///
/// let mut cache = LruCore::new(3);
/// cache.insert(1, "first");
/// cache.insert(2, "second");
/// cache.insert(3, "third");
///
/// // Access key 1 to make it MRU
/// cache.get(&1);
/// assert!(cache.touch(&2));
/// assert_eq!(cache.pop_lru(), Some((3, "third")));
/// assert_eq!(cache.pop_lru(), Some((1, "first")));
/// ```
pub trait LruCacheTrait<K, V>: MutableCache<K, V> {
    /// Removes and returns the least recently used entry.
    fn pop_lru(&mut self) -> Option<(K, V)>;

    /// Marks an entry as most recently used without retrieving it.
    ///
    /// Returns `false` if the key is not present.
    fn touch(&mut self, key: &K) -> bool;
}
