//! # Bounded Recency Container
//!
//! Fixed-capacity map that keeps its entries in recency order and reports
//! every entry it drops to an optional eviction hook. It is the storage layer
//! underneath [`LoadingCache`](crate::cache::LoadingCache).
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────┐
//!   │                          LruCore<K, V>                           │
//!   │                                                                  │
//!   │   ┌──────────────────────────────┐                               │
//!   │   │ FxHashMap<K, SlotId>         │  key → handle into the list   │
//!   │   └──────────────┬───────────────┘                               │
//!   │                  ▼                                               │
//!   │   ┌──────────────────────────────────────────────────────────┐   │
//!   │   │ IntrusiveList<Node { key, value }>                       │   │
//!   │   │                                                          │   │
//!   │   │ head ──► [C] ◄──► [B] ◄──► [A] ◄── tail                  │   │
//!   │   │          MRU                LRU                          │   │
//!   │   └──────────────────────────────────────────────────────────┘   │
//!   │                                                                  │
//!   │   on_evict: Option<Box<dyn FnMut(&K, &V)>>                       │
//!   └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Eviction Hook
//!
//! The hook fires once for every entry the container physically drops:
//!
//! | Operation            | Hook fires for                      |
//! |----------------------|-------------------------------------|
//! | `insert` (new, full) | the evicted LRU entry               |
//! | `insert` (existing)  | nothing (value replaced in place)   |
//! | `remove`/`remove_if` | the removed entry                   |
//! | `pop_lru`            | the popped entry                    |
//! | `clear`              | every entry, LRU first              |
//!
//! The hook runs after the entry left the index, with the container in a
//! consistent state. It receives references; `remove`/`pop_lru` still hand
//! the owned entry back to the caller.
//!
//! ## Operations
//!
//! | Method           | Complexity | Description                               |
//! |------------------|------------|-------------------------------------------|
//! | `insert(k, v)`   | O(1)*      | Insert or update, may evict LRU           |
//! | `get(&k)`        | O(1)       | Get value, moves to MRU position          |
//! | `peek(&k)`       | O(1)       | Get value without affecting order         |
//! | `remove(&k)`     | O(1)       | Remove entry by key                       |
//! | `remove_if`      | O(1)       | Remove entry if the value matches         |
//! | `pop_lru()`      | O(1)       | Remove least recently used                |
//! | `touch(&k)`      | O(1)       | Move to MRU without returning value       |
//! | `clear()`        | O(n)       | Remove all entries                        |
//!
//! ## Thread Safety
//!
//! `LruCore` is single-threaded. [`LoadingCache`](crate::cache::LoadingCache)
//! wraps it in a `parking_lot::RwLock`.

use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::{IntrusiveList, SlotId};
use crate::error::InvariantError;
use crate::traits::{CoreCache, LruCacheTrait, MutableCache};

/// Callback invoked for every entry the container drops.
pub type EvictionHook<K, V> = Box<dyn FnMut(&K, &V) + Send + Sync>;

/// Upper bound on the slots reserved at construction; larger containers
/// grow on demand.
const INITIAL_RESERVE: usize = 1024;

#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
}

/// Fixed-capacity, recency-ordered map with an eviction hook.
///
/// A capacity of 0 creates a container that accepts no items.
///
/// # Example
///
/// ```
/// use loadcache::policy::lru::LruCore;
/// use loadcache::traits::CoreCache;
/// use std::sync::{Arc, Mutex};
///
/// let evicted = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&evicted);
/// let mut cache = LruCore::with_eviction_hook(2, move |k: &u32, _v: &String| {
///     sink.lock().unwrap().push(*k);
/// });
///
/// cache.insert(1, "a".to_string());
/// cache.insert(2, "b".to_string());
/// cache.get(&1);
/// cache.insert(3, "c".to_string());
///
/// assert_eq!(*evicted.lock().unwrap(), vec![2]);
/// ```
pub struct LruCore<K, V> {
    index: FxHashMap<K, SlotId>,
    order: IntrusiveList<Node<K, V>>,
    capacity: usize,
    on_evict: Option<EvictionHook<K, V>>,
}

impl<K, V> LruCore<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Creates an empty container holding at most `capacity` entries.
    ///
    /// Storage for up to `INITIAL_RESERVE` entries is allocated up front, so
    /// any capacity up to `usize::MAX` is accepted.
    #[inline]
    pub fn new(capacity: usize) -> Self {
        let reserve = capacity.min(INITIAL_RESERVE);
        Self {
            index: FxHashMap::with_capacity_and_hasher(reserve, Default::default()),
            order: IntrusiveList::with_capacity(reserve),
            capacity,
            on_evict: None,
        }
    }

    /// Creates an empty container that reports dropped entries to `hook`.
    pub fn with_eviction_hook<F>(capacity: usize, hook: F) -> Self
    where
        F: FnMut(&K, &V) + Send + Sync + 'static,
    {
        let mut core = Self::new(capacity);
        core.set_eviction_hook(hook);
        core
    }

    /// Installs or replaces the eviction hook.
    pub fn set_eviction_hook<F>(&mut self, hook: F)
    where
        F: FnMut(&K, &V) + Send + Sync + 'static,
    {
        self.on_evict = Some(Box::new(hook));
    }

    /// Read-only lookup that leaves recency order untouched.
    #[inline]
    pub fn peek(&self, key: &K) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.order.get(id).map(|node| &node.value)
    }

    /// Removes the entry for `key` only if `predicate` accepts its value.
    ///
    /// Used to drop a specific value without disturbing a newer one that
    /// replaced it under the same key.
    pub fn remove_if(&mut self, key: &K, predicate: impl FnOnce(&V) -> bool) -> Option<V> {
        let id = *self.index.get(key)?;
        let matches = self
            .order
            .get(id)
            .is_some_and(|node| predicate(&node.value));
        if !matches {
            return None;
        }
        self.unlink(id).map(|(_, value)| value)
    }

    /// Iterates entries from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.order.iter().map(|node| (&node.key, &node.value))
    }

    /// Verifies that the index and the recency list describe the same set.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.index.len() != self.order.len() {
            return Err(InvariantError::new(format!(
                "index holds {} keys but recency list holds {} nodes",
                self.index.len(),
                self.order.len()
            )));
        }
        if self.capacity > 0 && self.index.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "len {} exceeds capacity {}",
                self.index.len(),
                self.capacity
            )));
        }
        for node in self.order.iter() {
            let linked = self
                .index
                .get(&node.key)
                .and_then(|&id| self.order.get(id))
                .is_some_and(|indexed| indexed.key == node.key);
            if !linked {
                return Err(InvariantError::new(
                    "recency list node is not reachable through the index",
                ));
            }
        }
        Ok(())
    }

    fn unlink(&mut self, id: SlotId) -> Option<(K, V)> {
        let node = self.order.remove(id)?;
        self.index.remove(&node.key);
        if let Some(hook) = self.on_evict.as_mut() {
            hook(&node.key, &node.value);
        }
        Some((node.key, node.value))
    }
}

impl<K, V> CoreCache<K, V> for LruCore<K, V>
where
    K: Clone + Eq + Hash,
{
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&id) = self.index.get(&key) {
            self.order.move_to_front(id);
            return self
                .order
                .get_mut(id)
                .map(|node| std::mem::replace(&mut node.value, value));
        }

        if self.capacity == 0 {
            return None;
        }

        if self.index.len() >= self.capacity {
            if let Some(lru) = self.order.back_id() {
                self.unlink(lru);
            }
        }

        let id = self.order.push_front(Node {
            key: key.clone(),
            value,
        });
        self.index.insert(key, id);
        None
    }

    #[inline]
    fn get(&mut self, key: &K) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.order.move_to_front(id);
        self.order.get(id).map(|node| &node.value)
    }

    #[inline]
    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    #[inline]
    fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        while self.pop_lru().is_some() {}
        self.index.clear();
        self.order.clear();
    }
}

impl<K, V> MutableCache<K, V> for LruCore<K, V>
where
    K: Clone + Eq + Hash,
{
    #[inline]
    fn remove(&mut self, key: &K) -> Option<V> {
        let id = *self.index.get(key)?;
        self.unlink(id).map(|(_, value)| value)
    }
}

impl<K, V> LruCacheTrait<K, V> for LruCore<K, V>
where
    K: Clone + Eq + Hash,
{
    #[inline]
    fn pop_lru(&mut self) -> Option<(K, V)> {
        let id = self.order.back_id()?;
        self.unlink(id)
    }

    #[inline]
    fn touch(&mut self, key: &K) -> bool {
        match self.index.get(key) {
            Some(&id) => self.order.move_to_front(id),
            None => false,
        }
    }
}

impl<K, V> fmt::Debug for LruCore<K, V>
where
    K: Clone + Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCore")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("has_eviction_hook", &self.on_evict.is_some())
            .finish_non_exhaustive()
    }
}
