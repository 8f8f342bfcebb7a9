//! Builder for [`LoadingCache`].
//!
//! ## Example
//!
//! ```rust
//! use loadcache::builder::LoadingCacheBuilder;
//!
//! let cache = LoadingCacheBuilder::new(100)
//!     .on_evicted(|key: &u64, value: &String| println!("dropped {key} = {value}"))
//!     .build(|key: &u64| Ok::<_, std::io::Error>(Some(format!("row {key}"))));
//!
//! assert_eq!(cache.get(&7).unwrap().as_str(), "row 7");
//! ```

use std::error::Error;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

use crate::cache::{EvictionCallback, LoadingCache};
use crate::error::ConfigError;

/// Builder for configuring a [`LoadingCache`].
pub struct LoadingCacheBuilder<K, V, E> {
    capacity: usize,
    on_evicted: Option<EvictionCallback<K, V>>,
    _loader_error: PhantomData<fn() -> E>,
}

impl<K, V, E> LoadingCacheBuilder<K, V, E>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
    E: Error + Send + Sync + 'static,
{
    /// Creates a builder for a cache holding at most `capacity` keys.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            on_evicted: None,
            _loader_error: PhantomData,
        }
    }

    /// Sets the callback invoked for each loaded entry the cache drops.
    ///
    /// The callback runs while the cache's exclusive lock is held and must
    /// not call back into the same cache.
    pub fn on_evicted<F>(mut self, callback: F) -> Self
    where
        F: Fn(&K, &V) + Send + Sync + 'static,
    {
        self.on_evicted = Some(Box::new(callback));
        self
    }

    /// Builds the cache around `loader`.
    ///
    /// # Panics
    ///
    /// Panics if the configured capacity is 0. For a non-panicking
    /// alternative, use [`try_build`](Self::try_build).
    pub fn build<F>(self, loader: F) -> LoadingCache<K, V, E>
    where
        F: Fn(&K) -> Result<Option<V>, E> + Send + Sync + 'static,
    {
        match self.try_build(loader) {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    /// Builds the cache, returning an error on invalid parameters instead of
    /// panicking.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configured capacity is 0.
    ///
    /// # Example
    ///
    /// ```
    /// use loadcache::builder::LoadingCacheBuilder;
    ///
    /// let cache = LoadingCacheBuilder::new(0)
    ///     .try_build(|key: &u32| Ok::<_, std::io::Error>(Some(*key)));
    /// assert!(cache.is_err());
    /// ```
    pub fn try_build<F>(self, loader: F) -> Result<LoadingCache<K, V, E>, ConfigError>
    where
        F: Fn(&K) -> Result<Option<V>, E> + Send + Sync + 'static,
    {
        LoadingCache::from_parts(self.capacity, Box::new(loader), self.on_evicted)
    }
}

impl<K, V, E> fmt::Debug for LoadingCacheBuilder<K, V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadingCacheBuilder")
            .field("capacity", &self.capacity)
            .field("on_evicted", &self.on_evicted.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_build_without_callback() {
        let cache = LoadingCacheBuilder::new(2).build(|k: &u64| Ok::<_, io::Error>(Some(k * 2)));

        assert_eq!(cache.capacity(), 2);
        assert_eq!(*cache.get(&21).unwrap(), 42);
        cache.get(&1).unwrap();
        cache.get(&2).unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_callback_is_wired_to_evictions() {
        let notified = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&notified);

        let cache = LoadingCacheBuilder::new(1)
            .on_evicted(move |_: &u64, _: &u64| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .build(|k: &u64| Ok::<_, io::Error>(Some(*k)));

        cache.get(&1).unwrap();
        cache.get(&2).unwrap();
        cache.remove(&2);

        assert_eq!(notified.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_try_build_rejects_zero_capacity() {
        let result = LoadingCacheBuilder::new(0).try_build(|k: &u64| Ok::<_, io::Error>(Some(*k)));
        assert!(result.is_err());
    }

    #[test]
    #[should_panic(expected = "capacity must be > 0")]
    fn test_build_panics_on_zero_capacity() {
        let _ = LoadingCacheBuilder::new(0).build(|k: &u64| Ok::<_, io::Error>(Some(*k)));
    }

    #[test]
    fn test_debug_shows_configuration() {
        let builder = LoadingCacheBuilder::<u64, u64, io::Error>::new(8).on_evicted(|_, _| {});
        let rendered = format!("{builder:?}");
        assert!(rendered.contains("capacity: 8"));
        assert!(rendered.contains("on_evicted: true"));
    }
}
