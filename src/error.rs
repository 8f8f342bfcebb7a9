//! Error types for the loadcache library.
//!
//! ## Key Components
//!
//! - [`LoadError`]: Returned by [`LoadingCache::get`](crate::cache::LoadingCache::get)
//!   when a value could not be loaded. Every caller waiting on the same load
//!   receives a clone of the same error.
//! - [`ConfigError`]: Returned when cache configuration parameters are invalid
//!   (e.g. zero capacity).
//! - [`InvariantError`]: Returned when internal data-structure invariants are
//!   violated (debug-only `check_invariants` methods).
//!
//! ## Example Usage
//!
//! ```
//! use loadcache::cache::LoadingCache;
//! use loadcache::error::LoadError;
//!
//! let bad = LoadingCache::<u32, u32, std::io::Error>::try_new(0, |k: &u32| Ok(Some(*k)));
//! assert!(bad.is_err());
//!
//! let cache = LoadingCache::new(8, |_: &u32| Ok::<Option<u32>, std::io::Error>(None));
//! let err = cache.get(&7).unwrap_err();
//! assert!(matches!(err, LoadError::Absent { .. }));
//! assert_eq!(err.to_string(), "can't load value of key: [7]");
//! ```

use std::error::Error;
use std::fmt;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// LoadError
// ---------------------------------------------------------------------------

/// Error returned when a key's value could not be loaded.
///
/// The failed entry is always discarded, so the next `get` for the same key
/// starts a fresh load.
///
/// Every variant carries the key rendered with its `Debug` impl (`{:?}`), so
/// string keys appear quoted: `can't load value of key: ["user:7"]`.
#[derive(Debug)]
pub enum LoadError<E> {
    /// The loader returned an error. `source` is the loader's error, shared
    /// by every caller that waited on this load.
    Loader { key: String, source: Arc<E> },
    /// The loader returned no value and no error.
    Absent { key: String },
    /// The loader panicked while loading this key.
    Panicked { key: String },
}

impl<E> LoadError<E> {
    /// The failed key, formatted with `{:?}`.
    ///
    /// ```
    /// use loadcache::LoadError;
    ///
    /// let err: LoadError<std::io::Error> = LoadError::Absent {
    ///     key: format!("{:?}", "user:7"),
    /// };
    /// assert_eq!(err.key(), "\"user:7\"");
    /// ```
    pub fn key(&self) -> &str {
        match self {
            Self::Loader { key, .. } | Self::Absent { key } | Self::Panicked { key } => key,
        }
    }

    /// The loader's own error, if the loader returned one.
    pub fn loader_error(&self) -> Option<&Arc<E>> {
        match self {
            Self::Loader { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl<E> Clone for LoadError<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Loader { key, source } => Self::Loader {
                key: key.clone(),
                source: Arc::clone(source),
            },
            Self::Absent { key } => Self::Absent { key: key.clone() },
            Self::Panicked { key } => Self::Panicked { key: key.clone() },
        }
    }
}

impl<E: fmt::Display> fmt::Display for LoadError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loader { key, source } => write!(f, "failed to load key [{key}]: {source}"),
            Self::Absent { key } => write!(f, "can't load value of key: [{key}]"),
            Self::Panicked { key } => write!(f, "loader panicked for key: [{key}]"),
        }
    }
}

impl<E> Error for LoadError<E>
where
    E: Error + 'static,
{
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Loader { source, .. } => Some(&**source),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by fallible constructors such as
/// [`LoadingCache::try_new`](crate::cache::LoadingCache::try_new) and
/// [`LoadingCacheBuilder::try_build`](crate::builder::LoadingCacheBuilder::try_build).
///
/// # Example
///
/// ```
/// use loadcache::cache::LoadingCache;
///
/// let err = LoadingCache::<u64, u64, std::io::Error>::try_new(0, |k: &u64| Ok(Some(*k)))
///     .unwrap_err();
/// assert!(err.to_string().contains("capacity"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for ConfigError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal container invariants are violated.
///
/// Produced by [`LruCore::check_invariants`](crate::policy::lru::LruCore::check_invariants).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for InvariantError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
