//! loadcache: bounded, single-flight loading cache.
//!
//! A [`LoadingCache`] computes each key's value on first request, memoizes
//! it, and evicts least-recently-used keys once it reaches capacity.
//! Concurrent requests for the same missing key run the loader once; requests
//! for other keys are never blocked by an in-flight load.
//!
//! ```
//! use loadcache::prelude::*;
//!
//! let cache = LoadingCache::new(1_000, |id: &u64| {
//!     Ok::<_, std::io::Error>(Some(format!("user-{id}")))
//! });
//!
//! let user = cache.get(&42)?;
//! assert_eq!(user.as_str(), "user-42");
//! # Ok::<(), LoadError<std::io::Error>>(())
//! ```
//!
//! ## Modules
//!
//! | Module       | Contents                                              |
//! |--------------|-------------------------------------------------------|
//! | [`cache`]    | [`LoadingCache`], the thread-safe façade              |
//! | [`builder`]  | [`LoadingCacheBuilder`] for eviction callbacks        |
//! | [`policy`]   | [`LruCore`](policy::lru::LruCore) recency container    |
//! | `ds`         | slot arena, intrusive list, one-shot latch (internal) |
//! | [`error`]    | [`LoadError`], [`ConfigError`], [`InvariantError`]    |
//! | `metrics`    | hit/load counters (feature `metrics`)                 |

pub mod builder;
pub mod cache;
mod ds;
mod entry;
pub mod error;
pub mod policy;
pub mod prelude;
pub mod traits;

#[cfg(feature = "metrics")]
pub mod metrics;

pub use crate::builder::LoadingCacheBuilder;
pub use crate::cache::LoadingCache;
pub use crate::error::{ConfigError, InvariantError, LoadError};
