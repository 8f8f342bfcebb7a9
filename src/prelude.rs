pub use crate::builder::LoadingCacheBuilder;
pub use crate::cache::{EvictionCallback, LoadingCache, Loader};
pub use crate::error::{ConfigError, LoadError};
pub use crate::policy::lru::LruCore;
pub use crate::traits::{CoreCache, LruCacheTrait, MutableCache};

#[cfg(feature = "metrics")]
pub use crate::metrics::{LoadingMetricsSnapshot, MetricsSnapshotProvider};
