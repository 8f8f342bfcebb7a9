//! Recency containers.
//!
//! [`lru::LruCore`] is the bounded storage underneath
//! [`LoadingCache`](crate::cache::LoadingCache).

pub mod lru;
