//! Load and hit counters for [`LoadingCache`](crate::cache::LoadingCache).
//!
//! Enabled by the `metrics` feature. Counters are plain atomics so they can
//! be bumped from `&self` methods without touching the structural lock.

pub mod metrics_impl;
pub mod snapshot;
pub mod traits;

pub use metrics_impl::LoadingMetrics;
pub use snapshot::LoadingMetricsSnapshot;
pub use traits::{LoadingMetricsRecorder, MetricsReset, MetricsSnapshotProvider};
