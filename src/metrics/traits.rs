//! # Metrics Trait Hierarchy
//!
//! Recording and snapshotting are split into separate traits so the cache
//! only ever writes counters and readers only ever copy them out.
//!
//! ```text
//!   ┌──────────────────────────────┐
//!   │   LoadingMetricsRecorder     │  get / hit / miss / load outcome /
//!   │   (&self, interior atomics)  │  eviction notified
//!   └──────────────┬───────────────┘
//!                  │
//!   Consumption (decoupled from recording):
//!   ┌──────────────────────────────┐    ┌──────────────────────────────┐
//!   │ MetricsSnapshotProvider<S>   │    │ MetricsReset                 │
//!   └──────────────────────────────┘    └──────────────────────────────┘
//! ```

/// Counters recorded by a loading cache.
///
/// All methods take `&self`; implementations use interior mutability because
/// the cache records from many threads at once.
pub trait LoadingMetricsRecorder {
    fn record_get_call(&self);
    fn record_get_hit(&self);
    fn record_get_miss(&self);
    fn record_load_success(&self);
    fn record_load_failure(&self);
    fn record_absent_value(&self);
    fn record_eviction_notified(&self);
}

/// Snapshot provider for bench/testing.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Reset metrics between tests or benchmark iterations.
pub trait MetricsReset {
    fn reset_metrics(&self);
}
