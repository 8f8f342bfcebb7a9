use std::sync::atomic::{AtomicU64, Ordering};

use crate::metrics::snapshot::LoadingMetricsSnapshot;
use crate::metrics::traits::{LoadingMetricsRecorder, MetricsReset};

/// Relaxed atomic counter.
#[derive(Debug, Default)]
struct Counter(AtomicU64);

impl Counter {
    #[inline]
    fn incr(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    #[inline]
    fn reset(&self) {
        self.0.store(0, Ordering::Relaxed);
    }
}

#[derive(Debug, Default)]
pub struct LoadingMetrics {
    get_calls: Counter,
    hits: Counter,
    misses: Counter,
    load_successes: Counter,
    load_failures: Counter,
    absent_values: Counter,
    evictions_notified: Counter,
}

impl LoadingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies the counters out, adding the gauges sampled by the caller.
    pub fn snapshot(&self, cache_len: usize, capacity: usize) -> LoadingMetricsSnapshot {
        let load_successes = self.load_successes.get();
        let load_failures = self.load_failures.get();
        LoadingMetricsSnapshot {
            get_calls: self.get_calls.get(),
            hits: self.hits.get(),
            misses: self.misses.get(),
            loads: load_successes + load_failures,
            load_successes,
            load_failures,
            absent_values: self.absent_values.get(),
            evictions_notified: self.evictions_notified.get(),
            cache_len,
            capacity,
        }
    }
}

impl LoadingMetricsRecorder for LoadingMetrics {
    fn record_get_call(&self) {
        self.get_calls.incr();
    }

    fn record_get_hit(&self) {
        self.hits.incr();
    }

    fn record_get_miss(&self) {
        self.misses.incr();
    }

    fn record_load_success(&self) {
        self.load_successes.incr();
    }

    fn record_load_failure(&self) {
        self.load_failures.incr();
    }

    fn record_absent_value(&self) {
        self.load_failures.incr();
        self.absent_values.incr();
    }

    fn record_eviction_notified(&self) {
        self.evictions_notified.incr();
    }
}

impl MetricsReset for LoadingMetrics {
    fn reset_metrics(&self) {
        self.get_calls.reset();
        self.hits.reset();
        self.misses.reset();
        self.load_successes.reset();
        self.load_failures.reset();
        self.absent_values.reset();
        self.evictions_notified.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_flow_into_snapshot() {
        let metrics = LoadingMetrics::new();
        metrics.record_get_call();
        metrics.record_get_call();
        metrics.record_get_miss();
        metrics.record_get_hit();
        metrics.record_load_success();
        metrics.record_absent_value();
        metrics.record_load_failure();
        metrics.record_eviction_notified();

        let snapshot = metrics.snapshot(3, 10);
        assert_eq!(snapshot.get_calls, 2);
        assert_eq!(snapshot.hits, 1);
        assert_eq!(snapshot.misses, 1);
        assert_eq!(snapshot.loads, 3);
        assert_eq!(snapshot.load_successes, 1);
        assert_eq!(snapshot.load_failures, 2);
        assert_eq!(snapshot.absent_values, 1);
        assert_eq!(snapshot.evictions_notified, 1);
        assert_eq!(snapshot.cache_len, 3);
        assert_eq!(snapshot.capacity, 10);
    }

    #[test]
    fn reset_zeroes_counters() {
        let metrics = LoadingMetrics::new();
        metrics.record_get_call();
        metrics.record_load_success();
        metrics.reset_metrics();

        assert_eq!(metrics.snapshot(0, 1), LoadingMetricsSnapshot {
            capacity: 1,
            ..Default::default()
        });
    }
}
