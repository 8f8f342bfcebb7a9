/// Point-in-time copy of a loading cache's counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadingMetricsSnapshot {
    pub get_calls: u64,
    pub hits: u64,
    pub misses: u64,

    pub loads: u64,
    pub load_successes: u64,
    pub load_failures: u64, // includes absent values
    pub absent_values: u64,

    pub evictions_notified: u64,

    // gauges captured at snapshot time
    pub cache_len: usize,
    pub capacity: usize,
}

impl LoadingMetricsSnapshot {
    /// Fraction of `get` calls served by an already loaded value.
    ///
    /// Returns `0.0` before the first `get`.
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}
