/// A point-in-time copy of the cache's operation counters.
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheMetricsSnapshot {
    pub lookup_hits: u64,
    pub lookup_misses: u64,

    pub inserts_new: u64,
    pub inserts_replaced: u64,

    /// Number of times the high watermark triggered an eviction pass.
    pub eviction_bursts: u64,
    /// Entries removed by watermark enforcement.
    pub evicted_entries: u64,

    pub erased_entries: u64,
    pub popped_entries: u64,
    pub clears: u64,

    // gauge captured at snapshot time
    pub cache_len: usize,
}

impl CacheMetricsSnapshot {
    /// Total lookups observed.
    pub fn request_count(&self) -> u64 {
        self.lookup_hits + self.lookup_misses
    }

    /// `hits / (hits + misses)`, or `0.0` before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.request_count();
        if total == 0 {
            0.0
        } else {
            self.lookup_hits as f64 / total as f64
        }
    }
}
