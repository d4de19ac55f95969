//! Operation counters for the cache engine (feature `metrics`).
//!
//! Counters are relaxed atomics: the read-locked lookup path records hits
//! and misses concurrently from many threads, so interior-mutable cells
//! would race. Counts are observational only and never affect cache
//! behavior.

mod snapshot;

pub use snapshot::CacheMetricsSnapshot;

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic per-operation counters embedded in the cache core.
#[derive(Debug, Default)]
pub struct CacheMetrics {
    lookup_hits: AtomicU64,
    lookup_misses: AtomicU64,
    inserts_new: AtomicU64,
    inserts_replaced: AtomicU64,
    eviction_bursts: AtomicU64,
    evicted_entries: AtomicU64,
    erased_entries: AtomicU64,
    popped_entries: AtomicU64,
    clears: AtomicU64,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_hit(&self) {
        self.lookup_hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_miss(&self) {
        self.lookup_misses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_insert_new(&self) {
        self.inserts_new.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_insert_replace(&self) {
        self.inserts_replaced.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_eviction_burst(&self) {
        self.eviction_bursts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_eviction(&self) {
        self.evicted_entries.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_erase(&self) {
        self.erased_entries.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_pop_front(&self) {
        self.popped_entries.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_clear(&self) {
        self.clears.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a point-in-time snapshot, with `cache_len` supplied by the
    /// caller (the counters do not track gauges).
    pub fn snapshot(&self, cache_len: usize) -> CacheMetricsSnapshot {
        CacheMetricsSnapshot {
            lookup_hits: self.lookup_hits.load(Ordering::Relaxed),
            lookup_misses: self.lookup_misses.load(Ordering::Relaxed),
            inserts_new: self.inserts_new.load(Ordering::Relaxed),
            inserts_replaced: self.inserts_replaced.load(Ordering::Relaxed),
            eviction_bursts: self.eviction_bursts.load(Ordering::Relaxed),
            evicted_entries: self.evicted_entries.load(Ordering::Relaxed),
            erased_entries: self.erased_entries.load(Ordering::Relaxed),
            popped_entries: self.popped_entries.load(Ordering::Relaxed),
            clears: self.clears.load(Ordering::Relaxed),
            cache_len,
        }
    }
}
