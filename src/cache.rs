//! # Watermark-Evicting Key-Value Cache
//!
//! This module provides the cache engine: a single-threaded core coupling a
//! hash index with an ordered eviction queue, and a thread-safe wrapper that
//! guards the core with one reader-writer lock.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────┐
//!   │                         Cache<K, V, S>                           │
//!   │                                                                  │
//!   │   ┌────────────────────────────────────────────────────────────┐ │
//!   │   │               Arc<RwLock<CacheCore<K, V, S>>>              │ │
//!   │   └────────────────────────────────────────────────────────────┘ │
//!   │                                │                                 │
//!   │                                ▼                                 │
//!   │   ┌────────────────────────────────────────────────────────────┐ │
//!   │   │                     CacheCore<K, V, S>                     │ │
//!   │   │                                                            │ │
//!   │   │   ┌──────────────────────────────────────────────────────┐ │ │
//!   │   │   │  HashMap<K, CacheEntry>    CacheEntry:               │ │ │
//!   │   │   │                              value:  Arc<V>          │ │ │
//!   │   │   │                              cursor: Cursor ───┐     │ │ │
//!   │   │   └────────────────────────────────────────────────┼─────┘ │ │
//!   │   │                                                    │       │ │
//!   │   │   ┌────────────────────────────────────────────────┼─────┐ │ │
//!   │   │   │  EvictionQueue<K>                              ▼     │ │ │
//!   │   │   │  front ──► [k₁] ◄──► [k₂] ◄──► [k₃] ◄── back         │ │ │
//!   │   │   │   next victim              most recent arrival       │ │ │
//!   │   │   └──────────────────────────────────────────────────────┘ │ │
//!   │   └────────────────────────────────────────────────────────────┘ │
//!   └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The index and the queue are one logical structure exposed through two
//! containers: the index gives average-O(1) keyed access, the queue gives
//! O(1) ordered eviction. Every mutation keeps them in lockstep, including
//! the unwinding paths, secured by [`QueueProctor`] and by detaching victims
//! before their callback runs.
//!
//! ## Watermark eviction
//!
//! The cache is bounded by a pair of watermarks with `1 <= low <= high`.
//! When an insert would add a new entry while `len >= high`, entries are
//! evicted from the front of the queue until `len < low`, then the insert
//! proceeds. Spreading the shrink across the two bounds amortizes eviction
//! over many inserts instead of paying one-out-one-in at a single cap.
//! Setting both watermarks to [`UNBOUNDED_WATERMARK`] disables automatic
//! eviction entirely.
//!
//! ```text
//!   len
//!    │        high ┄┄┄┄┄┄┄┄┄┄╮ insert arrives at len == high
//!    │                       │
//!    │        low  ┄┄┄┄┄┄┄┄┄┄┼┄┄╮ burst evicts until len < low
//!    │                       ▼  │
//!    │  ▁▂▃▄▅▆▇▇▇▇▇▇▇▇▇▇▇▇▇▇   ▆▇… fills again
//!    └────────────────────────────────────────── inserts
//! ```
//!
//! ## Policies
//!
//! | Event                    | LRU                    | FIFO              |
//! |--------------------------|------------------------|-------------------|
//! | new-key insert           | appended at back       | appended at back  |
//! | replacement insert       | moved to back          | moved to back     |
//! | `try_get_value` hit      | moved to back          | order unchanged   |
//! | `try_get_value(.., false)` | order unchanged      | order unchanged   |
//!
//! ## Locking
//!
//! | Operation                     | Lock                            |
//! |-------------------------------|---------------------------------|
//! | `insert*`, `erase*`, `pop_front`, `clear`, `set_post_eviction_callback` | write |
//! | `try_get_value` / `get`       | write iff LRU order may change  |
//! | `peek`, `contains`, `len`, `visit` | read                       |
//! | `eviction_policy`, watermarks | none (immutable copies)         |
//!
//! The lock mode for a lookup is decided *before* acquisition from the
//! policy and the caller's `modify_order` flag; there is no read-to-write
//! upgrade. Read-only lookups therefore proceed fully in parallel, which is
//! the dominant workload for a read-mostly cache.
//!
//! User-supplied code (hash, equality, the post-eviction callback, the
//! visitor) executes inside the critical section and **must not re-enter
//! the cache**; doing so deadlocks.
//!
//! ## Example
//!
//! ```
//! use tidecache::cache::Cache;
//! use tidecache::policy::EvictionPolicy;
//!
//! let cache: Cache<u64, String> = Cache::new(EvictionPolicy::Lru, 2, 3);
//! cache.insert(1, "one".to_string());
//! cache.insert(2, "two".to_string());
//! cache.insert(3, "three".to_string());
//!
//! // a fourth insert crosses the high watermark and shrinks below low
//! cache.insert(4, "four".to_string());
//! assert_eq!(cache.len(), 2);
//! assert_eq!(cache.try_get_value(&4, true).unwrap().as_str(), "four");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

#[cfg(feature = "concurrency")]
use parking_lot::RwLock;
use rustc_hash::FxBuildHasher;

use crate::callback::PostEvictionCallback;
use crate::ds::{Cursor, EvictionQueue, QueueProctor};
use crate::error::InvariantError;
#[cfg(feature = "metrics")]
use crate::metrics::{CacheMetrics, CacheMetricsSnapshot};
use crate::policy::EvictionPolicy;

/// Watermark value that disables automatic eviction.
pub const UNBOUNDED_WATERMARK: usize = usize::MAX;

/// A stored entry: the shared value handle plus the entry's position in the
/// eviction queue.
struct CacheEntry<V> {
    value: Arc<V>,
    cursor: Cursor,
}

/// Single-threaded cache engine: hash index + eviction queue + watermark
/// controller.
///
/// All ordering and eviction semantics live here; thread safety is provided
/// by the [`Cache`] wrapper. Use the core directly when the cache is owned
/// by a single thread and the lock would be pure overhead.
///
/// Keys must be `Hash + Eq + Clone`; the queue stores its own copy of each
/// key. Values are held as `Arc<V>`; handles returned from lookups and
/// passed to the post-eviction callback stay valid after the entry leaves
/// the cache.
pub struct CacheCore<K, V, S = FxBuildHasher> {
    map: HashMap<K, CacheEntry<V>, S>,
    queue: EvictionQueue<K>,
    policy: EvictionPolicy,
    low_watermark: usize,
    high_watermark: usize,
    post_eviction_callback: Option<PostEvictionCallback<V>>,
    #[cfg(feature = "metrics")]
    metrics: CacheMetrics,
}

impl<K, V> CacheCore<K, V> {
    /// Creates an empty core with the given policy and watermarks, using
    /// the default hasher.
    ///
    /// The watermarks must satisfy `1 <= low_watermark <= high_watermark`;
    /// violations are debug-asserted. Use
    /// [`CacheBuilder::try_build_core`](crate::builder::CacheBuilder::try_build_core)
    /// for validated construction.
    pub fn new(policy: EvictionPolicy, low_watermark: usize, high_watermark: usize) -> Self {
        Self::with_hasher(policy, low_watermark, high_watermark, FxBuildHasher::default())
    }

    /// Creates an empty LRU core that never evicts automatically (both
    /// watermarks at [`UNBOUNDED_WATERMARK`]).
    pub fn unbounded() -> Self {
        Self::new(EvictionPolicy::Lru, UNBOUNDED_WATERMARK, UNBOUNDED_WATERMARK)
    }
}

impl<K, V, S> CacheCore<K, V, S> {
    /// Creates an empty core with an explicit hash builder.
    pub fn with_hasher(
        policy: EvictionPolicy,
        low_watermark: usize,
        high_watermark: usize,
        hasher: S,
    ) -> Self {
        debug_assert!(low_watermark >= 1, "low watermark must be at least 1");
        debug_assert!(
            low_watermark <= high_watermark,
            "low watermark must not exceed high watermark"
        );
        CacheCore {
            map: HashMap::with_hasher(hasher),
            queue: EvictionQueue::new(),
            policy,
            low_watermark,
            high_watermark,
            post_eviction_callback: None,
            #[cfg(feature = "metrics")]
            metrics: CacheMetrics::new(),
        }
    }

    /// Returns the current number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the cache holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the configured eviction policy.
    #[inline]
    pub fn eviction_policy(&self) -> EvictionPolicy {
        self.policy
    }

    /// Returns the size at which an eviction burst stops.
    #[inline]
    pub fn low_watermark(&self) -> usize {
        self.low_watermark
    }

    /// Returns the size at which an insert triggers an eviction burst.
    #[inline]
    pub fn high_watermark(&self) -> usize {
        self.high_watermark
    }

    /// Returns the hash builder used by the index.
    #[inline]
    pub fn hash_builder(&self) -> &S {
        self.map.hasher()
    }

    /// Removes all entries. The post-eviction callback is **not** invoked:
    /// clearing is a tear-down, not a per-entry removal.
    pub fn clear(&mut self) {
        self.map.clear();
        self.queue.clear();
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();
    }

    /// Sets the callback invoked for each entry that leaves the cache via
    /// eviction, [`erase`](CacheCore::erase), or
    /// [`pop_front`](CacheCore::pop_front). Replaces any previous callback.
    ///
    /// The callback runs synchronously in the frame of the operation that
    /// removed the entry, after the entry is fully detached. It must not
    /// call back into the cache.
    pub fn set_post_eviction_callback<F>(&mut self, callback: F)
    where
        F: Fn(&Arc<V>) + Send + Sync + 'static,
    {
        self.post_eviction_callback = Some(Box::new(callback));
    }

    /// Returns a snapshot of the operation counters.
    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        self.metrics.snapshot(self.map.len())
    }
}

impl<K, V, S> CacheCore<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    /// Inserts a value, wrapping it in a fresh `Arc<V>`.
    ///
    /// Returns `true` if a new entry was created, `false` if an existing
    /// key's value was replaced. Replacement moves the key to the back of
    /// the eviction queue (a replacement is a fresh arrival) and fires no
    /// callback; the previous handle is simply released.
    ///
    /// The handle is allocated before any cache state is touched, so an
    /// unwind from user code leaves the cache exactly as it was.
    ///
    /// # Example
    ///
    /// ```
    /// use tidecache::cache::CacheCore;
    ///
    /// let mut cache: CacheCore<u32, String> = CacheCore::unbounded();
    /// assert!(cache.insert(1, "first".to_string()));
    /// assert!(!cache.insert(1, "replaced".to_string()));
    /// assert_eq!(cache.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.insert_arc(key, Arc::new(value))
    }

    /// Inserts a pre-wrapped handle. Semantics match
    /// [`insert`](CacheCore::insert); the cache shares ownership with any
    /// handles the caller retains.
    pub fn insert_arc(&mut self, key: K, value: Arc<V>) -> bool {
        if let Some(entry) = self.map.get_mut(&key) {
            entry.value = value;
            let cursor = entry.cursor;
            // a replacement is a fresh arrival under both policies
            self.queue.move_to_back(cursor);
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_replace();
            self.debug_validate();
            return false;
        }

        self.enforce_high_watermark();

        let queue_key = key.clone();
        let mut proctor = QueueProctor::new(&mut self.queue);
        let cursor = proctor.push_back(queue_key);
        self.map.insert(key, CacheEntry { value, cursor });
        proctor.release();

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();
        self.debug_validate();
        true
    }

    /// Inserts every pair in `pairs`; returns how many created new entries
    /// (replacements are not counted).
    pub fn insert_bulk<I>(&mut self, pairs: I) -> usize
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut inserted = 0;
        for (key, value) in pairs {
            if self.insert(key, value) {
                inserted += 1;
            }
        }
        inserted
    }

    /// Bulk variant of [`insert_arc`](CacheCore::insert_arc); returns the
    /// count of new entries.
    pub fn insert_arc_bulk<I>(&mut self, pairs: I) -> usize
    where
        I: IntoIterator<Item = (K, Arc<V>)>,
    {
        let mut inserted = 0;
        for (key, value) in pairs {
            if self.insert_arc(key, value) {
                inserted += 1;
            }
        }
        inserted
    }

    /// Looks up `key` and, under LRU, refreshes its queue position.
    ///
    /// Returns a handle sharing ownership with the cache; the handle stays
    /// valid if the entry is later evicted. Under FIFO the queue is never
    /// touched. Use [`peek`](CacheCore::peek) to look up without affecting
    /// LRU order.
    pub fn get(&mut self, key: &K) -> Option<Arc<V>> {
        let (value, cursor) = match self.map.get(key) {
            Some(entry) => (Arc::clone(&entry.value), entry.cursor),
            None => {
                #[cfg(feature = "metrics")]
                self.metrics.record_miss();
                return None;
            }
        };
        #[cfg(feature = "metrics")]
        self.metrics.record_hit();

        if self.policy == EvictionPolicy::Lru && !self.queue.is_back(cursor) {
            self.queue.move_to_back(cursor);
        }
        Some(value)
    }

    /// Looks up `key` without touching the eviction queue.
    pub fn peek(&self, key: &K) -> Option<Arc<V>> {
        match self.map.get(key) {
            Some(entry) => {
                #[cfg(feature = "metrics")]
                self.metrics.record_hit();
                Some(Arc::clone(&entry.value))
            }
            None => {
                #[cfg(feature = "metrics")]
                self.metrics.record_miss();
                None
            }
        }
    }

    /// Returns `true` if `key` is present. Never affects queue order.
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Removes the entry for `key`, invoking the post-eviction callback.
    ///
    /// Returns `false` (and fires no callback) if the key is absent.
    pub fn erase(&mut self, key: &K) -> bool {
        let Some(entry) = self.map.remove(key) else {
            return false;
        };
        self.queue.remove(entry.cursor);
        #[cfg(feature = "metrics")]
        self.metrics.record_erase();
        self.notify_removal(&entry.value);
        self.debug_validate();
        true
    }

    /// Applies [`erase`](CacheCore::erase) to each key; returns the number
    /// of entries actually removed.
    pub fn erase_bulk(&mut self, keys: &[K]) -> usize {
        let mut erased = 0;
        for key in keys {
            if self.erase(key) {
                erased += 1;
            }
        }
        erased
    }

    /// Removes the entry at the front of the eviction queue (the next
    /// victim), invoking the post-eviction callback.
    ///
    /// Returns `false` if the cache is empty.
    pub fn pop_front(&mut self) -> bool {
        let Some(key) = self.queue.pop_front() else {
            return false;
        };
        let entry = self.map.remove(&key);
        debug_assert!(entry.is_some(), "queue front missing from index");
        #[cfg(feature = "metrics")]
        self.metrics.record_pop_front();
        if let Some(entry) = entry {
            self.notify_removal(&entry.value);
        }
        self.debug_validate();
        true
    }

    /// Calls `visitor` for each entry in eviction-queue order (next victim
    /// first) until it returns `false` or the queue is exhausted.
    ///
    /// The visitor must not call back into the cache.
    ///
    /// # Example
    ///
    /// ```
    /// use tidecache::cache::CacheCore;
    ///
    /// let mut cache: CacheCore<u32, &str> = CacheCore::unbounded();
    /// cache.insert(1, "a");
    /// cache.insert(2, "b");
    ///
    /// let mut seen = Vec::new();
    /// cache.visit(|key, value| {
    ///     seen.push((*key, *value));
    ///     true
    /// });
    /// assert_eq!(seen, vec![(1, "a"), (2, "b")]);
    /// ```
    pub fn visit<F>(&self, mut visitor: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        for key in self.queue.iter() {
            let Some(entry) = self.map.get(key) else {
                debug_assert!(false, "queue key missing from index");
                continue;
            };
            if !visitor(key, entry.value.as_ref()) {
                break;
            }
        }
    }

    /// Verifies the index/queue lockstep invariants: equal lengths, every
    /// queue position resolving to an index entry, and every such entry
    /// pointing back at its queue position.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.map.len() != self.queue.len() {
            return Err(InvariantError::LengthMismatch {
                index_len: self.map.len(),
                queue_len: self.queue.len(),
            });
        }
        for (cursor, key) in self.queue.cursors() {
            let entry = self.map.get(key).ok_or(InvariantError::OrphanedQueueKey)?;
            if entry.cursor != cursor {
                return Err(InvariantError::StaleCursor);
            }
        }
        Ok(())
    }

    /// Evicts from the front until `len < low_watermark`, if the high
    /// watermark has been reached. Runs only on the new-entry insert path;
    /// replacements do not change the size and never evict.
    fn enforce_high_watermark(&mut self) {
        if self.map.len() < self.high_watermark {
            return;
        }
        #[cfg(feature = "metrics")]
        self.metrics.record_eviction_burst();
        while self.map.len() >= self.low_watermark && !self.map.is_empty() {
            self.evict_front();
        }
    }

    /// Removes the front entry and invokes the callback. The entry is fully
    /// detached from both containers before the callback runs, so a
    /// panicking callback propagates with the cache consistent and the rest
    /// of the burst abandoned.
    fn evict_front(&mut self) {
        let Some(key) = self.queue.pop_front() else {
            return;
        };
        let entry = self.map.remove(&key);
        debug_assert!(entry.is_some(), "queue front missing from index");
        if let Some(entry) = entry {
            #[cfg(feature = "metrics")]
            self.metrics.record_eviction();
            self.notify_removal(&entry.value);
        }
    }

    fn notify_removal(&self, value: &Arc<V>) {
        if let Some(callback) = &self.post_eviction_callback {
            callback(value);
        }
    }

    #[inline]
    fn debug_validate(&self) {
        #[cfg(debug_assertions)]
        {
            self.queue.debug_validate_invariants();
            if let Err(err) = self.check_invariants() {
                panic!("cache invariant violated: {}", err);
            }
        }
    }
}

impl<K, V, S> fmt::Debug for CacheCore<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheCore")
            .field("len", &self.map.len())
            .field("policy", &self.policy)
            .field("low_watermark", &self.low_watermark)
            .field("high_watermark", &self.high_watermark)
            .finish_non_exhaustive()
    }
}

impl<K, V, S> Default for CacheCore<K, V, S>
where
    S: Default,
{
    /// An unbounded LRU core.
    fn default() -> Self {
        Self::with_hasher(
            EvictionPolicy::Lru,
            UNBOUNDED_WATERMARK,
            UNBOUNDED_WATERMARK,
            S::default(),
        )
    }
}

impl<K, V, S> Extend<(K, V)> for CacheCore<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

// ---------------------------------------------------------------------------
// Cache (concurrent wrapper)
// ---------------------------------------------------------------------------

/// Thread-safe cache guarding a [`CacheCore`] with a single reader-writer
/// lock.
///
/// Cloning is cheap and shares the underlying cache. The policy and
/// watermarks are immutable after construction and kept outside the lock,
/// so [`try_get_value`](Cache::try_get_value) can pick its lock mode
/// without acquiring anything, and the configuration accessors never block.
///
/// Write operations (inserts, erases, pops, callback registration) hold the
/// write lock for their full duration, including any callback invocations;
/// readers observe either the complete pre-state or the complete post-state
/// of each write.
#[cfg(feature = "concurrency")]
pub struct Cache<K, V, S = FxBuildHasher> {
    inner: Arc<RwLock<CacheCore<K, V, S>>>,
    policy: EvictionPolicy,
    low_watermark: usize,
    high_watermark: usize,
}

#[cfg(feature = "concurrency")]
impl<K, V, S> Clone for Cache<K, V, S> {
    fn clone(&self) -> Self {
        Cache {
            inner: Arc::clone(&self.inner),
            policy: self.policy,
            low_watermark: self.low_watermark,
            high_watermark: self.high_watermark,
        }
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> Cache<K, V> {
    /// Creates an empty cache with the given policy and watermarks.
    ///
    /// The watermarks must satisfy `1 <= low_watermark <= high_watermark`;
    /// violations are debug-asserted. Use
    /// [`CacheBuilder::try_build`](crate::builder::CacheBuilder::try_build)
    /// for validated construction.
    ///
    /// # Example
    ///
    /// ```
    /// use tidecache::cache::Cache;
    /// use tidecache::policy::EvictionPolicy;
    ///
    /// let cache: Cache<u64, String> = Cache::new(EvictionPolicy::Lru, 6, 7);
    /// assert_eq!(cache.low_watermark(), 6);
    /// assert_eq!(cache.high_watermark(), 7);
    /// assert!(cache.is_empty());
    /// ```
    pub fn new(policy: EvictionPolicy, low_watermark: usize, high_watermark: usize) -> Self {
        Self::from_core(CacheCore::new(policy, low_watermark, high_watermark))
    }

    /// Creates an empty LRU cache that never evicts automatically.
    pub fn unbounded() -> Self {
        Self::from_core(CacheCore::unbounded())
    }
}

#[cfg(feature = "concurrency")]
impl<K, V, S> Cache<K, V, S> {
    /// Creates an empty cache with an explicit hash builder.
    pub fn with_hasher(
        policy: EvictionPolicy,
        low_watermark: usize,
        high_watermark: usize,
        hasher: S,
    ) -> Self {
        Self::from_core(CacheCore::with_hasher(
            policy,
            low_watermark,
            high_watermark,
            hasher,
        ))
    }

    pub(crate) fn from_core(core: CacheCore<K, V, S>) -> Self {
        let policy = core.eviction_policy();
        let low_watermark = core.low_watermark();
        let high_watermark = core.high_watermark();
        Cache {
            inner: Arc::new(RwLock::new(core)),
            policy,
            low_watermark,
            high_watermark,
        }
    }

    /// Returns the configured eviction policy. Lock-free.
    #[inline]
    pub fn eviction_policy(&self) -> EvictionPolicy {
        self.policy
    }

    /// Returns the size at which an eviction burst stops. Lock-free.
    #[inline]
    pub fn low_watermark(&self) -> usize {
        self.low_watermark
    }

    /// Returns the size at which an insert triggers eviction. Lock-free.
    #[inline]
    pub fn high_watermark(&self) -> usize {
        self.high_watermark
    }

    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Removes all entries without invoking the post-eviction callback.
    pub fn clear(&self) {
        self.inner.write().clear()
    }

    /// Sets the post-eviction callback. See
    /// [`CacheCore::set_post_eviction_callback`] for the contract; in
    /// particular the callback runs while the write lock is held and must
    /// not call back into this cache.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::{Arc, Mutex};
    /// use tidecache::cache::Cache;
    /// use tidecache::policy::EvictionPolicy;
    ///
    /// let cache: Cache<u64, String> = Cache::new(EvictionPolicy::Lru, 1, 1);
    /// let evicted = Arc::new(Mutex::new(Vec::new()));
    /// let recorder = Arc::clone(&evicted);
    /// cache.set_post_eviction_callback(move |value| {
    ///     recorder.lock().unwrap().push((**value).clone());
    /// });
    ///
    /// cache.insert(1, "victim".to_string());
    /// cache.insert(2, "survivor".to_string());
    /// assert_eq!(evicted.lock().unwrap().as_slice(), ["victim".to_string()]);
    /// ```
    pub fn set_post_eviction_callback<F>(&self, callback: F)
    where
        F: Fn(&Arc<V>) + Send + Sync + 'static,
    {
        self.inner.write().set_post_eviction_callback(callback)
    }

    /// Returns a clone of the hash builder used by the index.
    pub fn hash_builder(&self) -> S
    where
        S: Clone,
    {
        self.inner.read().hash_builder().clone()
    }

    /// Returns a snapshot of the operation counters.
    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        self.inner.read().metrics_snapshot()
    }
}

#[cfg(feature = "concurrency")]
impl<K, V, S> Cache<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    /// Inserts a value under the write lock; returns `true` if a new entry
    /// was created.
    ///
    /// May trigger an eviction burst (and its callbacks) before the entry
    /// is added. Replacing an existing key's value never evicts and fires
    /// no callback.
    pub fn insert(&self, key: K, value: V) -> bool {
        self.inner.write().insert(key, value)
    }

    /// Inserts a pre-wrapped handle; the cache shares ownership with any
    /// handles the caller retains.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use tidecache::cache::Cache;
    ///
    /// let cache: Cache<u64, String> = Cache::unbounded();
    /// let shared = Arc::new("shared".to_string());
    /// cache.insert_arc(1, Arc::clone(&shared));
    ///
    /// let retrieved = cache.get(&1).unwrap();
    /// assert!(Arc::ptr_eq(&shared, &retrieved));
    /// ```
    pub fn insert_arc(&self, key: K, value: Arc<V>) -> bool {
        self.inner.write().insert_arc(key, value)
    }

    /// Inserts every pair under a single write-lock acquisition; returns
    /// how many created new entries (replacements are not counted).
    ///
    /// # Example
    ///
    /// ```
    /// use tidecache::cache::Cache;
    ///
    /// let cache: Cache<u64, &str> = Cache::unbounded();
    /// cache.insert(1, "already here");
    /// let added = cache.insert_bulk(vec![(1, "replaced"), (2, "new"), (3, "new")]);
    /// assert_eq!(added, 2);
    /// assert_eq!(cache.len(), 3);
    /// ```
    pub fn insert_bulk<I>(&self, pairs: I) -> usize
    where
        I: IntoIterator<Item = (K, V)>,
    {
        self.inner.write().insert_bulk(pairs)
    }

    /// Bulk variant of [`insert_arc`](Cache::insert_arc) under a single
    /// write-lock acquisition.
    pub fn insert_arc_bulk<I>(&self, pairs: I) -> usize
    where
        I: IntoIterator<Item = (K, Arc<V>)>,
    {
        self.inner.write().insert_arc_bulk(pairs)
    }

    /// Looks up `key`, choosing the lock mode before acquisition.
    ///
    /// Takes the write lock only when the eviction queue may change:
    /// policy is LRU *and* `modify_order` is `true`. Every other
    /// combination runs under the read lock, so such lookups proceed fully
    /// in parallel. Passing `modify_order: false` under LRU trades recency
    /// fidelity for read throughput.
    ///
    /// # Example
    ///
    /// ```
    /// use tidecache::cache::Cache;
    /// use tidecache::policy::EvictionPolicy;
    ///
    /// let cache: Cache<u64, String> = Cache::new(EvictionPolicy::Lru, 6, 7);
    /// cache.insert(1, "one".to_string());
    ///
    /// // write-locked: refreshes LRU position
    /// assert_eq!(cache.try_get_value(&1, true).unwrap().as_str(), "one");
    /// // read-locked: order untouched
    /// assert_eq!(cache.try_get_value(&1, false).unwrap().as_str(), "one");
    /// assert!(cache.try_get_value(&99, true).is_none());
    /// ```
    pub fn try_get_value(&self, key: &K, modify_order: bool) -> Option<Arc<V>> {
        if modify_order && self.policy == EvictionPolicy::Lru {
            self.inner.write().get(key)
        } else {
            self.inner.read().peek(key)
        }
    }

    /// Looks up `key`, refreshing its LRU position on a hit. Equivalent to
    /// `try_get_value(key, true)`.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.try_get_value(key, true)
    }

    /// Read-locked lookup that never reorders. Equivalent to
    /// `try_get_value(key, false)`.
    pub fn peek(&self, key: &K) -> Option<Arc<V>> {
        self.try_get_value(key, false)
    }

    /// Returns `true` if `key` is present. Read-locked, never reorders.
    pub fn contains(&self, key: &K) -> bool {
        self.inner.read().contains(key)
    }

    /// Removes the entry for `key`, invoking the post-eviction callback.
    /// Returns `false` (no callback) if the key is absent.
    pub fn erase(&self, key: &K) -> bool {
        self.inner.write().erase(key)
    }

    /// Erases each key under a single write-lock acquisition; returns the
    /// number of entries actually removed.
    pub fn erase_bulk(&self, keys: &[K]) -> usize {
        self.inner.write().erase_bulk(keys)
    }

    /// Removes the next eviction victim, invoking the callback. Returns
    /// `false` if the cache is empty.
    pub fn pop_front(&self) -> bool {
        self.inner.write().pop_front()
    }

    /// Read-locked traversal in eviction-queue order; stops when the
    /// visitor returns `false`.
    ///
    /// The read lock is held for the whole traversal, so the visitor sees a
    /// consistent snapshot, and a slow visitor delays writers accordingly.
    /// The visitor must not call back into this cache.
    ///
    /// # Example
    ///
    /// ```
    /// use tidecache::cache::Cache;
    ///
    /// let cache: Cache<u64, &str> = Cache::unbounded();
    /// cache.insert(1, "oldest");
    /// cache.insert(2, "newest");
    ///
    /// let mut order = Vec::new();
    /// cache.visit(|key, _value| {
    ///     order.push(*key);
    ///     true
    /// });
    /// assert_eq!(order, vec![1, 2]);
    /// ```
    pub fn visit<F>(&self, visitor: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.inner.read().visit(visitor)
    }

    /// Verifies the index/queue lockstep invariants under the read lock.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.inner.read().check_invariants()
    }
}

#[cfg(feature = "concurrency")]
impl<K, V, S> fmt::Debug for Cache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.inner.read();
        f.debug_struct("Cache")
            .field("len", &core.len())
            .field("policy", &self.policy)
            .field("low_watermark", &self.low_watermark)
            .field("high_watermark", &self.high_watermark)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> Default for Cache<K, V> {
    /// An unbounded LRU cache.
    fn default() -> Self {
        Self::unbounded()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
