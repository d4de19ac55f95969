//! Eviction policies supported by the cache engine.
//!
//! The policy decides how a lookup interacts with the eviction queue:
//!
//! | Policy | Lookup hit | Replacement insert |
//! |--------|------------|--------------------|
//! | `Lru`  | moves the key to the back of the queue | moves to the back |
//! | `Fifo` | leaves the queue untouched             | moves to the back |
//!
//! Under both policies the entry at the *front* of the queue is the next
//! eviction victim. A replacement insert is treated as a fresh arrival, so
//! it refreshes the queue position regardless of policy.

/// Order in which entries are selected for eviction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvictionPolicy {
    /// Least recently used: successful lookups refresh an entry's queue
    /// position, so cold entries age toward the front.
    Lru,
    /// First in, first out: queue position is fixed at insertion (or
    /// replacement) time and lookups never reorder.
    Fifo,
}

impl Default for EvictionPolicy {
    /// LRU, matching the default construction of the cache itself.
    fn default() -> Self {
        EvictionPolicy::Lru
    }
}
