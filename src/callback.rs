//! Post-eviction callback, invoked whenever an entry leaves the cache
//! through eviction, erase, or a front pop.
//!
//! The callback receives a shared handle to the departing value. The entry
//! is fully removed from the cache before the callback runs, so the handle
//! is the callback's to keep, clone, or drop; the underlying value is
//! destroyed when the last handle goes away.
//!
//! **Do not call any cache method from inside the callback**: it runs
//! while the cache's write lock is held, and re-entering the cache would
//! deadlock. Panicking is permitted: the cache is already consistent when
//! the callback runs, and the panic propagates to the caller of the
//! operation that triggered the removal.
//!
//! The callback does **not** fire for [`clear`](crate::cache::Cache::clear)
//! (a tear-down, not a per-entry removal) or for value replacement of an
//! existing key.
//!
//! # Example
//! ```
//! use std::sync::{Arc, Mutex};
//! use tidecache::cache::Cache;
//! use tidecache::policy::EvictionPolicy;
//!
//! let evicted: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
//! let recorder = Arc::clone(&evicted);
//!
//! let cache: Cache<u64, String> = Cache::new(EvictionPolicy::Lru, 1, 1);
//! cache.set_post_eviction_callback(move |value| {
//!     recorder.lock().unwrap().push((**value).clone());
//! });
//!
//! cache.insert(1, "first".to_string());
//! cache.insert(2, "second".to_string()); // evicts "first"
//! assert_eq!(evicted.lock().unwrap().as_slice(), ["first".to_string()]);
//! ```

use std::sync::Arc;

/// Boxed callback over the departing value handle.
///
/// Set via [`Cache::set_post_eviction_callback`](crate::cache::Cache::set_post_eviction_callback);
/// unset by default (removals are silent).
pub type PostEvictionCallback<V> = Box<dyn Fn(&Arc<V>) + Send + Sync>;
