//! Builder for configuring and validating a cache before construction.
//!
//! The direct constructors ([`Cache::new`](crate::cache::Cache::new) and
//! friends) debug-assert the watermark constraint; the builder's
//! `try_build` methods turn a violation into a [`ConfigError`] instead,
//! which is the right shape when the watermarks come from user
//! configuration.
//!
//! ## Example
//!
//! ```
//! use tidecache::builder::CacheBuilder;
//! use tidecache::policy::EvictionPolicy;
//!
//! let cache = CacheBuilder::new()
//!     .eviction_policy(EvictionPolicy::Fifo)
//!     .watermarks(100, 120)
//!     .try_build::<u64, String>()
//!     .expect("1 <= low <= high");
//!
//! cache.insert(1, "hello".to_string());
//! assert_eq!(cache.try_get_value(&1, true).unwrap().as_str(), "hello");
//! ```

use std::hash::BuildHasher;

use rustc_hash::FxBuildHasher;

#[cfg(feature = "concurrency")]
use crate::cache::Cache;
use crate::cache::{CacheCore, UNBOUNDED_WATERMARK};
use crate::error::ConfigError;
use crate::policy::EvictionPolicy;

/// Configures policy, watermarks, and hashing for a cache.
///
/// Defaults to an unbounded LRU cache with the crate's default hasher.
#[derive(Debug, Clone)]
pub struct CacheBuilder<S = FxBuildHasher> {
    policy: EvictionPolicy,
    low_watermark: usize,
    high_watermark: usize,
    hasher: S,
}

impl CacheBuilder {
    /// Starts from the defaults: LRU, unbounded, default hasher.
    pub fn new() -> Self {
        CacheBuilder {
            policy: EvictionPolicy::Lru,
            low_watermark: UNBOUNDED_WATERMARK,
            high_watermark: UNBOUNDED_WATERMARK,
            hasher: FxBuildHasher::default(),
        }
    }
}

impl Default for CacheBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> CacheBuilder<S> {
    /// Sets the eviction policy.
    pub fn eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the watermark pair: eviction starts when an insert finds
    /// `len >= high` and stops once `len < low`.
    pub fn watermarks(mut self, low: usize, high: usize) -> Self {
        self.low_watermark = low;
        self.high_watermark = high;
        self
    }

    /// Replaces the hash builder used by the index.
    pub fn hasher<S2>(self, hasher: S2) -> CacheBuilder<S2> {
        CacheBuilder {
            policy: self.policy,
            low_watermark: self.low_watermark,
            high_watermark: self.high_watermark,
            hasher,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.low_watermark < 1 {
            return Err(ConfigError::ZeroLowWatermark);
        }
        if self.low_watermark > self.high_watermark {
            return Err(ConfigError::WatermarksInverted {
                low: self.low_watermark,
                high: self.high_watermark,
            });
        }
        Ok(())
    }

    /// Builds a single-threaded [`CacheCore`], validating the watermarks.
    pub fn try_build_core<K, V>(self) -> Result<CacheCore<K, V, S>, ConfigError>
    where
        S: BuildHasher,
    {
        self.validate()?;
        Ok(CacheCore::with_hasher(
            self.policy,
            self.low_watermark,
            self.high_watermark,
            self.hasher,
        ))
    }

    /// Builds a thread-safe [`Cache`], validating the watermarks.
    #[cfg(feature = "concurrency")]
    pub fn try_build<K, V>(self) -> Result<Cache<K, V, S>, ConfigError>
    where
        S: BuildHasher,
    {
        Ok(Cache::from_core(self.try_build_core()?))
    }

    /// Builds a thread-safe [`Cache`].
    ///
    /// # Panics
    ///
    /// Panics if the watermarks violate `1 <= low <= high`; use
    /// [`try_build`](CacheBuilder::try_build) to handle that as an error.
    #[cfg(feature = "concurrency")]
    pub fn build<K, V>(self) -> Cache<K, V, S>
    where
        S: BuildHasher,
    {
        match self.try_build() {
            Ok(cache) => cache,
            Err(err) => panic!("invalid cache configuration: {}", err),
        }
    }
}
