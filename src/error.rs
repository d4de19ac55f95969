//! Error types for the tidecache library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: the watermark pair failed validation; produced by the
//!   builder's fallible constructors.
//! - [`InvariantError`]: the coupled index/queue state fell out of
//!   lockstep; produced by the `check_invariants` methods, which exist for
//!   tests and debug builds.
//!
//! Both are small data-carrying enums, so callers can match on the exact
//! violation instead of parsing prose.
//!
//! ## Example Usage
//!
//! ```
//! use tidecache::builder::CacheBuilder;
//! use tidecache::error::ConfigError;
//!
//! let err = CacheBuilder::new()
//!     .watermarks(10, 4)
//!     .try_build::<u64, String>()
//!     .unwrap_err();
//! assert_eq!(err, ConfigError::WatermarksInverted { low: 10, high: 4 });
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Rejected cache configuration.
///
/// Produced by [`CacheBuilder::try_build`](crate::builder::CacheBuilder::try_build)
/// and [`CacheBuilder::try_build_core`](crate::builder::CacheBuilder::try_build_core)
/// when the watermark pair violates `1 <= low <= high`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The low watermark is zero, so an eviction burst could never stop.
    ZeroLowWatermark,
    /// The low watermark exceeds the high watermark, so eviction would
    /// start before it could ever finish.
    WatermarksInverted { low: usize, high: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroLowWatermark => f.write_str("low watermark must be at least 1"),
            ConfigError::WatermarksInverted { low, high } => write!(
                f,
                "low watermark ({low}) must not exceed high watermark ({high})"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Violation of the index/queue lockstep.
///
/// Produced by [`CacheCore::check_invariants`](crate::cache::CacheCore::check_invariants).
/// Each variant names one way the two containers can disagree; outside of
/// memory corruption or a bug in this crate, none of them is reachable.
///
/// # Example
///
/// ```
/// use tidecache::cache::CacheCore;
///
/// let mut cache: CacheCore<u32, String> = CacheCore::unbounded();
/// cache.insert(1, "one".to_string());
/// assert!(cache.check_invariants().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantError {
    /// The index and the eviction queue disagree on the entry count.
    LengthMismatch { index_len: usize, queue_len: usize },
    /// A key sitting in the eviction queue has no index entry.
    OrphanedQueueKey,
    /// An index entry's cursor does not resolve to that key's queue
    /// position.
    StaleCursor,
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantError::LengthMismatch {
                index_len,
                queue_len,
            } => write!(
                f,
                "index holds {index_len} entries but queue holds {queue_len}"
            ),
            InvariantError::OrphanedQueueKey => f.write_str("queue key missing from index"),
            InvariantError::StaleCursor => {
                f.write_str("index entry does not point back at its queue position")
            }
        }
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
