pub use crate::builder::CacheBuilder;
#[cfg(feature = "concurrency")]
pub use crate::cache::Cache;
pub use crate::cache::{CacheCore, UNBOUNDED_WATERMARK};
pub use crate::callback::PostEvictionCallback;
pub use crate::ds::{Cursor, EvictionQueue, QueueProctor};
pub use crate::error::{ConfigError, InvariantError};
pub use crate::policy::EvictionPolicy;

#[cfg(feature = "metrics")]
pub use crate::metrics::CacheMetricsSnapshot;
