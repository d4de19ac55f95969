pub mod eviction_queue;

pub use eviction_queue::{Cursor, EvictionQueue, QueueProctor};
