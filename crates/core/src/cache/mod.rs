//! Optional observation cache.
//!
//! The feed poller can mirror fetched records into a key/value cache so that
//! other consumers see the latest observations before they are persisted.

mod cache_traits;
mod memory_cache;

pub use cache_traits::{message_key, validate_ttl, KeyValueCache};
pub use memory_cache::MemoryCache;
