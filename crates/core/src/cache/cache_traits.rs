use std::time::Duration;

use shipwatch_feed::RawRecord;

use crate::constants::CACHE_MESSAGE_PREFIX;
use crate::errors::{Error, Result};

/// Minimal key/value store with per-entry expiry.
pub trait KeyValueCache: Send + Sync {
    fn set(&self, key: &str, value: String, ttl: Duration);

    /// Returns the value unless it is missing or expired.
    fn get(&self, key: &str) -> Option<String>;

    /// Live entries whose key starts with `prefix`.
    fn scan_prefix(&self, prefix: &str) -> Vec<(String, String)>;

    /// Returns true when an entry was removed.
    fn delete(&self, key: &str) -> bool;

    /// Drops every expired entry and returns how many went.
    fn evict_expired(&self) -> usize;
}

/// Cache key of an observation: `message:{mmsi}:{unix seconds}`.
pub fn message_key(record: &RawRecord) -> String {
    format!(
        "{}:{}:{}",
        CACHE_MESSAGE_PREFIX,
        record.mmsi,
        record.time.timestamp()
    )
}

/// Checks that cached observations outlive one poll but not two.
pub fn validate_ttl(poll_interval: Duration, ttl: Duration) -> Result<()> {
    if ttl <= poll_interval || ttl >= poll_interval * 2 {
        return Err(Error::InvalidConfigValue(format!(
            "cache TTL {}s must be greater than the poll interval ({}s) and less than twice it",
            ttl.as_secs_f64(),
            poll_interval.as_secs_f64()
        )));
    }
    Ok(())
}
