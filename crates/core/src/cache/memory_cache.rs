use std::time::{Duration, Instant};

use dashmap::DashMap;

use super::KeyValueCache;

/// In-process cache backed by a concurrent map.
///
/// Expired entries are dropped on read and by [`KeyValueCache::evict_expired`],
/// which the feed poller calls on every wakeup.
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, (String, Instant)>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueCache for MemoryCache {
    fn set(&self, key: &str, value: String, ttl: Duration) {
        self.entries
            .insert(key.to_string(), (value, Instant::now() + ttl));
    }

    fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        let value = self.entries.get(key).and_then(|entry| {
            let (value, expires_at) = entry.value();
            (*expires_at > now).then(|| value.clone())
        });

        if value.is_none() {
            self.entries.remove_if(key, |_, (_, expires_at)| *expires_at <= now);
        }
        value
    }

    fn scan_prefix(&self, prefix: &str) -> Vec<(String, String)> {
        let now = Instant::now();
        self.entries
            .iter()
            .filter(|entry| entry.key().starts_with(prefix) && entry.value().1 > now)
            .map(|entry| (entry.key().clone(), entry.value().0.clone()))
            .collect()
    }

    fn delete(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, (_, expires_at)| *expires_at > now);
        before.saturating_sub(self.entries.len())
    }
}
