use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use shipwatch_feed::{FeedError, FeedProvider, RawRecord};

use crate::buffer::IngestionBuffer;
use crate::cache::{message_key, KeyValueCache};
use crate::errors::Result;
use crate::events::ServiceEvent;
use crate::service::{Service, Wakeup};

/// Pulls the latest observations from a feed into the ingestion buffer.
pub struct FeedPollerService {
    provider: Arc<dyn FeedProvider>,
    buffer: Arc<IngestionBuffer>,
    interval: Duration,
    cache: Option<(Arc<dyn KeyValueCache>, Duration)>,
}

impl FeedPollerService {
    pub fn new(
        provider: Arc<dyn FeedProvider>,
        buffer: Arc<IngestionBuffer>,
        interval: Duration,
    ) -> Self {
        Self {
            provider,
            buffer,
            interval,
            cache: None,
        }
    }

    /// Mirrors every fetched record into `cache` for `ttl`.
    pub fn with_cache(mut self, cache: Arc<dyn KeyValueCache>, ttl: Duration) -> Self {
        self.cache = Some((cache, ttl));
        self
    }

    /// Fetches once and buffers the result.
    ///
    /// Returns the number of records inserted, or `None` when the feed had
    /// nothing or failed transiently.
    pub async fn poll(&self) -> Result<Option<usize>> {
        if let Some((cache, _)) = &self.cache {
            let evicted = cache.evict_expired();
            if evicted > 0 {
                debug!("Evicted {} expired cache entries", evicted);
            }
        }

        let records = match self.provider.fetch_latest().await {
            Ok(records) => records,
            Err(FeedError::NoData) => {
                debug!("{} returned no data", self.provider.id());
                return Ok(None);
            }
            Err(e) if e.is_transient() => {
                warn!("Fetching from {} failed: {}", self.provider.id(), e);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let fetched = records.len();
        if let Some((cache, ttl)) = &self.cache {
            mirror_to_cache(cache.as_ref(), &records, *ttl);
        }

        let inserted = self.buffer.update(records);
        info!(
            "Fetched {} records from {}: {} buffered, {} pending",
            fetched,
            self.provider.id(),
            inserted,
            self.buffer.len()
        );
        Ok(Some(inserted))
    }
}

fn mirror_to_cache(cache: &dyn KeyValueCache, records: &[RawRecord], ttl: Duration) {
    for record in records {
        match serde_json::to_string(record) {
            Ok(json) => cache.set(&message_key(record), json, ttl),
            Err(e) => warn!("Could not cache record {}: {}", message_key(record), e),
        }
    }
}

#[async_trait]
impl Service for FeedPollerService {
    fn name(&self) -> &'static str {
        "FeedPoller"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn run_on_start(&self) -> bool {
        true
    }

    async fn run_once(&mut self, _wakeup: Wakeup) -> Result<Option<ServiceEvent>> {
        Ok(self
            .poll()
            .await?
            .map(|_| ServiceEvent::buffer_updated(self.buffer.len())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::DedupPolicy;
    use crate::cache::MemoryCache;
    use chrono::DateTime;
    use shipwatch_feed::{Mmsi, Position, StaticInfo};
    use std::sync::Mutex;

    struct ScriptedProvider {
        responses: Mutex<Vec<std::result::Result<Vec<RawRecord>, FeedError>>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<std::result::Result<Vec<RawRecord>, FeedError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses),
            })
        }
    }

    #[async_trait]
    impl FeedProvider for ScriptedProvider {
        fn id(&self) -> &'static str {
            "SCRIPTED"
        }

        async fn fetch_latest(&self) -> std::result::Result<Vec<RawRecord>, FeedError> {
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Err(FeedError::NoData);
            }
            responses.remove(0)
        }
    }

    fn record(mmsi: u32, secs: i64) -> RawRecord {
        RawRecord::new(
            Mmsi(mmsi),
            DateTime::from_timestamp(secs, 0).unwrap(),
            Position::from_coordinates(1.0, 2.0),
            StaticInfo::default(),
        )
    }

    fn poller(provider: Arc<ScriptedProvider>, buffer: &Arc<IngestionBuffer>) -> FeedPollerService {
        FeedPollerService::new(provider, Arc::clone(buffer), Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_poll_buffers_records() {
        let buffer = Arc::new(IngestionBuffer::new(DedupPolicy::Observation));
        let provider = ScriptedProvider::new(vec![
            Ok(vec![record(1, 10), record(2, 10)]),
            Ok(vec![record(1, 10), record(1, 20)]),
        ]);
        let mut service = poller(provider, &buffer);

        let event = service.run_once(Wakeup::Startup).await.unwrap();
        assert_eq!(event, Some(ServiceEvent::buffer_updated(2)));

        assert_eq!(service.poll().await.unwrap(), Some(1));
        assert_eq!(buffer.len(), 3);
    }

    #[tokio::test]
    async fn test_no_data_and_transient_errors_are_quiet() {
        let buffer = Arc::new(IngestionBuffer::default());
        let provider = ScriptedProvider::new(vec![
            Err(FeedError::NoData),
            Err(FeedError::Timeout {
                provider: "SCRIPTED".to_string(),
            }),
        ]);
        let mut service = poller(provider, &buffer);

        assert_eq!(service.run_once(Wakeup::Timeout).await.unwrap(), None);
        assert_eq!(service.run_once(Wakeup::Timeout).await.unwrap(), None);
        assert!(buffer.is_empty());
    }

    #[tokio::test]
    async fn test_feed_reported_and_malformed_errors_are_skipped() {
        let buffer = Arc::new(IngestionBuffer::default());
        let provider = ScriptedProvider::new(vec![
            Err(FeedError::Provider {
                provider: "SCRIPTED".to_string(),
                message: "Too frequent requests".to_string(),
            }),
            Err(FeedError::Malformed {
                provider: "SCRIPTED".to_string(),
                message: "not gzip".to_string(),
            }),
            Ok(vec![record(1, 10)]),
        ]);
        let mut service = poller(provider, &buffer);

        assert_eq!(service.run_once(Wakeup::Timeout).await.unwrap(), None);
        assert_eq!(service.run_once(Wakeup::Timeout).await.unwrap(), None);
        assert_eq!(
            service.run_once(Wakeup::Timeout).await.unwrap(),
            Some(ServiceEvent::buffer_updated(1))
        );
    }

    #[tokio::test]
    async fn test_records_are_mirrored_to_cache() {
        let buffer = Arc::new(IngestionBuffer::default());
        let cache = Arc::new(MemoryCache::new());
        let provider = ScriptedProvider::new(vec![Ok(vec![record(232003233, 1567068530)])]);
        let service = poller(provider, &buffer).with_cache(cache.clone(), Duration::from_secs(78));

        service.poll().await.unwrap();

        let cached = cache.get("message:232003233:1567068530").unwrap();
        let decoded: RawRecord = serde_json::from_str(&cached).unwrap();
        assert_eq!(decoded, record(232003233, 1567068530));
    }

    #[tokio::test]
    async fn test_expired_cache_entries_do_not_pile_up() {
        let buffer = Arc::new(IngestionBuffer::default());
        let cache = Arc::new(MemoryCache::new());
        let polls: Vec<std::result::Result<Vec<RawRecord>, FeedError>> = (0..20)
            .map(|poll| Ok((0..100).map(|i| record(i, 1_000 + poll)).collect()))
            .collect();
        let service = poller(ScriptedProvider::new(polls), &buffer)
            .with_cache(cache.clone(), Duration::from_millis(1));

        for _ in 0..20 {
            service.poll().await.unwrap();
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        assert!(cache.len() <= 100, "cache holds {} entries", cache.len());
        assert_eq!(buffer.len(), 2000);
    }

    #[test]
    fn test_poller_runs_on_start() {
        let buffer = Arc::new(IngestionBuffer::default());
        let service = poller(ScriptedProvider::new(vec![]), &buffer);
        assert!(service.run_on_start());
        assert_eq!(service.interval(), Duration::from_secs(60));
    }
}
