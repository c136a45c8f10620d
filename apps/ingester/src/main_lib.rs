use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use shipwatch_core::buffer::IngestionBuffer;
use shipwatch_core::cache::MemoryCache;
use shipwatch_core::ingest::{FeedPollerService, GeometryRefreshService, PersistenceCycleService};
use shipwatch_core::service::Supervisor;
use shipwatch_feed::{AisHubConfig, AisHubProvider, FeedProvider};
use shipwatch_storage_sqlite::{db, AisRepository};

use crate::config::Config;

pub fn init_tracing() {
    let log_format = std::env::var("SHIPWATCH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// The three long-running services of the ingester, wired together.
///
/// ```text
/// FeedPoller ──► IngestionBuffer ──► PersistenceCycle ──StoreUpdated──► GeometryRefresh
/// ```
pub struct Ingester {
    pub buffer: Arc<IngestionBuffer>,
    pub poller: Supervisor,
    pub persistence: Supervisor,
    pub geometry: Supervisor,
}

impl Ingester {
    fn supervisors(&self) -> [&Supervisor; 3] {
        [&self.poller, &self.persistence, &self.geometry]
    }

    pub fn start(&self) -> anyhow::Result<()> {
        for supervisor in self.supervisors() {
            supervisor.start()?;
        }
        Ok(())
    }

    pub fn stop(&self) {
        for supervisor in self.supervisors() {
            supervisor.stop();
        }
    }

    pub async fn await_termination(&self) {
        for supervisor in self.supervisors() {
            supervisor.await_termination().await;
        }
    }
}

pub fn build_ingester(config: &Config) -> anyhow::Result<Ingester> {
    let provider = AisHubProvider::new(
        AisHubConfig::new(config.feed_username.clone()).with_url(config.feed_url.clone()),
    );
    build_ingester_with_provider(config, Arc::new(provider))
}

/// Opens the store and wires the services around `provider`.
///
/// Must be called inside a tokio runtime; the store's writer actor is
/// spawned here.
pub fn build_ingester_with_provider(
    config: &Config,
    provider: Arc<dyn FeedProvider>,
) -> anyhow::Result<Ingester> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);
    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone())?;
    let repository = Arc::new(AisRepository::new(pool, writer, config.keep_history));

    let buffer = Arc::new(IngestionBuffer::new(config.dedup_policy));
    tracing::info!(
        "Buffering with {} deduplication, history {}",
        config.dedup_policy,
        if config.keep_history { "on" } else { "off" }
    );

    let mut poller_service =
        FeedPollerService::new(provider, Arc::clone(&buffer), config.poll_interval);
    if let Some(ttl) = config.cache_ttl {
        poller_service = poller_service.with_cache(Arc::new(MemoryCache::new()), ttl);
    }

    let poller = Supervisor::new(poller_service);
    let persistence = Supervisor::new(PersistenceCycleService::new(
        Arc::clone(&buffer),
        repository.clone(),
        config.persist_interval,
        config.drain_batch_size,
    ));
    let geometry = Supervisor::new(GeometryRefreshService::new(
        repository,
        config.geometry_interval,
    ));
    persistence.bus().subscribe(geometry.sink());

    Ok(Ingester {
        buffer,
        poller,
        persistence,
        geometry,
    })
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipwatch_core::buffer::DedupPolicy;
    use shipwatch_core::service::ServiceState;
    use shipwatch_feed::{FeedError, RawRecord};
    use std::time::Duration;
    use tempfile::tempdir;

    struct QuietFeed;

    #[async_trait::async_trait]
    impl FeedProvider for QuietFeed {
        fn id(&self) -> &'static str {
            "QUIET"
        }

        async fn fetch_latest(&self) -> Result<Vec<RawRecord>, FeedError> {
            Err(FeedError::NoData)
        }
    }

    fn test_config(db_path: String) -> Config {
        Config {
            db_path,
            feed_url: "http://localhost".to_string(),
            feed_username: "test".to_string(),
            poll_interval: Duration::from_secs(60),
            persist_interval: Duration::from_secs(120),
            geometry_interval: Duration::from_secs(300),
            keep_history: true,
            drain_batch_size: 100,
            dedup_policy: DedupPolicy::Vessel,
            cache_ttl: None,
        }
    }

    #[tokio::test]
    async fn test_ingester_starts_and_stops() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("db").join("ingester.db");
        let config = test_config(db_path.to_string_lossy().to_string());

        let ingester = build_ingester_with_provider(&config, Arc::new(QuietFeed)).unwrap();
        assert_eq!(ingester.persistence.bus().subscriber_count(), 1);

        ingester.start().unwrap();
        ingester.stop();
        ingester.await_termination().await;

        for supervisor in ingester.supervisors() {
            assert_eq!(supervisor.state(), ServiceState::Stopped);
        }
        assert!(db_path.exists());
    }
}
