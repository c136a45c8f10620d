use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};

use crate::ais::ShipGeometryRepositoryTrait;
use crate::errors::Result;
use crate::events::ServiceEvent;
use crate::service::{Service, Wakeup};

/// Re-derives ship geometry whenever the persistence cycle reports new rows.
///
/// Subscribe its supervisor's sink to the persistence cycle's bus. Timer
/// wakeups without events do nothing.
pub struct GeometryRefreshService {
    store: Arc<dyn ShipGeometryRepositoryTrait>,
    interval: Duration,
}

impl GeometryRefreshService {
    pub fn new(store: Arc<dyn ShipGeometryRepositoryTrait>, interval: Duration) -> Self {
        Self { store, interval }
    }
}

#[async_trait]
impl Service for GeometryRefreshService {
    fn name(&self) -> &'static str {
        "GeometryRefresh"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn run_once(&mut self, wakeup: Wakeup) -> Result<Option<ServiceEvent>> {
        let store_updated = wakeup
            .events()
            .iter()
            .any(|e| matches!(e, ServiceEvent::StoreUpdated { .. }));
        if !store_updated {
            debug!("Geometry refresh skipped: {:?}", wakeup);
            return Ok(None);
        }

        let refreshed = self.store.refresh_geometries().await?;
        info!("Refreshed geometry of {} vessels", refreshed);
        Ok(None)
    }
}
