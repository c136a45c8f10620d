use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info};

use crate::ais::{BulkLoadRepositoryTrait, LoadReport};
use crate::buffer::IngestionBuffer;
use crate::errors::Result;
use crate::events::ServiceEvent;
use crate::service::{Service, Wakeup};
use crate::staging::materialize;

/// Periodically drains the ingestion buffer into the store.
pub struct PersistenceCycleService {
    buffer: Arc<IngestionBuffer>,
    loader: Arc<dyn BulkLoadRepositoryTrait>,
    interval: Duration,
    batch_size: usize,
}

impl PersistenceCycleService {
    pub fn new(
        buffer: Arc<IngestionBuffer>,
        loader: Arc<dyn BulkLoadRepositoryTrait>,
        interval: Duration,
        batch_size: usize,
    ) -> Self {
        Self {
            buffer,
            loader,
            interval,
            batch_size: batch_size.max(1),
        }
    }

    /// Drains the buffer chunk by chunk, adding each load's counts to
    /// `report`.
    ///
    /// The first failing chunk stops the cycle: that chunk is lost, entries
    /// not yet drained stay buffered for the next cycle.
    pub async fn persist_into(&self, report: &mut LoadReport) -> Result<()> {
        for chunk in self.buffer.drain(self.batch_size) {
            let batch = materialize(&chunk);
            debug!("Loading chunk of {} records", batch.records);
            let loaded = self.loader.load(batch).await?;
            report.absorb(&loaded);
        }
        Ok(())
    }

    /// Runs one full cycle and returns its accumulated counts.
    pub async fn persist_pending(&self) -> (LoadReport, Result<()>) {
        let mut report = LoadReport::default();
        let outcome = self.persist_into(&mut report).await;
        (report, outcome)
    }
}

fn log_report(report: &LoadReport) {
    if report.total_input == 0 {
        debug!("Persistence cycle: nothing to persist");
        return;
    }

    if report.history_enabled {
        info!(
            "History: {} accepted, {} discarded",
            report.new_history_rows,
            report.discarded_history()
        );
    }
    info!(
        "Latest state: {} accepted, {} discarded",
        report.new_latest_rows,
        report.discarded_latest()
    );
}

#[async_trait]
impl Service for PersistenceCycleService {
    fn name(&self) -> &'static str {
        "PersistenceCycle"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn run_once(&mut self, _wakeup: Wakeup) -> Result<Option<ServiceEvent>> {
        let (report, outcome) = self.persist_pending().await;
        log_report(&report);

        if let Err(e) = outcome {
            error!(
                "Persistence cycle aborted after {} records, {} left buffered: {}",
                report.total_input,
                self.buffer.len(),
                e
            );
        }

        Ok(report
            .has_changes()
            .then(|| ServiceEvent::store_updated(report.new_history_rows, report.new_latest_rows)))
    }
}
