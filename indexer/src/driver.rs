//! Outer loop: full pass first, then incremental passes on the scheduler's
//! cadence, each followed by a stats rollup.
//!
//! Networks are indexed one after another so only one pass ever touches a
//! given campaign at a time.

use std::{sync::Arc, time::Duration};

use campaign_store::CacheStore;
use tracing::info;

use crate::{
    aggregator::Aggregator,
    clock::Clock,
    error::AppError,
    scheduler::Scheduler,
    service::{CampaignIndexer, CampaignOutcome, PassMode, PassReport},
};

pub struct Driver {
    indexers: Vec<CampaignIndexer>,
    aggregator: Aggregator,
    store: Arc<dyn CacheStore>,
    scheduler: Scheduler,
    clock: Arc<dyn Clock>,
    network_delay: Duration,
    flush_on_start: bool,
}

impl Driver {
    pub fn new(
        indexers: Vec<CampaignIndexer>,
        aggregator: Aggregator,
        store: Arc<dyn CacheStore>,
        scheduler: Scheduler,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            indexers,
            aggregator,
            store,
            scheduler,
            clock,
            network_delay: Duration::from_millis(1200),
            flush_on_start: true,
        }
    }

    pub fn with_network_delay(mut self, delay: Duration) -> Self {
        self.network_delay = delay;
        self
    }

    pub fn with_flush_on_start(mut self, flush: bool) -> Self {
        self.flush_on_start = flush;
        self
    }

    /// Flush cached state if configured to.
    pub async fn start(&self) -> Result<(), AppError> {
        if self.flush_on_start {
            info!("Flushing cache");
            self.store.flush().await?;
        }
        Ok(())
    }

    /// Index every network in `mode`, then recompute stats.
    pub async fn run_pass(&self, mode: PassMode) -> Result<Vec<PassReport>, AppError> {
        let mut reports = Vec::with_capacity(self.indexers.len());

        for indexer in &self.indexers {
            let report = indexer.index_all_campaigns(mode).await;
            info!(
                network = %report.network,
                %mode,
                campaigns = report.campaigns.len(),
                persisted = report.count(|o| matches!(o, CampaignOutcome::Persisted { .. })),
                up_to_date = report.count(|o| matches!(o, CampaignOutcome::UpToDate { .. })),
                idle = report.count(|o| *o == CampaignOutcome::SkippedIdle),
                failed = report.count(|o| matches!(o, CampaignOutcome::Failed(_))),
                "Pass finished"
            );
            reports.push(report);
            self.clock.sleep(self.network_delay).await;
        }

        self.aggregator.calculate_stats().await?;
        Ok(reports)
    }

    /// Wait for the next tick and run the pass it asks for.
    pub async fn step(&mut self) -> Result<Vec<PassReport>, AppError> {
        let mode = self.scheduler.tick().await;
        self.run_pass(mode).await
    }

    /// Run until the process is terminated or a pass fails outside the
    /// per-campaign error boundary.
    pub async fn run(mut self) -> Result<(), AppError> {
        self.start().await?;
        loop {
            self.step().await?;
        }
    }
}
