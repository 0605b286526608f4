//! Per-network indexing pass.
//!
//! `collect_campaigns` → for every campaign: skip when idle, otherwise resolve
//! its block range, fetch transfers, apply the update gate and persist.
//! Campaigns are paced serially so the explorer key stays under its rate limit.

use std::{fmt, sync::Arc, time::Duration};

use alloy::primitives::Address;
use campaign_store::{CacheStore, Campaign, CampaignStatus, Network, TransferEvent};
use tracing::{debug, error, info, warn};

use crate::{
    chain_time::timestamp_to_block, clock::Clock, error::AppError, explorer::ExplorerApi,
    fetcher::TransferFetcher, registry::CampaignRegistry,
};

mod defaults {
    use std::time::Duration;

    pub const CAMPAIGN_DELAY: Duration = Duration::from_millis(1200);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassMode {
    /// Overwrite every campaign's transfers unconditionally.
    Full,
    /// Write only when more transfers were found than are cached.
    Incremental,
}

impl fmt::Display for PassMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassMode::Full => f.write_str("full"),
            PassMode::Incremental => f.write_str("incremental"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CampaignOutcome {
    /// Not started: no network calls, no cache writes.
    SkippedIdle,
    /// Range resolution or persistence failed; retried next pass.
    Failed(String),
    /// Incremental gate kept the cached list.
    UpToDate { found: usize, cached: u64 },
    Persisted { count: usize },
}

#[derive(Debug, Clone)]
pub struct CampaignReport {
    pub campaign_id: String,
    pub outcome: CampaignOutcome,
}

/// Immutable result of one pass over one network.
#[derive(Debug, Clone)]
pub struct PassReport {
    pub network: Network,
    pub mode: PassMode,
    pub campaigns: Vec<Campaign>,
    pub results: Vec<CampaignReport>,
}

impl PassReport {
    pub fn count(&self, matches: impl Fn(&CampaignOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| matches(&r.outcome)).count()
    }

    pub fn outcome(&self, campaign_id: &str) -> Option<&CampaignOutcome> {
        self.results
            .iter()
            .find(|r| r.campaign_id == campaign_id)
            .map(|r| &r.outcome)
    }
}

/// Write iff strictly more transfers were found than are cached.
///
/// A count comparison, not a diff: a reorg that swaps one event for another
/// leaves the count unchanged and the update is skipped.
pub fn gate_allows_write(found: usize, cached: Option<u64>) -> bool {
    found as u64 > cached.unwrap_or(0)
}

pub struct CampaignIndexer {
    network: Network,
    registry: Arc<dyn CampaignRegistry>,
    explorer: Arc<dyn ExplorerApi>,
    fetcher: Box<dyn TransferFetcher>,
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    campaign_delay: Duration,
}

impl CampaignIndexer {
    pub fn new(
        network: Network,
        registry: Arc<dyn CampaignRegistry>,
        explorer: Arc<dyn ExplorerApi>,
        fetcher: Box<dyn TransferFetcher>,
        store: Arc<dyn CacheStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        info!(%network, "Creating indexer");

        Self {
            network,
            registry,
            explorer,
            fetcher,
            store,
            clock,
            campaign_delay: defaults::CAMPAIGN_DELAY,
        }
    }

    pub fn with_campaign_delay(mut self, delay: Duration) -> Self {
        self.campaign_delay = delay;
        self
    }

    /// Fetch the registry, keep this network's campaigns and replace the
    /// cached list wholesale. Any failure yields an empty set for this pass.
    pub async fn collect_campaigns(&self) -> Vec<Campaign> {
        match self.try_collect_campaigns().await {
            Ok(campaigns) => campaigns,
            Err(err) => {
                error!(network = %self.network, %err, "Error while fetching campaigns");
                Vec::new()
            }
        }
    }

    async fn try_collect_campaigns(&self) -> Result<Vec<Campaign>, AppError> {
        let now = self.clock.now();

        let campaigns: Vec<Campaign> = self
            .registry
            .fetch_campaigns()
            .await?
            .into_iter()
            .filter(|campaign| campaign.networks().contains(&self.network))
            .map(|campaign| campaign.into_campaign(self.network, now))
            .collect();

        debug!(network = %self.network, count = campaigns.len(), "Found campaigns");

        self.store.replace_campaigns(self.network, &campaigns).await?;
        Ok(campaigns)
    }

    /// Start block, and end block for ended campaigns (`None` = latest).
    async fn resolve_range(
        &self,
        campaign: &Campaign,
        status: CampaignStatus,
    ) -> Result<(u64, Option<u64>), AppError> {
        let missing = |bound| AppError::MissingBlock {
            campaign_id: campaign.id.clone(),
            bound,
        };

        let start_block = timestamp_to_block(self.explorer.as_ref(), campaign.start_time).await?;
        if start_block == 0 {
            return Err(missing("start"));
        }

        let end_block = match status {
            CampaignStatus::Ended => {
                let end_block = timestamp_to_block(self.explorer.as_ref(), campaign.end_time).await?;
                if end_block == 0 {
                    return Err(missing("end"));
                }
                Some(end_block)
            }
            _ => None,
        };

        Ok((start_block, end_block))
    }

    /// Every transfer of the campaign's contract within its lifetime.
    ///
    /// Idle campaigns return nothing without touching the network. Upstream
    /// failures while fetching come back as an empty list; only range
    /// resolution and a malformed contract address are errors.
    pub async fn get_all_transfers(&self, campaign: &Campaign) -> Result<Vec<TransferEvent>, AppError> {
        let status = campaign.status_at(self.clock.now());
        if status == CampaignStatus::Idle {
            return Ok(Vec::new());
        }

        let contract: Address = campaign
            .address
            .parse()
            .map_err(|_| AppError::InvalidAddress(campaign.address.clone()))?;

        let (start_block, end_block) = self.resolve_range(campaign, status).await?;
        debug!(
            network = %self.network,
            campaign_id = %campaign.id,
            start_block,
            ?end_block,
            "Resolved campaign block range"
        );

        Ok(self.fetcher.fetch(contract, start_block, end_block).await)
    }

    async fn save_transfers(&self, campaign: &Campaign, transfers: Vec<TransferEvent>) -> Result<usize, AppError> {
        let decorated: Vec<TransferEvent> = transfers
            .into_iter()
            .map(|transfer| transfer.decorated(campaign))
            .collect();

        self.store.replace_transfers(&campaign.id, &decorated).await?;
        Ok(decorated.len())
    }

    pub async fn index_campaign(&self, campaign: &Campaign, mode: PassMode) -> CampaignOutcome {
        if campaign.status_at(self.clock.now()) == CampaignStatus::Idle {
            warn!(campaign_id = %campaign.id, "Campaign is idle, skipping indexing");
            return CampaignOutcome::SkippedIdle;
        }

        let transfers = match self.get_all_transfers(campaign).await {
            Ok(transfers) => transfers,
            Err(err) => {
                error!(
                    network = %self.network,
                    campaign_id = %campaign.id,
                    title = %campaign.title,
                    %err,
                    "Error while fetching transfers"
                );
                return CampaignOutcome::Failed(err.to_string());
            }
        };
        info!(campaign_id = %campaign.id, count = transfers.len(), "Transfers found");

        if mode == PassMode::Incremental {
            let cached = match self.store.transfer_count(&campaign.id).await {
                Ok(cached) => cached,
                Err(err) => {
                    error!(campaign_id = %campaign.id, %err, "Error reading cached transfer count");
                    return CampaignOutcome::Failed(err.to_string());
                }
            };
            if !gate_allows_write(transfers.len(), cached) {
                info!(campaign_id = %campaign.id, "Campaign is up to date");
                return CampaignOutcome::UpToDate {
                    found: transfers.len(),
                    cached: cached.unwrap_or(0),
                };
            }
        }

        match self.save_transfers(campaign, transfers).await {
            Ok(count) => CampaignOutcome::Persisted { count },
            Err(err) => {
                error!(campaign_id = %campaign.id, %err, "Error while saving transfers");
                CampaignOutcome::Failed(err.to_string())
            }
        }
    }

    /// Run one pass over this network's campaigns.
    pub async fn index_all_campaigns(&self, mode: PassMode) -> PassReport {
        if mode == PassMode::Incremental {
            info!(network = %self.network, "Running in update mode...");
        }

        let campaigns = self.collect_campaigns().await;
        let mut results = Vec::with_capacity(campaigns.len());

        for campaign in &campaigns {
            let outcome = self.index_campaign(campaign, mode).await;
            let touched_network = outcome != CampaignOutcome::SkippedIdle;
            results.push(CampaignReport {
                campaign_id: campaign.id.clone(),
                outcome,
            });

            if touched_network {
                self.clock.sleep(self.campaign_delay).await;
            }
        }

        info!(network = %self.network, %mode, campaigns = campaigns.len(), "Indexing finished");

        PassReport {
            network: self.network,
            mode,
            campaigns,
            results,
        }
    }
}
