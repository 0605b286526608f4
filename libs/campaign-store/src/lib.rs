//! Cache persistence for campaign and transfer records.
//!
//! Layout per network `N` and campaign `C`:
//! - `campaigns:{N}`: list of JSON campaigns, replaced every collection cycle
//! - `transfers:{C}`: list of JSON transfer events, replaced on update
//! - `transfers:length:{C}`: length of `transfers:{C}`, written right after it
//! - `stats`: JSON rollup written by the aggregator

use async_trait::async_trait;

pub mod entity;
pub mod error;
pub mod keys;
mod memory;
mod redis_store;

pub use entity::{Campaign, CampaignStatus, CampaignSummary, Claim, Network, Stats, TransferEvent};
pub use error::CacheError;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

pub type CacheResult<T> = Result<T, CacheError>;

/// Key-value persistence used by the indexer and the aggregator.
///
/// List writes are delete-then-bulk-insert. No transaction spans the list and
/// its counter; a crash between the two leaves them out of step until the
/// next full pass rewrites both.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Replace the campaign list of `network`.
    async fn replace_campaigns(&self, network: Network, campaigns: &[Campaign]) -> CacheResult<()>;

    async fn campaigns(&self, network: Network) -> CacheResult<Vec<Campaign>>;

    /// Campaigns of every supported network, in `Network::ALL` order.
    async fn all_campaigns(&self) -> CacheResult<Vec<Campaign>> {
        let mut all = Vec::new();
        for network in Network::ALL {
            all.extend(self.campaigns(network).await?);
        }
        Ok(all)
    }

    /// Replace the transfer list of a campaign and set its length counter.
    async fn replace_transfers(&self, campaign_id: &str, transfers: &[TransferEvent]) -> CacheResult<()>;

    async fn transfers(&self, campaign_id: &str) -> CacheResult<Vec<TransferEvent>>;

    /// Cached transfer counter, `None` when never written.
    async fn transfer_count(&self, campaign_id: &str) -> CacheResult<Option<u64>>;

    async fn save_stats(&self, stats: &Stats) -> CacheResult<()>;

    async fn clear_stats(&self) -> CacheResult<()>;

    /// Drop every key this crate owns.
    async fn flush(&self) -> CacheResult<()>;
}

pub(crate) fn encode_all<T: serde::Serialize>(items: &[T]) -> CacheResult<Vec<String>> {
    items
        .iter()
        .map(|item| serde_json::to_string(item).map_err(CacheError::from))
        .collect()
}

pub(crate) fn decode_all<T: serde::de::DeserializeOwned>(values: &[String]) -> CacheResult<Vec<T>> {
    values
        .iter()
        .map(|value| serde_json::from_str(value).map_err(CacheError::from))
        .collect()
}

pub(crate) fn parse_counter(key: &str, value: String) -> CacheResult<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| CacheError::CorruptCounter {
            key: key.to_string(),
            value,
        })
}
