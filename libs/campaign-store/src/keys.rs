//! Cache key layout shared by the indexer and the aggregator.

use crate::entity::Network;

pub const STATS: &str = "stats";

/// Namespaces removed when the cache is flushed.
pub const NAMESPACES: [&str; 3] = ["campaigns:*", "transfers:*", STATS];

pub fn campaigns(network: Network) -> String {
    format!("campaigns:{network}")
}

pub fn transfers(campaign_id: &str) -> String {
    format!("transfers:{campaign_id}")
}

pub fn transfer_count(campaign_id: &str) -> String {
    format!("transfers:length:{campaign_id}")
}
