//! Conversions between wall-clock time and block numbers.
//!
//! `timestamp_to_block` asks the explorer and is exact. `block_to_timestamp`
//! is a linear model over a per-network genesis time and average block time;
//! it only feeds display timestamps, never indexing control flow.

use campaign_store::Network;
use chrono::{DateTime, Utc};

use crate::{error::AppError, explorer::ExplorerApi};

/// Last block at or before `time`, from the explorer of the network.
pub async fn timestamp_to_block<E>(explorer: &E, time: DateTime<Utc>) -> Result<u64, AppError>
where
    E: ExplorerApi + ?Sized,
{
    explorer.block_by_timestamp(time.timestamp()).await
}

/// Approximate timestamp (seconds) of `block_number`.
pub fn block_to_timestamp(block_number: u64, network: Network) -> u64 {
    let seconds = network.genesis_timestamp() as f64 + block_number as f64 * network.avg_block_time();
    seconds.floor() as u64
}

/// Network of a chain id, failing fast for unsupported chains.
pub fn network_for_chain(chain_id: u64) -> Result<Network, AppError> {
    Network::from_chain_id(chain_id).ok_or(AppError::UnsupportedChainId(chain_id))
}
