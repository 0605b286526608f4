//! Strategies for retrieving every Transfer event of one contract in a block range.
//!
//! Both strategies fail soft: upstream errors are logged and surface as an
//! empty result so one campaign never aborts the pass of the others.

mod explorer;
mod rpc;

use std::{str::FromStr, sync::Arc};

use alloy::primitives::Address;
use async_trait::async_trait;
use campaign_store::{Network, TransferEvent};

pub use explorer::ExplorerFetcher;
pub use rpc::RpcFetcher;

use crate::{error::AppError, explorer::ExplorerApi, rpc::ChainRpc};

#[async_trait]
pub trait TransferFetcher: Send + Sync {
    /// Transfers of `contract` in `[from_block, to_block]`; `None` means latest.
    async fn fetch(&self, contract: Address, from_block: u64, to_block: Option<u64>) -> Vec<TransferEvent>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMethod {
    /// Paginated explorer `getLogs`, subject to the 1000-row cap.
    Explorer,
    /// One `eth_getLogs` filter for the whole range, fuzzy timestamps.
    Rpc,
}

impl FromStr for FetchMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "explorer" => Ok(FetchMethod::Explorer),
            "rpc" => Ok(FetchMethod::Rpc),
            _ => Err(AppError::InvalidFetchMethod(s.to_string())),
        }
    }
}

/// Build the fetcher for `method`.
pub fn build(
    method: FetchMethod,
    network: Network,
    explorer: Arc<dyn ExplorerApi>,
    rpc: Arc<dyn ChainRpc>,
    reorg_margin: u64,
) -> Box<dyn TransferFetcher> {
    match method {
        FetchMethod::Explorer => Box::new(ExplorerFetcher::new(network, explorer, rpc, reorg_margin)),
        FetchMethod::Rpc => Box::new(RpcFetcher::new(network, rpc)),
    }
}
