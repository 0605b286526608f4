use std::sync::Arc;

use alloy::primitives::Address;
use async_trait::async_trait;
use campaign_store::{Network, TransferEvent};
use tracing::{debug, error};

use super::TransferFetcher;
use crate::{
    chain_time::block_to_timestamp, error::AppError, events::transfer, rpc::ChainRpc,
    utils::parse_quantity,
};

/// One log filter over the whole range. Each event gets a fuzzy timestamp
/// since RPC logs carry none.
pub struct RpcFetcher {
    network: Network,
    rpc: Arc<dyn ChainRpc>,
}

impl RpcFetcher {
    pub fn new(network: Network, rpc: Arc<dyn ChainRpc>) -> Self {
        Self { network, rpc }
    }

    pub async fn try_fetch(
        &self,
        contract: Address,
        from_block: u64,
        to_block: Option<u64>,
    ) -> Result<Vec<TransferEvent>, AppError> {
        debug!(network = %self.network, %contract, from_block, "Querying transfers from RPC");

        let logs = self.rpc.transfer_logs(contract, from_block, to_block).await?;
        debug!(network = %self.network, count = logs.len(), "Found transfer events");

        logs.iter()
            .map(|log| {
                let mut event = transfer::decode(log)?;
                let block = event
                    .block_number
                    .as_deref()
                    .and_then(parse_quantity)
                    .unwrap_or_default();
                event.timestamp = Some(block_to_timestamp(block, self.network).to_string());
                Ok(event)
            })
            .collect()
    }
}

#[async_trait]
impl TransferFetcher for RpcFetcher {
    async fn fetch(&self, contract: Address, from_block: u64, to_block: Option<u64>) -> Vec<TransferEvent> {
        match self.try_fetch(contract, from_block, to_block).await {
            Ok(transfers) => transfers,
            Err(err) => {
                error!(
                    network = %self.network,
                    %contract,
                    %err,
                    "Error while fetching transfer events from RPC"
                );
                Vec::new()
            }
        }
    }
}
