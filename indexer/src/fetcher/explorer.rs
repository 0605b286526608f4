use std::{collections::HashSet, sync::Arc};

use alloy::primitives::Address;
use async_trait::async_trait;
use campaign_store::{Network, TransferEvent};
use tracing::{debug, error, warn};

use super::TransferFetcher;
use crate::{
    error::AppError,
    events::transfer,
    explorer::{ExplorerApi, MAX_LOGS_PER_PAGE},
    rpc::ChainRpc,
    utils::parse_quantity,
};

/// Pages through the explorer's capped `getLogs` endpoint.
///
/// A full page whose last row is still below `to_block` was truncated, so the
/// next query restarts at that row's block. The boundary block is returned
/// again and merged by [`TransferEvent::dedup_key`]. If two consecutive pages
/// end on the same block, that block alone holds more rows than the cap and
/// cannot be paged through; what was gathered so far is returned.
pub struct ExplorerFetcher {
    network: Network,
    explorer: Arc<dyn ExplorerApi>,
    rpc: Arc<dyn ChainRpc>,
    reorg_margin: u64,
}

impl ExplorerFetcher {
    pub fn new(
        network: Network,
        explorer: Arc<dyn ExplorerApi>,
        rpc: Arc<dyn ChainRpc>,
        reorg_margin: u64,
    ) -> Self {
        Self {
            network,
            explorer,
            rpc,
            reorg_margin,
        }
    }

    pub async fn try_fetch(
        &self,
        contract: Address,
        from_block: u64,
        to_block: Option<u64>,
    ) -> Result<Vec<TransferEvent>, AppError> {
        // Resolved once so pagination does not chase the head.
        let to_block = match to_block {
            Some(block) => block,
            None => self
                .rpc
                .block_number()
                .await?
                .saturating_sub(self.reorg_margin),
        };

        let mut cursor = from_block;
        let mut previous_last: Option<u64> = None;
        let mut seen = HashSet::new();
        let mut transfers = Vec::new();

        loop {
            let logs = self.explorer.transfer_logs(contract, cursor, to_block).await?;
            let page_len = logs.len();

            let last_block = match logs.last() {
                Some(log) => Some(parse_quantity(&log.block_number).ok_or_else(|| {
                    AppError::Parse(format!("log block number `{}`", log.block_number))
                })?),
                None => None,
            };

            for log in &logs {
                let event = transfer::decode(log)?;
                if seen.insert(event.dedup_key()) {
                    transfers.push(event);
                }
            }

            let Some(last_block) = last_block else { break };
            if page_len < MAX_LOGS_PER_PAGE || last_block >= to_block {
                break;
            }

            if previous_last.is_some_and(|previous| last_block <= previous) {
                warn!(
                    network = %self.network,
                    %contract,
                    last_block,
                    "Last event block already fetched, returning partial result"
                );
                break;
            }

            warn!(
                network = %self.network,
                %contract,
                last_block,
                to_block,
                "Explorer page truncated, continuing from last event block"
            );
            previous_last = Some(last_block);
            cursor = last_block;
        }

        debug!(
            network = %self.network,
            %contract,
            from_block,
            to_block,
            count = transfers.len(),
            "Fetched transfers from explorer"
        );
        Ok(transfers)
    }
}

#[async_trait]
impl TransferFetcher for ExplorerFetcher {
    async fn fetch(&self, contract: Address, from_block: u64, to_block: Option<u64>) -> Vec<TransferEvent> {
        match self.try_fetch(contract, from_block, to_block).await {
            Ok(transfers) => transfers,
            Err(err) => {
                error!(
                    network = %self.network,
                    %contract,
                    %err,
                    "Error while fetching transfer events from explorer"
                );
                Vec::new()
            }
        }
    }
}
