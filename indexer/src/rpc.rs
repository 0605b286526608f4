//! JSON-RPC access through an alloy provider.

use std::sync::Arc;

use alloy::{
    eips::BlockNumberOrTag,
    hex,
    primitives::Address,
    providers::{Provider, ProviderBuilder},
    rpc::types::{Filter, Log},
};
use async_trait::async_trait;

use crate::{
    error::AppError,
    events::{topics, RawLog},
};

#[async_trait]
pub trait ChainRpc: Send + Sync {
    async fn block_number(&self) -> Result<u64, AppError>;

    /// Transfer logs of `contract` from `from_block` up to `to_block`
    /// (chain head when `None`). Not subject to the explorer row cap.
    async fn transfer_logs(
        &self,
        contract: Address,
        from_block: u64,
        to_block: Option<u64>,
    ) -> Result<Vec<RawLog>, AppError>;
}

pub struct AlloyRpc<P> {
    provider: P,
}

impl<P: Provider> AlloyRpc<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

/// Connect to `rpc_url` (http, ws or ipc, picked from the scheme).
pub async fn connect(rpc_url: &str) -> Result<Arc<dyn ChainRpc>, AppError> {
    let provider = ProviderBuilder::new()
        .on_builtin(rpc_url)
        .await
        .map_err(|e| AppError::Rpc(e.to_string()))?;

    Ok(Arc::new(AlloyRpc::new(provider)))
}

fn build_filter(contract: Address, from_block: u64, to_block: Option<u64>) -> Filter {
    let to_block = match to_block {
        Some(number) => BlockNumberOrTag::Number(number),
        None => BlockNumberOrTag::Latest,
    };

    Filter::new()
        .address(contract)
        .event_signature(topics::TRANSFER)
        .from_block(BlockNumberOrTag::Number(from_block))
        .to_block(to_block)
}

/// Re-encode an RPC log in the explorer's string shape. RPC logs carry no
/// timestamp; callers fill one in.
fn to_raw_log(log: &Log) -> RawLog {
    RawLog {
        address: log.address().to_checksum(None),
        topics: log.topics().iter().map(hex::encode_prefixed).collect(),
        data: hex::encode_prefixed(&log.data().data),
        block_number: log
            .block_number
            .map(|number| format!("{number:#x}"))
            .unwrap_or_default(),
        time_stamp: None,
        transaction_hash: log.transaction_hash.map(hex::encode_prefixed),
        log_index: log.log_index.map(|index| format!("{index:#x}")),
    }
}

#[async_trait]
impl<P: Provider + 'static> ChainRpc for AlloyRpc<P> {
    async fn block_number(&self) -> Result<u64, AppError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| AppError::Rpc(e.to_string()))
    }

    async fn transfer_logs(
        &self,
        contract: Address,
        from_block: u64,
        to_block: Option<u64>,
    ) -> Result<Vec<RawLog>, AppError> {
        let filter = build_filter(contract, from_block, to_block);
        let logs = self
            .provider
            .get_logs(&filter)
            .await
            .map_err(|e| AppError::Rpc(e.to_string()))?;

        Ok(logs
            .iter()
            .filter(|log| !log.removed)
            .map(to_raw_log)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, LogData};

    use super::*;

    #[test]
    fn rpc_logs_use_hex_quantities() {
        let contract = address!("be861b7576e8ea260acc76b33ccac7358d5236a0");
        let log = Log {
            inner: alloy::primitives::Log {
                address: contract,
                data: LogData::new_unchecked(vec![topics::TRANSFER], Default::default()),
            },
            block_number: Some(436),
            log_index: Some(2),
            ..Default::default()
        };

        let raw = to_raw_log(&log);
        assert_eq!(raw.block_number, "0x1b4");
        assert_eq!(raw.log_index.as_deref(), Some("0x2"));
        assert_eq!(raw.topics.len(), 1);
        assert!(raw.time_stamp.is_none());
    }
}
