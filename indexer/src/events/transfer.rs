//! Transfer event decoder
//!
//! Event signature: Transfer(address indexed from, address indexed to, uint256 tokenId)
//!
//! Topics layout:
//! - topics[0]: event signature
//! - topics[1]: from (indexed)
//! - topics[2]: to (indexed)
//! - topics[3]: tokenId (indexed, NFT-style transfers only)

use std::str::FromStr;

use alloy::primitives::{Address, B256, U256};
use campaign_store::TransferEvent;

use super::RawLog;
use crate::error::AppError;

fn topic_word(log: &RawLog, index: usize) -> Result<Option<B256>, AppError> {
    log.topics
        .get(index)
        .map(|raw| {
            B256::from_str(raw)
                .map_err(|e| AppError::EventDecode(format!("topics[{index}] `{raw}`: {e}")))
        })
        .transpose()
}

fn required_topic(log: &RawLog, index: usize) -> Result<B256, AppError> {
    topic_word(log, index)?.ok_or_else(|| {
        AppError::EventDecode(format!(
            "Transfer: expected at least 3 topics, got {}",
            log.topics.len()
        ))
    })
}

/// Decode a Transfer event from a raw log.
///
/// A missing `topics[3]` yields `token_id: None`; fungible transfers carry
/// their amount in `data`, which is not decoded here.
pub fn decode(log: &RawLog) -> Result<TransferEvent, AppError> {
    let from = Address::from_word(required_topic(log, 1)?);
    let to = Address::from_word(required_topic(log, 2)?);
    let token_id = topic_word(log, 3)?.map(|word| U256::from_be_bytes(word.0).to_string());

    Ok(TransferEvent {
        from: from.to_checksum(None),
        to: to.to_checksum(None),
        token_id,
        timestamp: log.time_stamp.clone(),
        block_number: Some(log.block_number.clone()),
        transaction_hash: log.transaction_hash.clone(),
        log_index: log.log_index.clone(),
        ..Default::default()
    })
}
