//! Raw log representation and decoders.
//!
//! The explorer and the RPC client both hand back [`RawLog`]s; quantities are
//! kept as the strings the source produced (hex from both today).

pub mod transfer;

use serde::{Deserialize, Serialize};

/// Event topics (keccak256 hashes)
pub mod topics {
    use alloy::primitives::{b256, B256};

    /// Transfer(address indexed from, address indexed to, uint256 tokenId)
    pub const TRANSFER: B256 =
        b256!("ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef");
}

/// A log entry as returned by the explorer `getLogs` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLog {
    #[serde(default)]
    pub address: String,
    pub topics: Vec<String>,
    #[serde(default)]
    pub data: String,
    pub block_number: String,
    #[serde(default, rename = "timeStamp")]
    pub time_stamp: Option<String>,
    #[serde(default)]
    pub transaction_hash: Option<String>,
    #[serde(default)]
    pub log_index: Option<String>,
}
