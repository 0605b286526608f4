use std::fmt;

use serde::{Deserialize, Serialize};

/// Networks the indexer knows how to talk to. Chain parameters are hard-coded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Arbitrum,
    Matic,
}

impl Network {
    pub const ALL: [Network; 2] = [Network::Arbitrum, Network::Matic];

    pub fn name(&self) -> &'static str {
        match self {
            Network::Arbitrum => "arbitrum",
            Network::Matic => "matic",
        }
    }

    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Arbitrum => 42161,
            Network::Matic => 137,
        }
    }

    /// Resolve a chain id, `None` when the chain is not supported.
    pub fn from_chain_id(chain_id: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|n| n.chain_id() == chain_id)
    }

    /// Block-explorer API endpoint (an API key is appended per request).
    pub fn explorer_api_url(&self) -> &'static str {
        match self {
            Network::Arbitrum => "https://api.arbiscan.io/api",
            Network::Matic => "https://api.polygonscan.com/api",
        }
    }

    /// Public explorer used for display links.
    pub fn explorer_public_url(&self) -> &'static str {
        match self {
            Network::Arbitrum => "https://arbiscan.io",
            Network::Matic => "https://polygonscan.com",
        }
    }

    pub fn alchemy_rpc_url(&self, api_key: &str) -> String {
        match self {
            Network::Arbitrum => format!("https://arb-mainnet.g.alchemy.com/v2/{api_key}"),
            Network::Matic => format!("https://polygon-mainnet.g.alchemy.com/v2/{api_key}"),
        }
    }

    /// Approximate timestamp (seconds) of block zero, used by the fuzzy time model.
    pub fn genesis_timestamp(&self) -> u64 {
        match self {
            Network::Arbitrum => 1_622_240_000,
            Network::Matic => 1_590_824_836,
        }
    }

    /// Average seconds between blocks, used by the fuzzy time model.
    pub fn avg_block_time(&self) -> f64 {
        match self {
            Network::Arbitrum => 2.3,
            Network::Matic => 0.571,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
