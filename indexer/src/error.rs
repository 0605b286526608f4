use std::fmt::Debug;

use campaign_store::CacheError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing `{0}` environment variable")]
    MissingEnvVar(String),

    #[error("Invalid value `{value}` for `{name}`")]
    InvalidConfig { name: String, value: String },

    #[error("Invalid fetch method: `{0}` (expected `explorer` or `rpc`)")]
    InvalidFetchMethod(String),

    #[error("Unsupported chain id: `{0}`")]
    UnsupportedChainId(u64),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Explorer API error: {0}")]
    Explorer(String),

    #[error("Unexpected response shape: {0}")]
    Parse(String),

    #[error("Event decode error: {0}")]
    EventDecode(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Invalid contract address: `{0}`")]
    InvalidAddress(String),

    #[error("Could not find {bound} block for campaign `{campaign_id}`")]
    MissingBlock {
        campaign_id: String,
        bound: &'static str,
    },

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}
