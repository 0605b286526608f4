//! Process configuration from the environment (and `.env` when present).

use std::{env, str::FromStr, time::Duration};

use campaign_store::Network;

use crate::{error::AppError, fetcher::FetchMethod};

mod defaults {
    pub const REGISTRY_URL: &str = "https://api.tideprotocol.xyz";
    pub const CAMPAIGN_PAGE_URL: &str = "https://tideprotocol.xyz/users/campaign";
    pub const FETCH_METHOD: &str = "explorer";
    pub const POLL_INTERVAL_SECS: &str = "300";
    pub const CAMPAIGN_DELAY_MS: &str = "1200";
    pub const HTTP_TIMEOUT_SECS: &str = "30";
    pub const REORG_MARGIN: &str = "30";
    pub const FLUSH_ON_START: &str = "true";
}

/// Credentials and endpoints for one network.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub network: Network,
    pub rpc_url: String,
    pub explorer_url: String,
    pub explorer_api_key: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub networks: Vec<NetworkConfig>,
    pub redis_url: String,
    pub registry_url: String,
    pub campaign_page_url: String,
    pub fetch_method: FetchMethod,
    pub poll_interval: Duration,
    pub campaign_delay: Duration,
    pub http_timeout: Duration,
    pub reorg_margin: u64,
    pub flush_on_start: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source. Required credentials are checked
    /// before anything else so a misconfigured process fails at startup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| AppError::MissingEnvVar(name.to_string()))
        };
        let optional = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let alchemy_arbitrum = required("ALCHEMY_ARBITRUM_KEY")?;
        let alchemy_matic = required("ALCHEMY_MATIC_KEY")?;
        let arbiscan = required("ARBISCAN_API_KEY")?;
        let polygonscan = required("POLYGONSCAN_API_KEY")?;
        let redis_url = required("REDIS_URL")?;

        let networks = [
            (Network::Arbitrum, alchemy_arbitrum, arbiscan),
            (Network::Matic, alchemy_matic, polygonscan),
        ]
        .into_iter()
        .map(|(network, rpc_key, explorer_api_key)| NetworkConfig {
            network,
            rpc_url: network.alchemy_rpc_url(&rpc_key),
            explorer_url: network.explorer_api_url().to_string(),
            explorer_api_key,
        })
        .collect();

        Ok(Self {
            networks,
            redis_url,
            registry_url: optional("REGISTRY_URL", defaults::REGISTRY_URL),
            campaign_page_url: optional("CAMPAIGN_PAGE_URL", defaults::CAMPAIGN_PAGE_URL),
            fetch_method: optional("FETCH_METHOD", defaults::FETCH_METHOD).parse()?,
            poll_interval: Duration::from_secs(parse(
                "POLL_INTERVAL_SECS",
                optional("POLL_INTERVAL_SECS", defaults::POLL_INTERVAL_SECS),
            )?),
            campaign_delay: Duration::from_millis(parse(
                "CAMPAIGN_DELAY_MS",
                optional("CAMPAIGN_DELAY_MS", defaults::CAMPAIGN_DELAY_MS),
            )?),
            http_timeout: Duration::from_secs(parse(
                "HTTP_TIMEOUT_SECS",
                optional("HTTP_TIMEOUT_SECS", defaults::HTTP_TIMEOUT_SECS),
            )?),
            reorg_margin: parse("REORG_MARGIN", optional("REORG_MARGIN", defaults::REORG_MARGIN))?,
            flush_on_start: parse(
                "FLUSH_ON_START",
                optional("FLUSH_ON_START", defaults::FLUSH_ON_START),
            )?,
        })
    }
}

fn parse<T: FromStr>(name: &str, value: String) -> Result<T, AppError> {
    value.trim().parse::<T>().map_err(|_| AppError::InvalidConfig {
        name: name.to_string(),
        value,
    })
}
