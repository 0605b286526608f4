//! Campaign registry HTTP API.

use async_trait::async_trait;
use campaign_store::{Campaign, CampaignStatus, Network};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

use crate::{chain_time::network_for_chain, error::AppError};

#[async_trait]
pub trait CampaignRegistry: Send + Sync {
    /// Every campaign on every chain, including ended ones.
    async fn fetch_campaigns(&self) -> Result<Vec<RegistryCampaign>, AppError>;
}

/// Campaigns are kept as raw values so one malformed entry is dropped alone.
#[derive(Debug, Deserialize)]
pub struct CampaignsResponse {
    pub campaigns: Vec<serde_json::Value>,
}

/// The registry sends `null` for unset display fields.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The registry sends either one chain id or a list of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ChainIds {
    Many(Vec<u64>),
    One(u64),
}

impl ChainIds {
    pub fn to_vec(&self) -> Vec<u64> {
        match self {
            ChainIds::Many(ids) => ids.clone(),
            ChainIds::One(id) => vec![*id],
        }
    }

}

/// A campaign as the registry describes it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryCampaign {
    pub id: String,
    pub address: String,
    pub chain_id: ChainIds,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub project_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub project_id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_private: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_url: String,
}

impl RegistryCampaign {
    /// Supported networks among the campaign's chain ids. Unknown chains are ignored.
    pub fn networks(&self) -> Vec<Network> {
        self.chain_id
            .to_vec()
            .into_iter()
            .filter_map(|chain_id| match network_for_chain(chain_id) {
                Ok(network) => Some(network),
                Err(err) => {
                    debug!(campaign_id = %self.id, %err, "Ignoring chain");
                    None
                }
            })
            .collect()
    }

    /// Normalize into the cached record for `network` with its status at `now`.
    pub fn into_campaign(self, network: Network, now: DateTime<Utc>) -> Campaign {
        Campaign {
            status: CampaignStatus::at(now, self.start_time, self.end_time),
            chain_id: self.chain_id.to_vec(),
            id: self.id,
            address: self.address,
            network,
            start_time: self.start_time,
            end_time: self.end_time,
            title: self.title,
            description: self.description,
            project_name: self.project_name,
            project_id: self.project_id,
            is_private: self.is_private,
            image_url: self.image_url,
        }
    }
}

pub struct RegistryClient {
    http: reqwest::Client,
    base_url: String,
}

impl RegistryClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl CampaignRegistry for RegistryClient {
    async fn fetch_campaigns(&self) -> Result<Vec<RegistryCampaign>, AppError> {
        let url = format!("{}/campaign", self.base_url.trim_end_matches('/'));
        let body = self
            .http
            .get(url)
            .query(&[("onlyActive", "false")])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let response: CampaignsResponse = serde_json::from_str(&body)
            .map_err(|e| AppError::Parse(format!("campaign registry response: {e}")))?;

        Ok(response
            .campaigns
            .into_iter()
            .filter_map(|raw| match RegistryCampaign::deserialize(&raw) {
                Ok(campaign) => Some(campaign),
                Err(err) => {
                    warn!(id = %raw["id"], %err, "Dropping malformed campaign");
                    None
                }
            })
            .collect())
    }
}
