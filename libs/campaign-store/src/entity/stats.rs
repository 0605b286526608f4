use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{campaign::Campaign, network::Network};

/// Rollup record the frontend reads from the `stats` key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub campaign_ids: Vec<String>,
    pub total_participations: u64,
    pub unique_users: usize,
    pub last_20_claims_sorted_by_date: Vec<Claim>,
    pub top_10_campaigns_sorted_by_participants: Vec<CampaignSummary>,
}

/// One transfer flattened for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub campaign: String,
    pub project: String,
    pub address: String,
    pub date: DateTime<Utc>,
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
    pub network: Network,
}

/// A campaign with its participant count and public page link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignSummary {
    #[serde(flatten)]
    pub campaign: Campaign,
    pub participants: u64,
    pub link: String,
}
