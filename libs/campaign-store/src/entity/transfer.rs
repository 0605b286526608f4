use serde::{Deserialize, Serialize};

use super::{campaign::Campaign, network::Network};

/// A decoded token transfer attributed to a campaign contract.
///
/// `timestamp` and `block_number` are carried exactly as the source API
/// reported them (hex quantities from the explorer, decimal from the fuzzy
/// RPC path). The display fields are only filled in right before the event
/// is written to the cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferEvent {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_index: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<Network>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

impl TransferEvent {
    /// Identity used to merge overlapping explorer pages.
    ///
    /// Transaction hash + log index when both are known; otherwise every
    /// decoded field, which may merge two genuine transfers that decode to
    /// the same values.
    pub fn dedup_key(&self) -> String {
        match (&self.transaction_hash, &self.log_index) {
            (Some(tx), Some(index)) => format!("{}:{}", tx.to_lowercase(), index),
            _ => format!(
                "{}:{}:{}:{}:{}",
                self.from,
                self.to,
                self.token_id.as_deref().unwrap_or_default(),
                self.block_number.as_deref().unwrap_or_default(),
                self.timestamp.as_deref().unwrap_or_default(),
            ),
        }
    }

    /// Attach the denormalized display fields used by the frontend.
    pub fn decorated(mut self, campaign: &Campaign) -> Self {
        self.link = Some(format!(
            "{}/address/{}",
            campaign.network.explorer_public_url(),
            self.to
        ));
        self.network = Some(campaign.network);
        self.campaign = Some(campaign.title.clone());
        self.project = Some(campaign.project_name.clone());
        self
    }
}
