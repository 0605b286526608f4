use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::network::Network;

/// Lifecycle of a campaign relative to the wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    /// Not started yet, so it cannot have transfers.
    Idle,
    Active,
    Ended,
}

impl CampaignStatus {
    /// Idle before `start`, ended strictly after `end`, active otherwise.
    pub fn at(now: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        if now < start {
            CampaignStatus::Idle
        } else if now > end {
            CampaignStatus::Ended
        } else {
            CampaignStatus::Active
        }
    }
}

/// A time-bounded promotion tracked by one contract on one network.
///
/// Stored as JSON in the `campaigns:{network}` list and replaced wholesale on
/// every collection cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: String,
    pub address: String,
    pub network: Network,
    pub chain_id: Vec<u64>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: CampaignStatus,
    pub title: String,
    pub description: String,
    pub project_name: String,
    pub project_id: u64,
    pub is_private: bool,
    pub image_url: String,
}

impl Campaign {
    pub fn status_at(&self, now: DateTime<Utc>) -> CampaignStatus {
        CampaignStatus::at(now, self.start_time, self.end_time)
    }
}
