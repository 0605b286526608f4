//! Rollup statistics read by the frontend from the `stats` key.

use std::{collections::HashSet, sync::Arc};

use campaign_store::{CacheStore, Campaign, CampaignSummary, Claim, Stats, TransferEvent};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::{clock::Clock, error::AppError, utils::parse_quantity};

const LAST_CLAIMS: usize = 20;
const TOP_CAMPAIGNS: usize = 10;

/// One cached campaign with its transfer list and counter.
#[derive(Debug, Clone)]
pub struct CampaignData {
    pub campaign: Campaign,
    pub transfers: Vec<TransferEvent>,
    pub participants: u64,
}

fn claim(campaign: &Campaign, transfer: &TransferEvent) -> Option<Claim> {
    let seconds = transfer.timestamp.as_deref().and_then(parse_quantity)?;
    let date = DateTime::from_timestamp(i64::try_from(seconds).ok()?, 0)?;

    Some(Claim {
        campaign: campaign.title.clone(),
        project: campaign.project_name.clone(),
        address: transfer.to.clone(),
        date,
        link: format!(
            "{}/address/{}",
            campaign.network.explorer_public_url(),
            transfer.to
        ),
        token_id: transfer.token_id.clone(),
        network: campaign.network,
    })
}

/// Build the rollup from already loaded cache contents.
///
/// Transfers without a parseable timestamp count towards unique users but
/// are left out of the recent claims.
pub fn compute_stats(data: &[CampaignData], now: DateTime<Utc>, campaign_page_url: &str) -> Stats {
    let campaign_ids = data.iter().map(|d| d.campaign.id.clone()).collect();
    let total_participations = data.iter().map(|d| d.participants).sum();

    let unique_users = data
        .iter()
        .flat_map(|d| d.transfers.iter())
        .map(|t| t.to.to_lowercase())
        .collect::<HashSet<_>>()
        .len();

    let mut claims: Vec<Claim> = data
        .iter()
        .flat_map(|d| d.transfers.iter().filter_map(|t| claim(&d.campaign, t)))
        .collect();
    claims.sort_by(|a, b| b.date.cmp(&a.date));
    claims.truncate(LAST_CLAIMS);

    let mut top: Vec<CampaignSummary> = data
        .iter()
        .map(|d| {
            let mut campaign = d.campaign.clone();
            campaign.status = campaign.status_at(now);
            CampaignSummary {
                link: format!("{}/{}", campaign_page_url.trim_end_matches('/'), campaign.id),
                participants: d.participants,
                campaign,
            }
        })
        .collect();
    top.sort_by(|a, b| b.participants.cmp(&a.participants));
    top.truncate(TOP_CAMPAIGNS);

    Stats {
        campaign_ids,
        total_participations,
        unique_users,
        last_20_claims_sorted_by_date: claims,
        top_10_campaigns_sorted_by_participants: top,
    }
}

pub struct Aggregator {
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    campaign_page_url: String,
}

impl Aggregator {
    pub fn new(store: Arc<dyn CacheStore>, clock: Arc<dyn Clock>, campaign_page_url: impl Into<String>) -> Self {
        Self {
            store,
            clock,
            campaign_page_url: campaign_page_url.into(),
        }
    }

    async fn load(&self) -> Result<Vec<CampaignData>, AppError> {
        let mut data = Vec::new();
        for campaign in self.store.all_campaigns().await? {
            let transfers = self.store.transfers(&campaign.id).await?;
            let participants = self.store.transfer_count(&campaign.id).await?.unwrap_or(0);
            data.push(CampaignData {
                campaign,
                transfers,
                participants,
            });
        }
        Ok(data)
    }

    /// Recompute the rollup from the cache and replace the `stats` key.
    pub async fn calculate_stats(&self) -> Result<Stats, AppError> {
        info!("Calculating stats...");

        self.store.clear_stats().await?;
        let data = self.load().await?;
        let stats = compute_stats(&data, self.clock.now(), &self.campaign_page_url);
        self.store.save_stats(&stats).await?;

        info!(
            campaigns = stats.campaign_ids.len(),
            participations = stats.total_participations,
            unique_users = stats.unique_users,
            "Done calculating stats!"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use campaign_store::{CampaignStatus, Network};
    use chrono::TimeZone;

    use super::*;

    fn campaign(id: &str, network: Network) -> Campaign {
        Campaign {
            id: id.into(),
            address: "0xbe861b7576e8ea260acc76b33ccac7358d5236a0".into(),
            network,
            chain_id: vec![network.chain_id()],
            start_time: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            status: CampaignStatus::Active,
            title: format!("Campaign {id}"),
            description: String::new(),
            project_name: "Acme".into(),
            project_id: 1,
            is_private: false,
            image_url: String::new(),
        }
    }

    fn transfer(to: &str, timestamp: Option<&str>) -> TransferEvent {
        TransferEvent {
            from: "0x0000000000000000000000000000000000000000".into(),
            to: to.into(),
            timestamp: timestamp.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn totals_and_unique_users() {
        let data = vec![
            CampaignData {
                campaign: campaign("a", Network::Matic),
                transfers: vec![transfer("0xA1", Some("0x10")), transfer("0xa2", Some("0x20"))],
                participants: 2,
            },
            CampaignData {
                campaign: campaign("b", Network::Arbitrum),
                transfers: vec![transfer("0xa1", None)],
                participants: 1,
            },
        ];
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

        let stats = compute_stats(&data, now, "https://example.org/campaign");

        assert_eq!(stats.campaign_ids, vec!["a", "b"]);
        assert_eq!(stats.total_participations, 3);
        assert_eq!(stats.unique_users, 2);
        // the undated transfer is not a displayable claim
        assert_eq!(stats.last_20_claims_sorted_by_date.len(), 2);
    }

    #[test]
    fn claims_newest_first_with_mixed_encodings() {
        let data = vec![CampaignData {
            campaign: campaign("a", Network::Matic),
            transfers: vec![
                transfer("0x1", Some("0x65a1b2c3")),
                transfer("0x2", Some("1800000000")),
                transfer("0x3", Some("1600000000")),
            ],
            participants: 3,
        }];
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

        let stats = compute_stats(&data, now, "https://example.org/campaign");
        let order: Vec<&str> = stats
            .last_20_claims_sorted_by_date
            .iter()
            .map(|c| c.address.as_str())
            .collect();

        assert_eq!(order, vec!["0x2", "0x1", "0x3"]);
        assert_eq!(
            stats.last_20_claims_sorted_by_date[0].link,
            "https://polygonscan.com/address/0x2"
        );
    }

    #[test]
    fn top_campaigns_capped_and_sorted() {
        let data: Vec<CampaignData> = (0..12)
            .map(|i| CampaignData {
                campaign: campaign(&format!("c{i}"), Network::Matic),
                transfers: Vec::new(),
                participants: i,
            })
            .collect();
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

        let stats = compute_stats(&data, now, "https://example.org/campaign/");
        let top = &stats.top_10_campaigns_sorted_by_participants;

        assert_eq!(top.len(), 10);
        assert_eq!(top[0].participants, 11);
        assert_eq!(top[0].link, "https://example.org/campaign/c11");
        assert_eq!(top[0].campaign.status, CampaignStatus::Ended);
        assert_eq!(top[9].participants, 2);
    }
}
