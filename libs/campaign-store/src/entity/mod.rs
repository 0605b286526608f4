pub mod campaign;
pub mod network;
pub mod stats;
pub mod transfer;

pub use campaign::{Campaign, CampaignStatus};
pub use network::Network;
pub use stats::{CampaignSummary, Claim, Stats};
pub use transfer::TransferEvent;
