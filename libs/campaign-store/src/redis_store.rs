use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};

use crate::{
    decode_all, encode_all,
    entity::{Campaign, Network, Stats, TransferEvent},
    keys, parse_counter, CacheResult, CacheStore,
};

/// Redis-backed [`CacheStore`].
///
/// Cloning is cheap: every clone shares one multiplexed connection.
#[derive(Clone)]
pub struct RedisStore {
    connection: MultiplexedConnection,
}

impl RedisStore {
    pub async fn connect(redis_url: &str) -> CacheResult<Self> {
        let client = Client::open(redis_url)?;
        let connection = client.get_multiplexed_async_connection().await?;

        tracing::info!("Connected to Redis");
        Ok(Self { connection })
    }

    /// Delete `key` and push `values` in order. An empty `values` leaves the key absent.
    async fn replace_list(&self, key: &str, values: Vec<String>) -> CacheResult<()> {
        let mut con = self.connection.clone();
        con.del::<_, ()>(key).await?;
        if !values.is_empty() {
            con.rpush::<_, _, ()>(key, values).await?;
        }
        Ok(())
    }

    async fn list(&self, key: &str) -> CacheResult<Vec<String>> {
        let mut con = self.connection.clone();
        Ok(con.lrange::<_, Vec<String>>(key, 0, -1).await?)
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn replace_campaigns(&self, network: Network, campaigns: &[Campaign]) -> CacheResult<()> {
        self.replace_list(&keys::campaigns(network), encode_all(campaigns)?)
            .await
    }

    async fn campaigns(&self, network: Network) -> CacheResult<Vec<Campaign>> {
        decode_all(&self.list(&keys::campaigns(network)).await?)
    }

    async fn replace_transfers(&self, campaign_id: &str, transfers: &[TransferEvent]) -> CacheResult<()> {
        self.replace_list(&keys::transfers(campaign_id), encode_all(transfers)?)
            .await?;

        let mut con = self.connection.clone();
        con.set::<_, _, ()>(keys::transfer_count(campaign_id), transfers.len() as u64)
            .await?;
        Ok(())
    }

    async fn transfers(&self, campaign_id: &str) -> CacheResult<Vec<TransferEvent>> {
        decode_all(&self.list(&keys::transfers(campaign_id)).await?)
    }

    async fn transfer_count(&self, campaign_id: &str) -> CacheResult<Option<u64>> {
        let key = keys::transfer_count(campaign_id);
        let mut con = self.connection.clone();
        let value = con.get::<_, Option<String>>(key.as_str()).await?;

        value.map(|v| parse_counter(&key, v)).transpose()
    }

    async fn save_stats(&self, stats: &Stats) -> CacheResult<()> {
        let payload = serde_json::to_string(stats)?;
        let mut con = self.connection.clone();
        con.set::<_, _, ()>(keys::STATS, payload).await?;
        Ok(())
    }

    async fn clear_stats(&self) -> CacheResult<()> {
        let mut con = self.connection.clone();
        con.del::<_, ()>(keys::STATS).await?;
        Ok(())
    }

    async fn flush(&self) -> CacheResult<()> {
        let mut con = self.connection.clone();
        for pattern in keys::NAMESPACES {
            let found = con.keys::<_, Vec<String>>(pattern).await?;
            if !found.is_empty() {
                tracing::debug!(pattern, keys = found.len(), "Flushing cache keys");
                con.del::<_, ()>(found).await?;
            }
        }
        Ok(())
    }
}
