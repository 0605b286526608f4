//! In-memory storage backend.
//!
//! Keeps the same key layout and JSON encoding as Redis. Used by tests and
//! for dry runs without a Redis instance.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{
    decode_all, encode_all,
    entity::{Campaign, Network, Stats, TransferEvent},
    keys, parse_counter, CacheResult, CacheStore,
};

#[derive(Default)]
pub struct MemoryStore {
    lists: Mutex<HashMap<String, Vec<String>>>,
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw JSON entries stored under a list key.
    pub fn raw_list(&self, key: &str) -> Option<Vec<String>> {
        self.lists.lock().unwrap().get(key).cloned()
    }

    /// Raw string stored under a plain key.
    pub fn raw_value(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    /// Overwrite a plain key, bypassing the list it normally accompanies.
    pub fn set_raw_value(&self, key: &str, value: impl Into<String>) {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.into());
    }

    fn replace_list(&self, key: String, values: Vec<String>) {
        let mut lists = self.lists.lock().unwrap();
        lists.remove(&key);
        if !values.is_empty() {
            lists.insert(key, values);
        }
    }

    fn list(&self, key: &str) -> Vec<String> {
        self.raw_list(key).unwrap_or_default()
    }
}

fn matches_namespace(key: &str, pattern: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => key.starts_with(prefix),
        None => key == pattern,
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn replace_campaigns(&self, network: Network, campaigns: &[Campaign]) -> CacheResult<()> {
        self.replace_list(keys::campaigns(network), encode_all(campaigns)?);
        Ok(())
    }

    async fn campaigns(&self, network: Network) -> CacheResult<Vec<Campaign>> {
        decode_all(&self.list(&keys::campaigns(network)))
    }

    async fn replace_transfers(&self, campaign_id: &str, transfers: &[TransferEvent]) -> CacheResult<()> {
        self.replace_list(keys::transfers(campaign_id), encode_all(transfers)?);
        self.set_raw_value(&keys::transfer_count(campaign_id), transfers.len().to_string());
        Ok(())
    }

    async fn transfers(&self, campaign_id: &str) -> CacheResult<Vec<TransferEvent>> {
        decode_all(&self.list(&keys::transfers(campaign_id)))
    }

    async fn transfer_count(&self, campaign_id: &str) -> CacheResult<Option<u64>> {
        let key = keys::transfer_count(campaign_id);
        self.raw_value(&key)
            .map(|v| parse_counter(&key, v))
            .transpose()
    }

    async fn save_stats(&self, stats: &Stats) -> CacheResult<()> {
        self.set_raw_value(keys::STATS, serde_json::to_string(stats)?);
        Ok(())
    }

    async fn clear_stats(&self) -> CacheResult<()> {
        self.values.lock().unwrap().remove(keys::STATS);
        Ok(())
    }

    async fn flush(&self) -> CacheResult<()> {
        let owned = |key: &String| keys::NAMESPACES.iter().any(|p| matches_namespace(key, p));
        self.lists.lock().unwrap().retain(|key, _| !owned(key));
        self.values.lock().unwrap().retain(|key, _| !owned(key));
        Ok(())
    }
}
