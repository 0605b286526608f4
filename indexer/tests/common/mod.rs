#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    ops::Deref,
    sync::{Arc, Mutex},
    time::Duration,
};

use alloy::{hex, primitives::Address};
use async_trait::async_trait;
use campaign_store::{
    CacheResult, CacheStore, Campaign, MemoryStore, Network, Stats, TransferEvent,
};
use chrono::{DateTime, TimeZone, Utc};
use indexer::{
    clock::Clock,
    events::{topics, RawLog},
    explorer::{ExplorerApi, MAX_LOGS_PER_PAGE},
    fetcher::{self, FetchMethod},
    registry::{CampaignRegistry, RegistryCampaign},
    rpc::ChainRpc,
    service::CampaignIndexer,
    utils::parse_quantity,
    AppError,
};
use serde_json::json;

pub const CONTRACT: &str = "0xBE861b7576e8Ea260ACc76b33CCac7358D5236a0";

/// A Transfer log minting token `tx` to a distinct recipient in `block`.
pub fn transfer_log(block: u64, tx: u64, index: u64) -> RawLog {
    RawLog {
        address: CONTRACT.into(),
        topics: vec![
            hex::encode_prefixed(topics::TRANSFER),
            format!("0x{:064x}", 0),
            format!("0x{:064x}", 0x1000 + tx),
            format!("0x{:064x}", tx),
        ],
        data: "0x".into(),
        block_number: format!("{block:#x}"),
        time_stamp: Some(format!("{:#x}", 1_700_000_000 + block)),
        transaction_hash: Some(format!("0x{tx:064x}")),
        log_index: Some(format!("{index:#x}")),
    }
}

/// `count` logs spread over `[first_block, last_block]`, the final one in `last_block`.
pub fn page(first_tx: u64, count: u64, first_block: u64, last_block: u64) -> Vec<RawLog> {
    (0..count)
        .map(|i| {
            let block = if i + 1 == count {
                last_block
            } else {
                first_block + (i * (last_block - first_block)) / count.max(1)
            };
            transfer_log(block, first_tx + i, 0)
        })
        .collect()
}

pub fn at(rfc3339: &str) -> DateTime<Utc> {
    rfc3339.parse().unwrap()
}

pub fn registry_campaign(id: &str, chain_id: u64, start: &str, end: &str) -> RegistryCampaign {
    serde_json::from_value(json!({
        "id": id,
        "address": CONTRACT,
        "chainId": [chain_id],
        "startTime": start,
        "endTime": end,
        "title": format!("Campaign {id}"),
        "description": "",
        "projectName": "Acme",
        "projectId": 7,
        "isPrivate": false,
        "imageUrl": "",
    }))
    .unwrap()
}

#[derive(Default)]
pub struct FakeRegistry {
    campaigns: Mutex<Option<Vec<RegistryCampaign>>>,
}

impl FakeRegistry {
    pub fn with(campaigns: Vec<RegistryCampaign>) -> Self {
        Self {
            campaigns: Mutex::new(Some(campaigns)),
        }
    }

    /// A registry whose every call fails.
    pub fn failing() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CampaignRegistry for FakeRegistry {
    async fn fetch_campaigns(&self) -> Result<Vec<RegistryCampaign>, AppError> {
        self.campaigns
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AppError::Parse("registry unavailable".into()))
    }
}

/// Explorer serving scripted pages first, then range queries over `logs`.
#[derive(Default)]
pub struct FakeExplorer {
    blocks: Mutex<HashMap<i64, u64>>,
    pages: Mutex<VecDeque<Result<Vec<RawLog>, String>>>,
    logs: Mutex<Vec<RawLog>>,
    log_calls: Mutex<Vec<(u64, u64)>>,
    block_calls: Mutex<Vec<i64>>,
}

impl FakeExplorer {
    pub fn set_block(&self, time: DateTime<Utc>, block: u64) {
        self.blocks.lock().unwrap().insert(time.timestamp(), block);
    }

    pub fn push_page(&self, page: Vec<RawLog>) {
        self.pages.lock().unwrap().push_back(Ok(page));
    }

    pub fn push_error(&self, message: &str) {
        self.pages.lock().unwrap().push_back(Err(message.to_string()));
    }

    pub fn set_logs(&self, logs: Vec<RawLog>) {
        *self.logs.lock().unwrap() = logs;
    }

    pub fn log_calls(&self) -> Vec<(u64, u64)> {
        self.log_calls.lock().unwrap().clone()
    }

    pub fn block_calls(&self) -> Vec<i64> {
        self.block_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExplorerApi for FakeExplorer {
    async fn block_by_timestamp(&self, timestamp: i64) -> Result<u64, AppError> {
        self.block_calls.lock().unwrap().push(timestamp);
        self.blocks
            .lock()
            .unwrap()
            .get(&timestamp)
            .copied()
            .ok_or_else(|| AppError::Explorer("NOTOK: Error! No closest block found".into()))
    }

    async fn transfer_logs(
        &self,
        _contract: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<RawLog>, AppError> {
        self.log_calls.lock().unwrap().push((from_block, to_block));

        if let Some(page) = self.pages.lock().unwrap().pop_front() {
            return page.map_err(AppError::Explorer);
        }

        Ok(self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|log| {
                let block = parse_quantity(&log.block_number).unwrap();
                block >= from_block && block <= to_block
            })
            .take(MAX_LOGS_PER_PAGE)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct FakeRpc {
    head: Mutex<u64>,
    logs: Mutex<Vec<RawLog>>,
    fail: Mutex<bool>,
    log_calls: Mutex<Vec<(u64, Option<u64>)>>,
}

impl FakeRpc {
    pub fn with_head(head: u64) -> Self {
        let rpc = Self::default();
        *rpc.head.lock().unwrap() = head;
        rpc
    }

    pub fn set_logs(&self, logs: Vec<RawLog>) {
        *self.logs.lock().unwrap() = logs;
    }

    pub fn fail(&self) {
        *self.fail.lock().unwrap() = true;
    }

    pub fn log_calls(&self) -> Vec<(u64, Option<u64>)> {
        self.log_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainRpc for FakeRpc {
    async fn block_number(&self) -> Result<u64, AppError> {
        if *self.fail.lock().unwrap() {
            return Err(AppError::Rpc("connection refused".into()));
        }
        Ok(*self.head.lock().unwrap())
    }

    async fn transfer_logs(
        &self,
        _contract: Address,
        from_block: u64,
        to_block: Option<u64>,
    ) -> Result<Vec<RawLog>, AppError> {
        self.log_calls.lock().unwrap().push((from_block, to_block));
        if *self.fail.lock().unwrap() {
            return Err(AppError::Rpc("connection refused".into()));
        }
        Ok(self.logs.lock().unwrap().clone())
    }
}

/// Fake time: `sleep` returns immediately, advances `now` and is recorded.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        *self.now.lock().unwrap() += chrono::Duration::from_std(duration).unwrap();
    }
}

/// [`MemoryStore`] that also records every campaign id whose transfers were replaced.
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    transfer_writes: Mutex<Vec<String>>,
}

impl RecordingStore {
    pub fn transfer_writes(&self) -> Vec<String> {
        self.transfer_writes.lock().unwrap().clone()
    }
}

impl Deref for RecordingStore {
    type Target = MemoryStore;

    fn deref(&self) -> &MemoryStore {
        &self.inner
    }
}

#[async_trait]
impl CacheStore for RecordingStore {
    async fn replace_campaigns(&self, network: Network, campaigns: &[Campaign]) -> CacheResult<()> {
        self.inner.replace_campaigns(network, campaigns).await
    }

    async fn campaigns(&self, network: Network) -> CacheResult<Vec<Campaign>> {
        self.inner.campaigns(network).await
    }

    async fn replace_transfers(&self, campaign_id: &str, transfers: &[TransferEvent]) -> CacheResult<()> {
        self.inner.replace_transfers(campaign_id, transfers).await?;
        self.transfer_writes
            .lock()
            .unwrap()
            .push(campaign_id.to_string());
        Ok(())
    }

    async fn transfers(&self, campaign_id: &str) -> CacheResult<Vec<TransferEvent>> {
        self.inner.transfers(campaign_id).await
    }

    async fn transfer_count(&self, campaign_id: &str) -> CacheResult<Option<u64>> {
        self.inner.transfer_count(campaign_id).await
    }

    async fn save_stats(&self, stats: &Stats) -> CacheResult<()> {
        self.inner.save_stats(stats).await
    }

    async fn clear_stats(&self) -> CacheResult<()> {
        self.inner.clear_stats().await
    }

    async fn flush(&self) -> CacheResult<()> {
        self.inner.flush().await
    }
}

pub struct Harness {
    pub registry: Arc<FakeRegistry>,
    pub explorer: Arc<FakeExplorer>,
    pub rpc: Arc<FakeRpc>,
    pub store: Arc<RecordingStore>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new(campaigns: Vec<RegistryCampaign>, now: DateTime<Utc>) -> Self {
        Self {
            registry: Arc::new(FakeRegistry::with(campaigns)),
            explorer: Arc::new(FakeExplorer::default()),
            rpc: Arc::new(FakeRpc::with_head(10_000)),
            store: Arc::new(RecordingStore::default()),
            clock: Arc::new(ManualClock::new(now)),
        }
    }

    pub fn indexer(&self, network: Network, method: FetchMethod) -> CampaignIndexer {
        let fetcher = fetcher::build(
            method,
            network,
            self.explorer.clone(),
            self.rpc.clone(),
            30,
        );

        CampaignIndexer::new(
            network,
            self.registry.clone(),
            self.explorer.clone(),
            fetcher,
            self.store.clone(),
            self.clock.clone(),
        )
    }
}

pub fn june_2024() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
}
