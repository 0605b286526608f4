//! Block-explorer HTTP API (Etherscan-compatible: Arbiscan, Polygonscan).

use alloy::{hex, primitives::Address};
use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    error::AppError,
    events::{topics, RawLog},
};

/// Maximum number of rows the explorer returns from one `getLogs` call.
pub const MAX_LOGS_PER_PAGE: usize = 1000;

const NO_RECORDS: &str = "No records found";

#[async_trait]
pub trait ExplorerApi: Send + Sync {
    /// Number of the last block mined at or before `timestamp` (seconds).
    async fn block_by_timestamp(&self, timestamp: i64) -> Result<u64, AppError>;

    /// Transfer logs of `contract` in `[from_block, to_block]`, at most
    /// [`MAX_LOGS_PER_PAGE`] rows, ordered by block.
    async fn transfer_logs(
        &self,
        contract: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<RawLog>, AppError>;
}

#[derive(Debug, Deserialize)]
pub struct ExplorerResponse {
    #[serde(default)]
    pub status: Option<String>,
    pub message: String,
    pub result: ExplorerResult,
}

/// `result` holds rows on success and a message (or a bare number) otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ExplorerResult {
    Logs(Vec<RawLog>),
    Text(String),
}

impl ExplorerResponse {
    fn is_ok(&self) -> bool {
        self.message == "OK"
    }

    fn error(&self) -> AppError {
        match &self.result {
            ExplorerResult::Text(text) => AppError::Explorer(format!("{}: {}", self.message, text)),
            ExplorerResult::Logs(_) => AppError::Explorer(self.message.clone()),
        }
    }
}

pub struct ExplorerClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ExplorerClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    async fn call(&self, params: &[(&str, String)]) -> Result<ExplorerResponse, AppError> {
        let body = self
            .http
            .get(&self.base_url)
            .query(&[("apikey", self.api_key.as_str())])
            .query(params)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        serde_json::from_str(&body).map_err(|e| AppError::Parse(format!("explorer response: {e}")))
    }
}

#[async_trait]
impl ExplorerApi for ExplorerClient {
    async fn block_by_timestamp(&self, timestamp: i64) -> Result<u64, AppError> {
        let response = self
            .call(&[
                ("module", "block".into()),
                ("action", "getblocknobytime".into()),
                ("timestamp", timestamp.to_string()),
                ("closest", "before".into()),
            ])
            .await?;

        if !response.is_ok() {
            return Err(response.error());
        }

        match response.result {
            ExplorerResult::Text(text) => text
                .trim()
                .parse::<u64>()
                .map_err(|_| AppError::Parse(format!("block number `{text}`"))),
            ExplorerResult::Logs(_) => Err(AppError::Parse(
                "expected a block number, got a list".into(),
            )),
        }
    }

    async fn transfer_logs(
        &self,
        contract: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<RawLog>, AppError> {
        let response = self
            .call(&[
                ("module", "logs".into()),
                ("action", "getLogs".into()),
                ("fromBlock", from_block.to_string()),
                ("toBlock", to_block.to_string()),
                ("address", contract.to_checksum(None)),
                ("topic0", hex::encode_prefixed(topics::TRANSFER)),
            ])
            .await?;

        if response.message == NO_RECORDS {
            return Ok(Vec::new());
        }
        if !response.is_ok() {
            return Err(response.error());
        }

        match response.result {
            ExplorerResult::Logs(logs) => Ok(logs),
            ExplorerResult::Text(text) => Err(AppError::Parse(format!("expected logs, got `{text}`"))),
        }
    }
}
