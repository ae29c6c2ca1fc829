//! DexScreener 交易对索引，同时作为次级价格来源。

mod pairs;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use metrics::counter;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::PairIndexConfig;
use crate::monitoring::metrics::prometheus_enabled;

use super::{PairIndex, PairRecord, PriceSource, PriceSourceError, summarize_error_body};
use pairs::TokenPairsResponse;

#[derive(Debug, Error)]
pub enum DexScreenerError {
    #[error("DexScreener 请求失败: {0}")]
    Http(#[from] reqwest::Error),
    #[error("请求 {endpoint} 超时（{timeout_ms}ms）")]
    Timeout { endpoint: String, timeout_ms: u64 },
    #[error("请求 {endpoint} 返回状态 {status}: {body}")]
    ApiStatus {
        endpoint: String,
        status: StatusCode,
        body: String,
    },
    #[error("DexScreener 响应结构不符合预期: {0}")]
    Schema(String),
}

#[derive(Clone)]
pub struct DexScreenerClient {
    base_url: String,
    chain_id: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl fmt::Debug for DexScreenerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DexScreenerClient")
            .field("base_url", &self.base_url)
            .field("chain_id", &self.chain_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl DexScreenerClient {
    pub fn new(client: reqwest::Client, config: &PairIndexConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            chain_id: config.chain_id.clone(),
            client,
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    fn endpoint(&self, mint: &Pubkey) -> String {
        format!("{}/latest/dex/tokens/{mint}", self.base_url)
    }

    async fn fetch_pairs(&self, mint: &Pubkey) -> Result<Vec<PairRecord>, DexScreenerError> {
        let url = self.endpoint(mint);
        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| self.transport_error(&url, err))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| self.transport_error(&url, err))?;

        if !status.is_success() {
            let summary = summarize_error_body(body);
            record_request("http_error");
            warn!(
                target: "api::dexscreener",
                endpoint = %url,
                status = status.as_u16(),
                body = %summary,
                "DexScreener 返回非 200 状态"
            );
            return Err(DexScreenerError::ApiStatus {
                endpoint: url,
                status,
                body: summary,
            });
        }

        let records = parse_token_pairs(&body).inspect_err(|err| {
            record_request("schema_error");
            warn!(target: "api::dexscreener", endpoint = %url, error = %err, "DexScreener 响应解析失败");
        })?;
        record_request("ok");
        debug!(
            target: "api::dexscreener",
            mint = %mint,
            pairs = records.len(),
            "DexScreener 交易对查询完成"
        );
        Ok(records)
    }

    fn transport_error(&self, url: &str, err: reqwest::Error) -> DexScreenerError {
        if err.is_timeout() {
            record_request("timeout");
            let timeout_ms = self.timeout.as_millis() as u64;
            warn!(target: "api::dexscreener", endpoint = %url, timeout_ms, "DexScreener 请求超时");
            DexScreenerError::Timeout {
                endpoint: url.to_string(),
                timeout_ms,
            }
        } else {
            record_request("transport_error");
            warn!(target: "api::dexscreener", endpoint = %url, error = %err, "DexScreener 请求发送失败");
            DexScreenerError::Http(err)
        }
    }
}

#[async_trait]
impl PairIndex for DexScreenerClient {
    async fn token_pairs(&self, mint: &Pubkey) -> Result<Vec<PairRecord>, DexScreenerError> {
        self.fetch_pairs(mint).await
    }
}

#[async_trait]
impl PriceSource for DexScreenerClient {
    fn name(&self) -> &'static str {
        "dexscreener"
    }

    async fn price(&self, mint: &Pubkey) -> Result<Option<Decimal>, PriceSourceError> {
        let records = self.fetch_pairs(mint).await?;
        Ok(first_price(&records, mint, &self.chain_id))
    }
}

pub(crate) fn parse_token_pairs(body: &str) -> Result<Vec<PairRecord>, DexScreenerError> {
    let response: TokenPairsResponse =
        serde_json::from_str(body).map_err(|err| DexScreenerError::Schema(err.to_string()))?;
    Ok(response
        .pairs
        .into_iter()
        .filter_map(|pair| pair.into_record())
        .collect())
}

/// 目标链上第一个以 `mint` 为 base 且带 USD 价格的交易对。
fn first_price(records: &[PairRecord], mint: &Pubkey, chain_id: &str) -> Option<Decimal> {
    records
        .iter()
        .filter(|record| record.chain_id == chain_id && record.base_mint == *mint)
        .find_map(|record| record.price_usd)
}

fn record_request(status: &'static str) {
    if !prometheus_enabled() {
        return;
    }
    counter!("raydium_exit_dexscreener_requests_total", "status" => status).increment(1);
}
