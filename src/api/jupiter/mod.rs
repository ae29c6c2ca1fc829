//! Jupiter Price API v2 客户端，首选价格来源。

mod price;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use metrics::counter;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::OracleConfig;
use crate::monitoring::metrics::prometheus_enabled;

use super::{PriceSource, PriceSourceError, summarize_error_body};
use price::PriceResponse;

#[derive(Debug, Error)]
pub enum JupiterPriceError {
    #[error("Jupiter Price API 请求失败: {0}")]
    Http(#[from] reqwest::Error),
    #[error("请求 {endpoint} 超时（{timeout_ms}ms）")]
    Timeout { endpoint: String, timeout_ms: u64 },
    #[error("请求 {endpoint} 被限流，状态 {status}: {body}")]
    RateLimited {
        endpoint: String,
        status: StatusCode,
        body: String,
    },
    #[error("请求 {endpoint} 返回状态 {status}: {body}")]
    ApiStatus {
        endpoint: String,
        status: StatusCode,
        body: String,
    },
    #[error("Jupiter 价格响应结构不符合预期: {0}")]
    Schema(String),
}

#[derive(Clone)]
pub struct JupiterPriceClient {
    price_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
    timeout: Duration,
}

impl fmt::Debug for JupiterPriceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JupiterPriceClient")
            .field("price_url", &self.price_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl JupiterPriceClient {
    pub fn new(client: reqwest::Client, config: &OracleConfig) -> Self {
        Self {
            price_url: config.jupiter_price_url.trim_end_matches('/').to_string(),
            api_key: config
                .jupiter_api_key
                .as_ref()
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty()),
            client,
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    async fn fetch_price(&self, mint: &Pubkey) -> Result<Option<Decimal>, JupiterPriceError> {
        let url = self.price_url.clone();
        let ids = mint.to_string();
        let mut request = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .query(&[("ids", ids.as_str())]);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|err| self.transport_error(&url, err))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| self.transport_error(&url, err))?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            let summary = summarize_error_body(body);
            record_request("rate_limited");
            warn!(
                target: "api::jupiter",
                endpoint = %url,
                status = status.as_u16(),
                body = %summary,
                "Jupiter 价格查询命中限流"
            );
            return Err(JupiterPriceError::RateLimited {
                endpoint: url,
                status,
                body: summary,
            });
        }

        if !status.is_success() {
            let summary = summarize_error_body(body);
            record_request("http_error");
            warn!(
                target: "api::jupiter",
                endpoint = %url,
                status = status.as_u16(),
                body = %summary,
                "Jupiter 价格查询返回非 200 状态"
            );
            return Err(JupiterPriceError::ApiStatus {
                endpoint: url,
                status,
                body: summary,
            });
        }

        let price = parse_price(&body, &ids).inspect_err(|err| {
            record_request("schema_error");
            warn!(target: "api::jupiter", endpoint = %url, error = %err, "Jupiter 价格响应解析失败");
        })?;
        record_request(if price.is_some() { "ok" } else { "missing" });
        debug!(target: "api::jupiter", mint = %mint, price = ?price, "Jupiter 价格查询完成");
        Ok(price)
    }

    fn transport_error(&self, url: &str, err: reqwest::Error) -> JupiterPriceError {
        if err.is_timeout() {
            record_request("timeout");
            let timeout_ms = self.timeout.as_millis() as u64;
            warn!(target: "api::jupiter", endpoint = %url, timeout_ms, "Jupiter 价格请求超时");
            JupiterPriceError::Timeout {
                endpoint: url.to_string(),
                timeout_ms,
            }
        } else {
            record_request("transport_error");
            warn!(target: "api::jupiter", endpoint = %url, error = %err, "Jupiter 价格请求发送失败");
            JupiterPriceError::Http(err)
        }
    }
}

#[async_trait]
impl PriceSource for JupiterPriceClient {
    fn name(&self) -> &'static str {
        "jupiter"
    }

    async fn price(&self, mint: &Pubkey) -> Result<Option<Decimal>, PriceSourceError> {
        Ok(self.fetch_price(mint).await?)
    }
}

fn parse_price(body: &str, mint: &str) -> Result<Option<Decimal>, JupiterPriceError> {
    let response: PriceResponse =
        serde_json::from_str(body).map_err(|err| JupiterPriceError::Schema(err.to_string()))?;
    Ok(response.price_of(mint))
}

fn record_request(status: &'static str) {
    if !prometheus_enabled() {
        return;
    }
    counter!("raydium_exit_jupiter_price_requests_total", "status" => status).increment(1);
}
