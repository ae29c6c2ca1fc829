//! HTTP 外部数据源：交易对索引与价格预言。

pub mod dexscreener;
pub mod jupiter;

use async_trait::async_trait;
use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

pub use dexscreener::{DexScreenerClient, DexScreenerError};
pub use jupiter::{JupiterPriceClient, JupiterPriceError};

/// 交易对索引返回的一条记录，地址已解析为 Pubkey。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairRecord {
    pub chain_id: String,
    pub dex_id: String,
    pub pair_address: Pubkey,
    pub base_mint: Pubkey,
    pub quote_mint: Pubkey,
    pub price_usd: Option<Decimal>,
}

impl PairRecord {
    /// `token` 为 base 侧且 `quote` 为 quote 侧。
    pub fn quotes(&self, token: &Pubkey, quote: &Pubkey) -> bool {
        self.base_mint == *token && self.quote_mint == *quote
    }
}

#[async_trait]
pub trait PairIndex: Send + Sync {
    async fn token_pairs(&self, mint: &Pubkey) -> Result<Vec<PairRecord>, DexScreenerError>;
}

#[derive(Debug, Error)]
pub enum PriceSourceError {
    #[error(transparent)]
    DexScreener(#[from] DexScreenerError),
    #[error(transparent)]
    Jupiter(#[from] JupiterPriceError),
}

#[async_trait]
pub trait PriceSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// 来源没有该 mint 的报价时返回 `Ok(None)`。
    async fn price(&self, mint: &Pubkey) -> Result<Option<Decimal>, PriceSourceError>;
}

pub(crate) fn summarize_error_body(body: String) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "(empty response body)".to_string();
    }
    let mut single_line = trimmed.replace(['\n', '\r'], " ");
    const MAX_LEN: usize = 256;
    if single_line.len() > MAX_LEN {
        let mut cut = MAX_LEN;
        while !single_line.is_char_boundary(cut) {
            cut -= 1;
        }
        single_line.truncate(cut);
        single_line.push('…');
    }
    single_line
}
