use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_with::{DefaultOnNull, DisplayFromStr, serde_as};
use solana_sdk::pubkey::Pubkey;

use crate::api::PairRecord;

#[serde_as]
#[derive(Debug, Deserialize)]
pub(super) struct TokenPairsResponse {
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub pairs: Vec<RawPair>,
}

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawPair {
    pub chain_id: String,
    #[serde(default)]
    pub dex_id: String,
    pub pair_address: String,
    pub base_token: RawToken,
    pub quote_token: RawToken,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub price_usd: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawToken {
    pub address: String,
}

impl RawPair {
    /// 非 Solana 链的地址无法解析为 Pubkey，返回 `None`。
    pub(super) fn into_record(self) -> Option<PairRecord> {
        Some(PairRecord {
            pair_address: Pubkey::from_str(&self.pair_address).ok()?,
            base_mint: Pubkey::from_str(&self.base_token.address).ok()?,
            quote_mint: Pubkey::from_str(&self.quote_token.address).ok()?,
            chain_id: self.chain_id,
            dex_id: self.dex_id,
            price_usd: self.price_usd,
        })
    }
}
