//! 多来源价格查询，只用于成交后的展示，不影响提交结果。

use std::sync::Arc;

use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;
use tracing::warn;

use crate::api::PriceSource;
use crate::monitoring::events;

#[derive(Clone)]
pub struct PriceOracle {
    sources: Vec<Arc<dyn PriceSource>>,
}

impl PriceOracle {
    /// `sources` 按优先级排列。
    pub fn new(sources: Vec<Arc<dyn PriceSource>>) -> Self {
        Self { sources }
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|source| source.name()).collect()
    }

    /// 第一个给出价格的来源胜出；全部失败或无价时返回 `None`。
    pub async fn quote(&self, mint: &Pubkey) -> Option<Decimal> {
        for source in &self.sources {
            match source.price(mint).await {
                Ok(Some(price)) => {
                    events::oracle_lookup(source.name(), mint, "hit");
                    return Some(price);
                }
                Ok(None) => events::oracle_lookup(source.name(), mint, "miss"),
                Err(err) => {
                    events::oracle_lookup(source.name(), mint, "error");
                    warn!(
                        target: "oracle",
                        source = source.name(),
                        mint = %mint,
                        error = %err,
                        "价格来源查询失败，尝试下一个来源"
                    );
                }
            }
        }
        None
    }
}
