use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

use crate::api::DexScreenerError;
use crate::rpc::GatewayError;

/// 池子解析失败；发生在任何资金操作之前。
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("交易对索引查询失败: {0}")]
    PairIndex(#[from] DexScreenerError),
    #[error("未找到 {mint} / {quote} 的可用池子")]
    NoPoolFound { mint: Pubkey, quote: Pubkey },
    #[error("池子账户 {0} 不存在")]
    PoolAccountMissing(Pubkey),
    #[error("池子 {pool} 状态非法: {reason}")]
    MalformedPoolState { pool: Pubkey, reason: String },
    #[error("市场账户 {0} 不存在")]
    MarketAccountMissing(Pubkey),
    #[error("市场 {market} 状态非法: {reason}")]
    MalformedMarketState { market: Pubkey, reason: String },
    #[error("读取链上账户失败: {0}")]
    Rpc(#[from] GatewayError),
}
