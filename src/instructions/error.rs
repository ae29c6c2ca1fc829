use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

/// 指令构建失败；发生在任何不可逆操作之前，不会重试。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConstructionError {
    #[error("数量非法: {0}")]
    InvalidAmount(String),
    #[error("池子 {pool} ({base}/{quote}) 与交易对 {token}/{quote_asset} 不匹配")]
    PoolMismatch {
        pool: Pubkey,
        base: Pubkey,
        quote: Pubkey,
        token: Pubkey,
        quote_asset: Pubkey,
    },
}
