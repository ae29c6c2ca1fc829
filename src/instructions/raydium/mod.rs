//! Raydium AMM v4 池子：账户布局解码、PoolKeys 推导与 swap_base_in 指令。

pub mod keys;
pub mod layout;
pub mod swap;

use solana_sdk::pubkey::Pubkey;

pub use keys::{PoolKeys, derive_pool_keys};
pub use layout::{AmmInfo, MarketState, decode_amm_info, decode_market_state};
pub use swap::{SwapBaseIn, swap_base_in_instruction};

pub const RAYDIUM_AMM_V4_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8");
pub const OPENBOOK_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("srmqPvymJeFKQ4zGQed1GFppgkRHL9kaELCbyksJtPX");

pub const AMM_AUTHORITY_SEED: &[u8] = b"amm authority";
