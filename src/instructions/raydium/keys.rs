use anyhow::{Result, anyhow, ensure};
use solana_sdk::pubkey::Pubkey;

use super::layout::{AmmInfo, MarketState};
use super::{AMM_AUTHORITY_SEED, RAYDIUM_AMM_V4_PROGRAM_ID};

/// 调用 AMM swap 所需的全部账户地址。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolKeys {
    pub id: Pubkey,
    pub program_id: Pubkey,
    pub authority: Pubkey,
    pub open_orders: Pubkey,
    pub target_orders: Pubkey,
    pub base_mint: Pubkey,
    pub quote_mint: Pubkey,
    pub lp_mint: Pubkey,
    pub base_decimals: u8,
    pub quote_decimals: u8,
    pub base_vault: Pubkey,
    pub quote_vault: Pubkey,
    pub market_program_id: Pubkey,
    pub market_id: Pubkey,
    pub market_authority: Pubkey,
    pub market_base_vault: Pubkey,
    pub market_quote_vault: Pubkey,
    pub market_bids: Pubkey,
    pub market_asks: Pubkey,
    pub market_event_queue: Pubkey,
}

impl PoolKeys {
    /// 池子是否恰好由这两个 mint 组成（顺序无关）。
    pub fn pairs(&self, a: &Pubkey, b: &Pubkey) -> bool {
        (self.base_mint == *a && self.quote_mint == *b)
            || (self.base_mint == *b && self.quote_mint == *a)
    }
}

/// 由池子状态与市场状态推导 PoolKeys，纯函数。
pub fn derive_pool_keys(pool: Pubkey, amm: &AmmInfo, market: &MarketState) -> Result<PoolKeys> {
    ensure!(
        market.own_address == amm.market_id,
        "池子 {pool} 关联市场 {} 与市场账户 {} 不一致",
        amm.market_id,
        market.own_address
    );
    ensure!(
        amm.base_mint == market.base_mint && amm.quote_mint == market.quote_mint,
        "池子 {pool} 与市场 {} 的 mint 不一致",
        amm.market_id
    );

    let nonce = u8::try_from(amm.nonce).map_err(|_| anyhow!("池子 {pool} nonce 越界"))?;
    let authority = Pubkey::create_program_address(
        &[AMM_AUTHORITY_SEED, &[nonce]],
        &RAYDIUM_AMM_V4_PROGRAM_ID,
    )
    .map_err(|err| anyhow!("池子 {pool} authority 推导失败: {err}"))?;

    let market_authority = Pubkey::create_program_address(
        &[
            amm.market_id.as_ref(),
            &market.vault_signer_nonce.to_le_bytes(),
        ],
        &amm.market_program_id,
    )
    .map_err(|err| anyhow!("市场 {} vault signer 推导失败: {err}", amm.market_id))?;

    Ok(PoolKeys {
        id: pool,
        program_id: RAYDIUM_AMM_V4_PROGRAM_ID,
        authority,
        open_orders: amm.open_orders,
        target_orders: amm.target_orders,
        base_mint: amm.base_mint,
        quote_mint: amm.quote_mint,
        lp_mint: amm.lp_mint,
        base_decimals: amm.base_decimal as u8,
        quote_decimals: amm.quote_decimal as u8,
        base_vault: amm.base_vault,
        quote_vault: amm.quote_vault,
        market_program_id: amm.market_program_id,
        market_id: amm.market_id,
        market_authority,
        market_base_vault: market.base_vault,
        market_quote_vault: market.quote_vault,
        market_bids: market.bids,
        market_asks: market.asks,
        market_event_queue: market.event_queue,
    })
}
