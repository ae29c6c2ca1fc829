use anyhow::{Result, anyhow, ensure};
use solana_sdk::pubkey::Pubkey;

pub const AMM_INFO_LEN: usize = 752;
pub const MARKET_STATE_LEN: usize = 388;

const OFFSET_STATUS: usize = 0x00;
const OFFSET_NONCE: usize = 0x08;
const OFFSET_BASE_DECIMAL: usize = 0x20;
const OFFSET_QUOTE_DECIMAL: usize = 0x28;
const OFFSET_BASE_VAULT: usize = 336;
const OFFSET_QUOTE_VAULT: usize = 368;
const OFFSET_BASE_MINT: usize = 400;
const OFFSET_QUOTE_MINT: usize = 432;
const OFFSET_LP_MINT: usize = 464;
const OFFSET_OPEN_ORDERS: usize = 496;
const OFFSET_MARKET_ID: usize = 528;
const OFFSET_MARKET_PROGRAM: usize = 560;
const OFFSET_TARGET_ORDERS: usize = 592;

const MARKET_OFFSET_OWN_ADDRESS: usize = 13;
const MARKET_OFFSET_VAULT_SIGNER_NONCE: usize = 45;
const MARKET_OFFSET_BASE_MINT: usize = 53;
const MARKET_OFFSET_QUOTE_MINT: usize = 85;
const MARKET_OFFSET_BASE_VAULT: usize = 117;
const MARKET_OFFSET_QUOTE_VAULT: usize = 165;
const MARKET_OFFSET_EVENT_QUEUE: usize = 253;
const MARKET_OFFSET_BIDS: usize = 285;
const MARKET_OFFSET_ASKS: usize = 317;

/// Raydium AMM v4 池子账户中构建 swap 需要的字段。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmmInfo {
    pub status: u64,
    pub nonce: u64,
    pub base_decimal: u64,
    pub quote_decimal: u64,
    pub base_vault: Pubkey,
    pub quote_vault: Pubkey,
    pub base_mint: Pubkey,
    pub quote_mint: Pubkey,
    pub lp_mint: Pubkey,
    pub open_orders: Pubkey,
    pub market_id: Pubkey,
    pub market_program_id: Pubkey,
    pub target_orders: Pubkey,
}

/// OpenBook / Serum v3 市场账户的最小视图。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketState {
    pub own_address: Pubkey,
    pub vault_signer_nonce: u64,
    pub base_mint: Pubkey,
    pub quote_mint: Pubkey,
    pub base_vault: Pubkey,
    pub quote_vault: Pubkey,
    pub event_queue: Pubkey,
    pub bids: Pubkey,
    pub asks: Pubkey,
}

pub fn decode_amm_info(pool: &Pubkey, data: &[u8]) -> Result<AmmInfo> {
    ensure!(
        data.len() == AMM_INFO_LEN,
        "AMM 池子 {pool} 数据长度异常: {} 字节（期望 {AMM_INFO_LEN}）",
        data.len()
    );

    let info = AmmInfo {
        status: read_u64(data, OFFSET_STATUS)?,
        nonce: read_u64(data, OFFSET_NONCE)?,
        base_decimal: read_u64(data, OFFSET_BASE_DECIMAL)?,
        quote_decimal: read_u64(data, OFFSET_QUOTE_DECIMAL)?,
        base_vault: read_pubkey(data, OFFSET_BASE_VAULT)?,
        quote_vault: read_pubkey(data, OFFSET_QUOTE_VAULT)?,
        base_mint: read_pubkey(data, OFFSET_BASE_MINT)?,
        quote_mint: read_pubkey(data, OFFSET_QUOTE_MINT)?,
        lp_mint: read_pubkey(data, OFFSET_LP_MINT)?,
        open_orders: read_pubkey(data, OFFSET_OPEN_ORDERS)?,
        market_id: read_pubkey(data, OFFSET_MARKET_ID)?,
        market_program_id: read_pubkey(data, OFFSET_MARKET_PROGRAM)?,
        target_orders: read_pubkey(data, OFFSET_TARGET_ORDERS)?,
    };

    ensure!(info.status != 0, "AMM 池子 {pool} 尚未初始化");
    ensure!(
        info.nonce <= u64::from(u8::MAX),
        "AMM 池子 {pool} nonce 越界: {}",
        info.nonce
    );
    ensure!(
        info.base_decimal <= u64::from(u8::MAX) && info.quote_decimal <= u64::from(u8::MAX),
        "AMM 池子 {pool} 精度字段非法: base {} quote {}",
        info.base_decimal,
        info.quote_decimal
    );
    ensure!(
        info.base_mint != info.quote_mint,
        "AMM 池子 {pool} base/quote mint 相同: {}",
        info.base_mint
    );
    ensure!(
        info.market_id != Pubkey::default(),
        "AMM 池子 {pool} 未关联市场"
    );
    Ok(info)
}

pub fn decode_market_state(market: &Pubkey, data: &[u8]) -> Result<MarketState> {
    ensure!(
        data.len() >= MARKET_STATE_LEN,
        "市场 {market} 数据长度不足: {} 字节",
        data.len()
    );

    let state = MarketState {
        own_address: read_pubkey(data, MARKET_OFFSET_OWN_ADDRESS)?,
        vault_signer_nonce: read_u64(data, MARKET_OFFSET_VAULT_SIGNER_NONCE)?,
        base_mint: read_pubkey(data, MARKET_OFFSET_BASE_MINT)?,
        quote_mint: read_pubkey(data, MARKET_OFFSET_QUOTE_MINT)?,
        base_vault: read_pubkey(data, MARKET_OFFSET_BASE_VAULT)?,
        quote_vault: read_pubkey(data, MARKET_OFFSET_QUOTE_VAULT)?,
        event_queue: read_pubkey(data, MARKET_OFFSET_EVENT_QUEUE)?,
        bids: read_pubkey(data, MARKET_OFFSET_BIDS)?,
        asks: read_pubkey(data, MARKET_OFFSET_ASKS)?,
    };

    ensure!(
        state.own_address == *market,
        "市场 {market} own_address 不匹配: {}",
        state.own_address
    );
    Ok(state)
}

fn read_u64(data: &[u8], offset: usize) -> Result<u64> {
    let end = offset
        .checked_add(8)
        .ok_or_else(|| anyhow!("布局偏移溢出"))?;
    ensure!(end <= data.len(), "账户数据在偏移 {offset:#x} 长度不足");
    let mut buffer = [0u8; 8];
    buffer.copy_from_slice(&data[offset..end]);
    Ok(u64::from_le_bytes(buffer))
}

fn read_pubkey(data: &[u8], offset: usize) -> Result<Pubkey> {
    let end = offset
        .checked_add(32)
        .ok_or_else(|| anyhow!("布局偏移溢出"))?;
    ensure!(end <= data.len(), "账户数据在偏移 {offset:#x} 长度不足");
    let mut buffer = [0u8; 32];
    buffer.copy_from_slice(&data[offset..end]);
    Ok(Pubkey::new_from_array(buffer))
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn decodes_amm_info_fields_at_fixed_offsets() {
        let pool = Pubkey::new_unique();
        let info = sample_amm_info(Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
        let decoded = decode_amm_info(&pool, &amm_info_bytes(&info)).expect("decode");
        assert_eq!(decoded, info);
    }

    #[test]
    fn rejects_wrong_length_and_uninitialized_pool() {
        let pool = Pubkey::new_unique();
        let err = decode_amm_info(&pool, &[0u8; 100]).unwrap_err();
        assert!(err.to_string().contains("长度异常"));

        let mut info = sample_amm_info(Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
        info.status = 0;
        let err = decode_amm_info(&pool, &amm_info_bytes(&info)).unwrap_err();
        assert!(err.to_string().contains("尚未初始化"));
    }

    #[test]
    fn market_own_address_must_match() {
        let market = Pubkey::new_unique();
        let state = sample_market_state(Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
        let err = decode_market_state(&market, &market_state_bytes(&state)).unwrap_err();
        assert!(err.to_string().contains("own_address"));

        let state = sample_market_state(market, Pubkey::new_unique(), Pubkey::new_unique());
        let decoded = decode_market_state(&market, &market_state_bytes(&state)).expect("decode");
        assert_eq!(decoded.bids, state.bids);
        assert_eq!(decoded.event_queue, state.event_queue);
    }

    #[test]
    fn read_pubkey_oob() {
        let data = vec![0u8; 16];
        let err = read_pubkey(&data, 0).unwrap_err();
        assert!(err.to_string().contains("长度不足"));
    }
}
