use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;

use crate::instructions::token::SPL_TOKEN_PROGRAM;

use super::keys::PoolKeys;

const SWAP_BASE_IN_TAG: u8 = 9;
const SWAP_BASE_IN_ACCOUNTS: usize = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapBaseIn {
    pub amount_in: u64,
    pub min_amount_out: u64,
}

impl SwapBaseIn {
    fn encode(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(17);
        data.push(SWAP_BASE_IN_TAG);
        data.extend_from_slice(&self.amount_in.to_le_bytes());
        data.extend_from_slice(&self.min_amount_out.to_le_bytes());
        data
    }

    pub fn decode(data: &[u8]) -> Option<Self> {
        if data.len() != 17 || data[0] != SWAP_BASE_IN_TAG {
            return None;
        }
        let mut amount_in = [0u8; 8];
        amount_in.copy_from_slice(&data[1..9]);
        let mut min_amount_out = [0u8; 8];
        min_amount_out.copy_from_slice(&data[9..17]);
        Some(Self {
            amount_in: u64::from_le_bytes(amount_in),
            min_amount_out: u64::from_le_bytes(min_amount_out),
        })
    }
}

/// 固定输入 swap；方向由 `user_source` 的 mint 决定，程序侧自动匹配 vault。
pub fn swap_base_in_instruction(
    keys: &PoolKeys,
    user_source: &Pubkey,
    user_destination: &Pubkey,
    owner: &Pubkey,
    params: SwapBaseIn,
) -> Instruction {
    let mut accounts = Vec::with_capacity(SWAP_BASE_IN_ACCOUNTS);
    accounts.push(AccountMeta::new_readonly(SPL_TOKEN_PROGRAM, false));
    accounts.push(AccountMeta::new(keys.id, false));
    accounts.push(AccountMeta::new_readonly(keys.authority, false));
    accounts.push(AccountMeta::new(keys.open_orders, false));
    accounts.push(AccountMeta::new(keys.target_orders, false));
    accounts.push(AccountMeta::new(keys.base_vault, false));
    accounts.push(AccountMeta::new(keys.quote_vault, false));
    accounts.push(AccountMeta::new_readonly(keys.market_program_id, false));
    accounts.push(AccountMeta::new(keys.market_id, false));
    accounts.push(AccountMeta::new(keys.market_bids, false));
    accounts.push(AccountMeta::new(keys.market_asks, false));
    accounts.push(AccountMeta::new(keys.market_event_queue, false));
    accounts.push(AccountMeta::new(keys.market_base_vault, false));
    accounts.push(AccountMeta::new(keys.market_quote_vault, false));
    accounts.push(AccountMeta::new_readonly(keys.market_authority, false));
    accounts.push(AccountMeta::new(*user_source, false));
    accounts.push(AccountMeta::new(*user_destination, false));
    accounts.push(AccountMeta::new_readonly(*owner, true));

    Instruction {
        program_id: keys.program_id,
        accounts,
        data: params.encode(),
    }
}

pub fn is_swap_base_in(ix: &Instruction) -> bool {
    ix.program_id == super::RAYDIUM_AMM_V4_PROGRAM_ID && SwapBaseIn::decode(&ix.data).is_some()
}

#[cfg(test)]
mod tests {
    use super::super::keys::fixtures::sample_pool_keys;
    use super::*;

    #[test]
    fn encodes_tag_amounts_and_account_order() {
        let keys = sample_pool_keys(Pubkey::new_unique(), Pubkey::new_unique());
        let (source, destination, owner) = (
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
        );
        let params = SwapBaseIn {
            amount_in: 1_234,
            min_amount_out: 0,
        };
        let ix = swap_base_in_instruction(&keys, &source, &destination, &owner, params);

        assert_eq!(ix.accounts.len(), SWAP_BASE_IN_ACCOUNTS);
        assert_eq!(ix.data[0], SWAP_BASE_IN_TAG);
        assert_eq!(SwapBaseIn::decode(&ix.data), Some(params));
        assert_eq!(ix.accounts[1].pubkey, keys.id);
        assert_eq!(ix.accounts[14].pubkey, keys.market_authority);
        assert_eq!(ix.accounts[15].pubkey, source);
        assert_eq!(ix.accounts[16].pubkey, destination);
        assert!(ix.accounts[17].is_signer);
        assert!(is_swap_base_in(&ix));
    }
}
