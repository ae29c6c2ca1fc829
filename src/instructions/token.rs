use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;

use crate::cache::associated_token_address;

pub const SPL_TOKEN_PROGRAM: Pubkey = spl_token::ID;
pub const ASSOCIATED_TOKEN_PROGRAM: Pubkey = spl_associated_token_account::ID;
pub const SYSTEM_PROGRAM_ID: Pubkey = solana_sdk::pubkey!("11111111111111111111111111111111");

const CREATE_IDEMPOTENT_TAG: u8 = 1;
const CLOSE_ACCOUNT_TAG: u8 = 9;

/// 幂等创建 ATA（账户已存在时为空操作）。
pub fn create_ata_idempotent(payer: &Pubkey, owner: &Pubkey, mint: &Pubkey) -> Instruction {
    let ata = associated_token_address(owner, mint);
    Instruction {
        program_id: ASSOCIATED_TOKEN_PROGRAM,
        accounts: vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new(ata, false),
            AccountMeta::new_readonly(*owner, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
            AccountMeta::new_readonly(SPL_TOKEN_PROGRAM, false),
        ],
        data: vec![CREATE_IDEMPOTENT_TAG],
    }
}

/// 关闭 token 账户，剩余 lamports（WSOL 即全部余额）退回 owner。
pub fn close_account(account: &Pubkey, owner: &Pubkey) -> Instruction {
    Instruction {
        program_id: SPL_TOKEN_PROGRAM,
        accounts: vec![
            AccountMeta::new(*account, false),
            AccountMeta::new(*owner, false),
            AccountMeta::new_readonly(*owner, true),
        ],
        data: vec![CLOSE_ACCOUNT_TAG],
    }
}

pub fn is_close_account(ix: &Instruction) -> bool {
    ix.program_id == SPL_TOKEN_PROGRAM && ix.data.first().copied() == Some(CLOSE_ACCOUNT_TAG)
}

pub fn is_create_ata(ix: &Instruction) -> bool {
    ix.program_id == ASSOCIATED_TOKEN_PROGRAM
}
