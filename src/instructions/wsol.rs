use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;

use crate::cache::associated_token_address;

use super::token::{SPL_TOKEN_PROGRAM, SYSTEM_PROGRAM_ID, close_account, create_ata_idempotent};

pub const WSOL_MINT: Pubkey = solana_sdk::pubkey!("So11111111111111111111111111111111111111112");
pub const WSOL_DECIMALS: u8 = 9;

const SYSTEM_TRANSFER_TAG: u32 = 2;
const SYNC_NATIVE_TAG: u8 = 17;

pub fn wsol_account(owner: &Pubkey) -> Pubkey {
    associated_token_address(owner, &WSOL_MINT)
}

/// 十进制数量按精度换算为最小单位，向下取整；非正数、溢出返回 None。
pub fn to_base_units(amount: Decimal, decimals: u8) -> Option<u64> {
    if amount <= Decimal::ZERO {
        return None;
    }
    let scale = Decimal::from(10u64.checked_pow(u32::from(decimals))?);
    amount.checked_mul(scale)?.floor().to_u64()
}

/// 包裹 SOL：按需创建 WSOL ATA，转入 lamports，再 sync_native 同步账面余额。
pub fn wrap_sequence(owner: &Pubkey, lamports: u64, create_account: bool) -> Vec<Instruction> {
    let ata = wsol_account(owner);
    let mut instructions = Vec::with_capacity(3);
    if create_account {
        instructions.push(create_ata_idempotent(owner, owner, &WSOL_MINT));
    }
    instructions.push(build_transfer_instruction(*owner, ata, lamports));
    instructions.push(build_sync_native_instruction(ata));
    instructions
}

/// 解包 SOL：关闭 WSOL ATA，全部余额与租金退回钱包。
pub fn unwrap_sequence(owner: &Pubkey) -> Vec<Instruction> {
    vec![close_account(&wsol_account(owner), owner)]
}

fn build_transfer_instruction(owner: Pubkey, ata: Pubkey, lamports: u64) -> Instruction {
    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&SYSTEM_TRANSFER_TAG.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());
    Instruction {
        program_id: SYSTEM_PROGRAM_ID,
        accounts: vec![AccountMeta::new(owner, true), AccountMeta::new(ata, false)],
        data,
    }
}

fn build_sync_native_instruction(ata: Pubkey) -> Instruction {
    Instruction {
        program_id: SPL_TOKEN_PROGRAM,
        accounts: vec![AccountMeta::new(ata, false)],
        data: vec![SYNC_NATIVE_TAG],
    }
}

/// 从 system transfer 指令中读出 lamports。
pub fn decode_transfer_lamports(transfer: &Instruction) -> Option<u64> {
    if transfer.program_id != SYSTEM_PROGRAM_ID || transfer.data.len() != 12 {
        return None;
    }
    let mut discriminant = [0u8; 4];
    discriminant.copy_from_slice(&transfer.data[..4]);
    if u32::from_le_bytes(discriminant) != SYSTEM_TRANSFER_TAG {
        return None;
    }
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&transfer.data[4..12]);
    Some(u64::from_le_bytes(bytes))
}

pub fn is_sync_native_instruction(instruction: &Instruction, ata: Pubkey) -> bool {
    instruction.program_id == SPL_TOKEN_PROGRAM
        && instruction
            .accounts
            .first()
            .map(|meta| meta.pubkey == ata && !meta.is_signer && meta.is_writable)
            .unwrap_or(false)
        && instruction.data.first().copied() == Some(SYNC_NATIVE_TAG)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use solana_system_interface::instruction as system_instruction;

    use super::*;

    #[test]
    fn base_units_floor_fractional_remainder() {
        let amount = Decimal::from_str("0.0010000009").unwrap();
        assert_eq!(to_base_units(amount, 9), Some(1_000_000));
        assert_eq!(to_base_units(Decimal::from_str("1.5").unwrap(), 6), Some(1_500_000));
        assert_eq!(to_base_units(Decimal::ZERO, 9), None);
        assert_eq!(to_base_units(Decimal::from_str("-1").unwrap(), 9), None);
        assert_eq!(to_base_units(Decimal::MAX, 9), None);
    }

    #[test]
    fn transfer_and_sync_match_sdk_builders() {
        let owner = Pubkey::new_unique();
        let ata = wsol_account(&owner);
        let seq = wrap_sequence(&owner, 42, false);
        assert_eq!(seq.len(), 2);
        assert_eq!(seq[0], system_instruction::transfer(&owner, &ata, 42));
        assert_eq!(
            seq[1],
            spl_token::instruction::sync_native(&SPL_TOKEN_PROGRAM, &ata).unwrap()
        );
        assert_eq!(decode_transfer_lamports(&seq[0]), Some(42));
        assert!(is_sync_native_instruction(&seq[1], ata));
    }

    #[test]
    fn unwrap_closes_wsol_account_to_owner() {
        let owner = Pubkey::new_unique();
        let seq = unwrap_sequence(&owner);
        assert_eq!(seq.len(), 1);
        assert_eq!(seq[0].accounts[0].pubkey, wsol_account(&owner));
        assert_eq!(seq[0].accounts[1].pubkey, owner);
    }
}
