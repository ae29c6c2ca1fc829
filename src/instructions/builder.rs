use rust_decimal::Decimal;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, warn};

use crate::cache::associated_token_address;
use crate::config::{MinAmountOut, QuoteAsset};

use super::compute_budget::FeeDirectives;
use super::error::ConstructionError;
use super::raydium::{PoolKeys, SwapBaseIn, swap_base_in_instruction};
use super::token::{close_account, create_ata_idempotent};
use super::wsol::{self, WSOL_DECIMALS};

/// 按操作生成有序指令列表：优先费指令在最前，业务指令居中，关闭账户在最后。
/// 纯数据构建，不访问链上状态；所需的账户状态由调用方读好传入。
#[derive(Debug, Clone)]
pub struct InstructionBuilder {
    owner: Pubkey,
    quote: QuoteAsset,
    fees: FeeDirectives,
    min_amount_out: MinAmountOut,
}

impl InstructionBuilder {
    pub fn new(
        owner: Pubkey,
        quote: QuoteAsset,
        fees: FeeDirectives,
        min_amount_out: MinAmountOut,
    ) -> Self {
        Self {
            owner,
            quote,
            fees,
            min_amount_out,
        }
    }

    pub fn owner(&self) -> &Pubkey {
        &self.owner
    }

    pub fn quote(&self) -> &QuoteAsset {
        &self.quote
    }

    /// 把 `amount` SOL 包裹为 WSOL，转账额为 floor(amount * 10^9)。
    pub fn wrap(
        &self,
        amount: Decimal,
        wsol_account_exists: bool,
    ) -> Result<Vec<Instruction>, ConstructionError> {
        let lamports = positive_base_units(amount, WSOL_DECIMALS)?;
        let mut instructions = self.with_fee_directives(4);
        instructions.extend(wsol::wrap_sequence(
            &self.owner,
            lamports,
            !wsol_account_exists,
        ));
        debug!(
            target: "instructions",
            owner = %self.owner,
            lamports,
            create_account = !wsol_account_exists,
            "wrap 指令已构建"
        );
        Ok(instructions)
    }

    /// 关闭 WSOL 账户取回全部余额。余额为 0 时返回空列表（无操作）。
    /// 关闭账户无法部分提取，`requested` 小于余额时仍取回全部。
    pub fn unwrap(
        &self,
        balance: u64,
        requested: Option<Decimal>,
    ) -> Result<Vec<Instruction>, ConstructionError> {
        if balance == 0 {
            debug!(target: "instructions", owner = %self.owner, "WSOL 余额为 0，跳过 unwrap");
            return Ok(Vec::new());
        }

        if let Some(amount) = requested {
            let requested_lamports = positive_base_units(amount, WSOL_DECIMALS)?;
            if requested_lamports < balance {
                warn!(
                    target: "instructions",
                    requested_lamports,
                    balance,
                    "unwrap 只支持全额，将取回全部 WSOL 余额"
                );
            }
        }

        let mut instructions = self.with_fee_directives(1);
        instructions.extend(wsol::unwrap_sequence(&self.owner));
        Ok(instructions)
    }

    /// 以全部余额卖出 `token_mint`：幂等创建计价资产 ATA、swap_base_in、关闭已清空的 token 账户。
    pub fn swap_sell(
        &self,
        keys: &PoolKeys,
        token_mint: &Pubkey,
        balance: u64,
    ) -> Result<Vec<Instruction>, ConstructionError> {
        if balance == 0 {
            return Err(ConstructionError::InvalidAmount(format!(
                "卖出 {token_mint} 的余额必须大于 0"
            )));
        }
        if *token_mint == self.quote.mint || !keys.pairs(token_mint, &self.quote.mint) {
            return Err(ConstructionError::PoolMismatch {
                pool: keys.id,
                base: keys.base_mint,
                quote: keys.quote_mint,
                token: *token_mint,
                quote_asset: self.quote.mint,
            });
        }

        let source = associated_token_address(&self.owner, token_mint);
        let destination = associated_token_address(&self.owner, &self.quote.mint);
        let params = SwapBaseIn {
            amount_in: balance,
            min_amount_out: self.min_amount_out.base_units(),
        };

        let mut instructions = self.with_fee_directives(3);
        instructions.push(create_ata_idempotent(
            &self.owner,
            &self.owner,
            &self.quote.mint,
        ));
        instructions.push(swap_base_in_instruction(
            keys,
            &source,
            &destination,
            &self.owner,
            params,
        ));
        instructions.push(close_account(&source, &self.owner));

        debug!(
            target: "instructions",
            pool = %keys.id,
            mint = %token_mint,
            amount_in = balance,
            min_amount_out = params.min_amount_out,
            "sell 指令已构建"
        );
        Ok(instructions)
    }

    fn with_fee_directives(&self, extra: usize) -> Vec<Instruction> {
        let mut instructions = Vec::with_capacity(2 + extra);
        instructions.extend(self.fees.sequence());
        instructions
    }
}

fn positive_base_units(amount: Decimal, decimals: u8) -> Result<u64, ConstructionError> {
    match wsol::to_base_units(amount, decimals) {
        Some(0) => Err(ConstructionError::InvalidAmount(format!(
            "{amount} 低于最小单位"
        ))),
        Some(units) => Ok(units),
        None => Err(ConstructionError::InvalidAmount(format!(
            "{amount} 必须为正且在可表示范围内"
        ))),
    }
}
