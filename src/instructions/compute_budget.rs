use std::mem;

use smallvec::SmallVec;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;

pub const COMPUTE_BUDGET_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("ComputeBudget111111111111111111111111111111");

/// 优先费参数：单价（micro-lamports / CU）与 CU 上限。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeDirectives {
    pub unit_price_micro_lamports: u64,
    pub unit_limit: u32,
}

impl FeeDirectives {
    pub fn new(unit_price_micro_lamports: u64, unit_limit: u32) -> Self {
        Self {
            unit_price_micro_lamports,
            unit_limit,
        }
    }

    /// 价格指令在前、上限指令在后；两条始终输出，保证指令数量稳定。
    pub fn sequence(&self) -> SmallVec<[Instruction; 2]> {
        let mut seq = SmallVec::<[Instruction; 2]>::new();
        seq.push(compute_unit_price_instruction(
            self.unit_price_micro_lamports,
        ));
        seq.push(compute_unit_limit_instruction(self.unit_limit));
        seq
    }
}

pub fn compute_unit_limit_instruction(limit: u32) -> Instruction {
    let mut data = Vec::with_capacity(1 + mem::size_of::<u32>());
    data.push(2);
    data.extend_from_slice(&limit.to_le_bytes());
    Instruction {
        program_id: COMPUTE_BUDGET_PROGRAM_ID,
        accounts: Vec::new(),
        data,
    }
}

pub fn compute_unit_price_instruction(price_micro_lamports: u64) -> Instruction {
    let mut data = Vec::with_capacity(1 + mem::size_of::<u64>());
    data.push(3);
    data.extend_from_slice(&price_micro_lamports.to_le_bytes());
    Instruction {
        program_id: COMPUTE_BUDGET_PROGRAM_ID,
        accounts: Vec::new(),
        data,
    }
}

pub fn is_compute_budget(ix: &Instruction) -> bool {
    ix.program_id == COMPUTE_BUDGET_PROGRAM_ID
}
