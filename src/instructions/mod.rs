//! 指令层：优先费、SPL token、WSOL 与 Raydium AMM v4 指令的纯数据构建。

pub mod builder;
pub mod compute_budget;
pub mod error;
pub mod raydium;
pub mod token;
pub mod wsol;

pub use builder::InstructionBuilder;
pub use compute_budget::FeeDirectives;
pub use error::ConstructionError;
