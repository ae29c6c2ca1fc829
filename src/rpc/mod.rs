//! 链上边界：账户读取、交易提交与确认查询。

pub mod client;
pub mod error;
#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;
use solana_sdk::account::Account;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::{TransactionError, VersionedTransaction};
use spl_token::solana_program::program_pack::Pack;

pub use client::RpcGateway;
pub use error::GatewayError;

/// 一个 blockhash 及其有效期上界。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockhashWindow {
    pub blockhash: Hash,
    pub last_valid_block_height: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationStatus {
    Pending,
    Confirmed,
    Failed(TransactionError),
}

#[async_trait]
pub trait AccountSource: Send + Sync {
    /// 账户不存在时返回 `Ok(None)`。
    async fn fetch_account(&self, address: &Pubkey) -> Result<Option<Account>, GatewayError>;
}

#[async_trait]
pub trait TransactionGateway: Send + Sync {
    async fn latest_blockhash(&self) -> Result<BlockhashWindow, GatewayError>;

    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
        skip_preflight: bool,
    ) -> Result<Signature, GatewayError>;

    async fn signature_status(
        &self,
        signature: &Signature,
    ) -> Result<ConfirmationStatus, GatewayError>;

    async fn block_height(&self) -> Result<u64, GatewayError>;
}

/// 读取 SPL token 账户余额；账户不存在视为 `None`。
pub async fn token_balance(
    source: &dyn AccountSource,
    address: &Pubkey,
) -> Result<Option<u64>, GatewayError> {
    let Some(account) = source.fetch_account(address).await? else {
        return Ok(None);
    };
    if account.owner != spl_token::ID {
        return Err(GatewayError::Decode(format!(
            "账户 {address} 不属于 SPL Token Program (owner={})",
            account.owner
        )));
    }
    let state = spl_token::state::Account::unpack(&account.data)
        .map_err(|err| GatewayError::Decode(format!("解析 token 账户 {address} 失败: {err}")))?;
    Ok(Some(state.amount))
}

#[cfg(test)]
mod tests {
    use super::mock::{MockChain, token_account};
    use super::*;

    #[tokio::test]
    async fn token_balance_reads_amount_and_treats_missing_as_none() {
        let chain = MockChain::new();
        let (owner, mint) = (Pubkey::new_unique(), Pubkey::new_unique());
        let present = Pubkey::new_unique();
        chain.insert_account(present, token_account(&mint, &owner, 42));

        assert_eq!(token_balance(&chain, &present).await.unwrap(), Some(42));
        assert_eq!(
            token_balance(&chain, &Pubkey::new_unique()).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn token_balance_rejects_foreign_owner() {
        let chain = MockChain::new();
        let address = Pubkey::new_unique();
        chain.insert_account(
            address,
            Account {
                lamports: 1,
                data: vec![0; 165],
                owner: Pubkey::new_unique(),
                executable: false,
                rent_epoch: 0,
            },
        );
        let err = token_balance(&chain, &address).await.unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
    }
}
