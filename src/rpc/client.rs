use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_commitment_config::CommitmentConfig;
use solana_sdk::account::Account;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::VersionedTransaction;
use tracing::{debug, info};

use super::error::GatewayError;
use super::{AccountSource, BlockhashWindow, ConfirmationStatus, TransactionGateway};

const RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// 基于 nonblocking `RpcClient` 的链上边界实现，所有读写共用同一 commitment。
#[derive(Clone)]
pub struct RpcGateway {
    client: Arc<RpcClient>,
    commitment: CommitmentConfig,
}

impl fmt::Debug for RpcGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcGateway")
            .field("url", &self.client.url())
            .field("commitment", &self.commitment.commitment)
            .finish()
    }
}

impl RpcGateway {
    pub fn new(url: impl Into<String>, commitment: CommitmentConfig) -> Self {
        let client =
            RpcClient::new_with_timeout_and_commitment(url.into(), RPC_TIMEOUT, commitment);
        Self::with_client(Arc::new(client), commitment)
    }

    pub fn with_client(client: Arc<RpcClient>, commitment: CommitmentConfig) -> Self {
        Self { client, commitment }
    }

    pub fn url(&self) -> String {
        self.client.url()
    }
}

#[async_trait]
impl AccountSource for RpcGateway {
    async fn fetch_account(&self, address: &Pubkey) -> Result<Option<Account>, GatewayError> {
        let response = self
            .client
            .get_account_with_commitment(address, self.commitment)
            .await?;
        Ok(response.value)
    }
}

#[async_trait]
impl TransactionGateway for RpcGateway {
    async fn latest_blockhash(&self) -> Result<BlockhashWindow, GatewayError> {
        let (blockhash, last_valid_block_height) = self
            .client
            .get_latest_blockhash_with_commitment(self.commitment)
            .await?;
        debug!(
            target: "rpc",
            blockhash = %blockhash,
            last_valid_block_height,
            "已获取最新 blockhash"
        );
        Ok(BlockhashWindow {
            blockhash,
            last_valid_block_height,
        })
    }

    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
        skip_preflight: bool,
    ) -> Result<Signature, GatewayError> {
        let config = RpcSendTransactionConfig {
            skip_preflight,
            preflight_commitment: Some(self.commitment.commitment),
            // 重试由提交器负责，节点侧不再重发
            max_retries: Some(0),
            ..RpcSendTransactionConfig::default()
        };
        let signature = self
            .client
            .send_transaction_with_config(transaction, config)
            .await?;
        info!(
            target: "rpc",
            signature = %signature,
            skip_preflight,
            "transaction submitted via rpc client"
        );
        Ok(signature)
    }

    async fn signature_status(
        &self,
        signature: &Signature,
    ) -> Result<ConfirmationStatus, GatewayError> {
        let response = self.client.get_signature_statuses(&[*signature]).await?;
        let Some(status) = response.value.into_iter().next().flatten() else {
            return Ok(ConfirmationStatus::Pending);
        };
        if let Some(err) = status.err {
            return Ok(ConfirmationStatus::Failed(err));
        }
        if status.satisfies_commitment(self.commitment) {
            Ok(ConfirmationStatus::Confirmed)
        } else {
            Ok(ConfirmationStatus::Pending)
        }
    }

    async fn block_height(&self) -> Result<u64, GatewayError> {
        Ok(self
            .client
            .get_block_height_with_commitment(self.commitment)
            .await?)
    }
}
