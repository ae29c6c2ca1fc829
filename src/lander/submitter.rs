use std::sync::Arc;
use std::time::Duration;

use solana_sdk::instruction::Instruction;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::transaction::VersionedTransaction;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::{BlockhashPolicy, SubmissionConfig};
use crate::monitoring::events;
use crate::rpc::{BlockhashWindow, ConfirmationStatus, GatewayError, TransactionGateway};

use super::error::{SubmissionFailure, SubmissionOutcome};
use super::transaction::compile_transaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionPolicy {
    pub max_attempts: u32,
    pub retry_delay: Duration,
    pub confirm_poll_interval: Duration,
    pub max_poll_failures: u32,
    pub blockhash_policy: BlockhashPolicy,
}

impl From<&SubmissionConfig> for SubmissionPolicy {
    fn from(config: &SubmissionConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            confirm_poll_interval: Duration::from_millis(config.confirm_poll_interval_ms),
            max_poll_failures: config.max_poll_failures.max(1),
            blockhash_policy: config.blockhash_policy,
        }
    }
}

/// 签名、提交并确认一笔交易。提交层失败按固定间隔有界重试，链上执行失败不重试。
#[derive(Clone)]
pub struct TransactionSubmitter {
    gateway: Arc<dyn TransactionGateway>,
    policy: SubmissionPolicy,
}

impl TransactionSubmitter {
    pub fn new(gateway: Arc<dyn TransactionGateway>, policy: SubmissionPolicy) -> Self {
        Self { gateway, policy }
    }

    pub fn policy(&self) -> &SubmissionPolicy {
        &self.policy
    }

    pub async fn submit(
        &self,
        operation: &'static str,
        instructions: &[Instruction],
        signer: &Keypair,
        skip_preflight: bool,
    ) -> SubmissionOutcome {
        let outcome = self
            .submit_inner(operation, instructions, signer, skip_preflight)
            .await;
        events::submission_outcome(operation, &outcome);
        outcome
    }

    async fn submit_inner(
        &self,
        operation: &'static str,
        instructions: &[Instruction],
        signer: &Keypair,
        skip_preflight: bool,
    ) -> SubmissionOutcome {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut signed: Option<(VersionedTransaction, BlockhashWindow)> = None;
        let mut last_error: Option<GatewayError> = None;

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                sleep(self.policy.retry_delay).await;
            }
            events::submission_attempt(operation, attempt, max_attempts);

            let reuse = matches!(
                self.policy.blockhash_policy,
                BlockhashPolicy::ReuseAcrossAttempts
            );
            let (transaction, window) = match signed.as_ref().filter(|_| reuse) {
                Some((transaction, window)) => (transaction.clone(), *window),
                None => {
                    let window = match self.gateway.latest_blockhash().await {
                        Ok(window) => window,
                        Err(err) => {
                            events::submission_retry(operation, attempt, "blockhash", &err);
                            last_error = Some(err);
                            continue;
                        }
                    };
                    let transaction =
                        match compile_transaction(instructions, signer, window.blockhash) {
                            Ok(transaction) => transaction,
                            Err(err) => {
                                return SubmissionOutcome::SubmissionFailed(
                                    SubmissionFailure::Build(err.to_string()),
                                );
                            }
                        };
                    signed = Some((transaction.clone(), window));
                    (transaction, window)
                }
            };

            match self
                .gateway
                .send_transaction(&transaction, skip_preflight)
                .await
            {
                Ok(signature) => {
                    info!(
                        target: "lander::submit",
                        operation,
                        attempt,
                        signature = %signature,
                        last_valid_block_height = window.last_valid_block_height,
                        "交易已提交，等待确认"
                    );
                    return self.confirm(operation, signature, window).await;
                }
                Err(err) if !err.is_retryable() => {
                    warn!(
                        target: "lander::submit",
                        operation,
                        attempt,
                        error = %err,
                        "交易被拒绝，不再重试"
                    );
                    return SubmissionOutcome::SubmissionFailed(SubmissionFailure::Rejected {
                        reason: err.to_string(),
                    });
                }
                Err(err) => {
                    events::submission_retry(operation, attempt, "send", &err);
                    last_error = Some(err);
                }
            }
        }

        SubmissionOutcome::SubmissionFailed(SubmissionFailure::Exhausted {
            attempts: max_attempts,
            last_error: last_error
                .map(|err| err.to_string())
                .unwrap_or_else(|| "未知错误".to_string()),
        })
    }

    /// 轮询签名状态直到确认、执行失败，或区块高度越过 blockhash 有效期。
    /// 区块高度连续读取失败达到上限时无法再判断有效期，同样按过期返回。
    async fn confirm(
        &self,
        operation: &'static str,
        signature: Signature,
        window: BlockhashWindow,
    ) -> SubmissionOutcome {
        let max_poll_failures = self.policy.max_poll_failures.max(1);
        let mut height_failures = 0u32;
        loop {
            match self.gateway.signature_status(&signature).await {
                Ok(ConfirmationStatus::Confirmed) => {
                    return SubmissionOutcome::Confirmed(signature);
                }
                Ok(ConfirmationStatus::Failed(err)) => {
                    return SubmissionOutcome::ExecutionFailed(signature, err);
                }
                Ok(ConfirmationStatus::Pending) => {}
                Err(err) => {
                    warn!(
                        target: "lander::submit",
                        operation,
                        signature = %signature,
                        error = %err,
                        "查询签名状态失败，继续轮询"
                    );
                }
            }

            match self.gateway.block_height().await {
                Ok(height) if height > window.last_valid_block_height => {
                    return SubmissionOutcome::SubmissionFailed(SubmissionFailure::Expired {
                        signature,
                    });
                }
                Ok(height) => {
                    height_failures = 0;
                    debug!(
                        target: "lander::submit",
                        signature = %signature,
                        height,
                        last_valid_block_height = window.last_valid_block_height,
                        "交易尚未确认"
                    );
                }
                Err(err) => {
                    height_failures += 1;
                    if height_failures >= max_poll_failures {
                        warn!(
                            target: "lander::submit",
                            operation,
                            signature = %signature,
                            failures = height_failures,
                            error = %err,
                            "区块高度连续读取失败，按过期处理"
                        );
                        return SubmissionOutcome::SubmissionFailed(SubmissionFailure::Expired {
                            signature,
                        });
                    }
                    warn!(
                        target: "lander::submit",
                        operation,
                        failures = height_failures,
                        error = %err,
                        "查询区块高度失败，继续轮询"
                    );
                }
            }

            sleep(self.policy.confirm_poll_interval).await;
        }
    }
}
