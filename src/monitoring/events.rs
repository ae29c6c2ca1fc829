use metrics::counter;
use solana_sdk::pubkey::Pubkey;
use tracing::{error, info, warn};

use crate::lander::SubmissionOutcome;
use crate::rpc::GatewayError;

use super::metrics::prometheus_enabled;

pub fn submission_attempt(operation: &'static str, attempt: u32, max_attempts: u32) {
    info!(
        target: "lander::submit",
        event = "attempt",
        operation,
        attempt,
        max_attempts,
        "开始提交交易"
    );
    if prometheus_enabled() {
        counter!("raydium_exit_submission_attempts_total", "operation" => operation).increment(1);
    }
}

pub fn submission_retry(operation: &'static str, attempt: u32, stage: &'static str, err: &GatewayError) {
    warn!(
        target: "lander::submit",
        event = "retry",
        operation,
        attempt,
        stage,
        error = %err,
        "提交失败，准备重试"
    );
    if prometheus_enabled() {
        counter!(
            "raydium_exit_submission_failures_total",
            "operation" => operation,
            "stage" => stage
        )
        .increment(1);
    }
}

pub fn submission_outcome(operation: &'static str, outcome: &SubmissionOutcome) {
    match outcome {
        SubmissionOutcome::Confirmed(signature) => info!(
            target: "lander::submit",
            event = "outcome",
            operation,
            signature = %signature,
            "交易已确认"
        ),
        SubmissionOutcome::ExecutionFailed(signature, err) => error!(
            target: "lander::submit",
            event = "outcome",
            operation,
            signature = %signature,
            error = %err,
            "交易上链但执行失败"
        ),
        SubmissionOutcome::SubmissionFailed(failure) => error!(
            target: "lander::submit",
            event = "outcome",
            operation,
            error = %failure,
            "交易提交失败"
        ),
    }
    if prometheus_enabled() {
        counter!(
            "raydium_exit_submission_outcomes_total",
            "operation" => operation,
            "outcome" => outcome.label()
        )
        .increment(1);
    }
}

pub fn pool_resolved(mint: &Pubkey, pool: &Pubkey, dex_id: &str) {
    info!(
        target: "resolver",
        event = "resolved",
        mint = %mint,
        pool = %pool,
        dex_id,
        "池子解析完成"
    );
    if prometheus_enabled() {
        counter!("raydium_exit_pool_resolutions_total", "result" => "ok").increment(1);
    }
}

pub fn pool_resolution_failed(mint: &Pubkey, reason: &str) {
    warn!(
        target: "resolver",
        event = "resolution_failed",
        mint = %mint,
        reason,
        "池子解析失败"
    );
    if prometheus_enabled() {
        counter!("raydium_exit_pool_resolutions_total", "result" => "error").increment(1);
    }
}

pub fn oracle_lookup(source: &'static str, mint: &Pubkey, result: &'static str) {
    info!(
        target: "oracle",
        event = "lookup",
        source,
        mint = %mint,
        result,
        "价格查询"
    );
    if prometheus_enabled() {
        counter!(
            "raydium_exit_oracle_lookups_total",
            "source" => source,
            "result" => result
        )
        .increment(1);
    }
}
