use solana_sdk::signature::Signature;
use solana_sdk::transaction::TransactionError;
use thiserror::Error;

/// 交易未能在链上得到执行结果的原因。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmissionFailure {
    /// 所有尝试都在提交层失败，没有产生签名。
    #[error("提交 {attempts} 次均失败: {last_error}")]
    Exhausted { attempts: u32, last_error: String },
    #[error("交易被 preflight 拒绝: {reason}")]
    Rejected { reason: String },
    #[error("交易 {signature} 在 blockhash 有效期内未确认")]
    Expired { signature: Signature },
    #[error("交易构建失败: {0}")]
    Build(String),
}

/// 一次提交的终态，三者互斥。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Confirmed(Signature),
    /// 已上链但执行失败；不重试。
    ExecutionFailed(Signature, TransactionError),
    SubmissionFailed(SubmissionFailure),
}

impl SubmissionOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, SubmissionOutcome::Confirmed(_))
    }

    pub fn signature(&self) -> Option<&Signature> {
        match self {
            SubmissionOutcome::Confirmed(signature)
            | SubmissionOutcome::ExecutionFailed(signature, _) => Some(signature),
            SubmissionOutcome::SubmissionFailed(SubmissionFailure::Expired { signature }) => {
                Some(signature)
            }
            SubmissionOutcome::SubmissionFailed(_) => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SubmissionOutcome::Confirmed(_) => "confirmed",
            SubmissionOutcome::ExecutionFailed(..) => "execution_failed",
            SubmissionOutcome::SubmissionFailed(SubmissionFailure::Exhausted { .. }) => "exhausted",
            SubmissionOutcome::SubmissionFailed(SubmissionFailure::Rejected { .. }) => "rejected",
            SubmissionOutcome::SubmissionFailed(SubmissionFailure::Expired { .. }) => "expired",
            SubmissionOutcome::SubmissionFailed(SubmissionFailure::Build(_)) => "build_error",
        }
    }
}
