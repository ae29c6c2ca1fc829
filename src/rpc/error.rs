use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::rpc_request::{RpcError, RpcResponseErrorData};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// 网络或节点层面的失败，可重试。
    #[error("RPC 传输失败: {0}")]
    Transport(String),
    /// preflight 模拟拒绝；结果确定，重试无意义。
    #[error("preflight 模拟失败: {0}")]
    PreflightRejected(String),
    #[error("响应解析失败: {0}")]
    Decode(String),
}

impl GatewayError {
    /// 只有 preflight 拒绝是确定性失败，其余都按提交层故障处理。
    pub fn is_retryable(&self) -> bool {
        !matches!(self, GatewayError::PreflightRejected(_))
    }
}

impl From<ClientError> for GatewayError {
    fn from(err: ClientError) -> Self {
        match err.kind() {
            ClientErrorKind::RpcError(RpcError::RpcResponseError {
                message,
                data: RpcResponseErrorData::SendTransactionPreflightFailure(result),
                ..
            }) => {
                let logs = result
                    .logs
                    .as_ref()
                    .and_then(|logs| logs.last().cloned())
                    .unwrap_or_default();
                GatewayError::PreflightRejected(if logs.is_empty() {
                    message.clone()
                } else {
                    format!("{message} ({logs})")
                })
            }
            ClientErrorKind::TransactionError(tx_err) => {
                GatewayError::PreflightRejected(tx_err.to_string())
            }
            ClientErrorKind::SerdeJson(inner) => GatewayError::Decode(inner.to_string()),
            ClientErrorKind::RpcError(RpcError::ParseError(message)) => {
                GatewayError::Decode(message.clone())
            }
            _ => GatewayError::Transport(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_client::rpc_response::RpcSimulateTransactionResult;

    #[test]
    fn preflight_failure_is_not_retryable() {
        let simulation: RpcSimulateTransactionResult = serde_json::from_value(
            serde_json::json!({ "err": null, "logs": ["Program log: insufficient funds"] }),
        )
        .unwrap();
        let err: ClientError = RpcError::RpcResponseError {
            code: -32002,
            message: "Transaction simulation failed".to_string(),
            data: RpcResponseErrorData::SendTransactionPreflightFailure(simulation),
        }
        .into();

        let mapped = GatewayError::from(err);
        assert!(matches!(mapped, GatewayError::PreflightRejected(ref reason) if reason.contains("insufficient funds")));
        assert!(!mapped.is_retryable());
    }

    #[test]
    fn generic_rpc_failure_is_transport() {
        let err: ClientError = RpcError::ForUser("node is behind".to_string()).into();
        let mapped = GatewayError::from(err);
        assert!(mapped.is_retryable());
    }
}
