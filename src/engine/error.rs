use thiserror::Error;

use crate::config::ConfigError;
use crate::instructions::ConstructionError;
use crate::resolver::ResolutionError;
use crate::rpc::GatewayError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("配置缺失或非法: {0}")]
    Config(#[from] ConfigError),
    #[error("池子解析失败: {0}")]
    Resolution(#[from] ResolutionError),
    #[error("指令构建失败: {0}")]
    Construction(#[from] ConstructionError),
    #[error("链上查询失败: {0}")]
    Rpc(#[from] GatewayError),
    #[error("HTTP 客户端初始化失败: {0}")]
    Http(#[from] reqwest::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
