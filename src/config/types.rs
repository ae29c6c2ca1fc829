use std::fmt;

use serde::Deserialize;
use serde::de::{Deserializer, Error as DeError, MapAccess, Visitor};
use solana_commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;

use crate::instructions::wsol::{WSOL_DECIMALS, WSOL_MINT};

pub const USDC_MINT: Pubkey = solana_sdk::pubkey!("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v");
const USDC_DECIMALS: u8 = 6;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub global: GlobalConfig,
    #[serde(default)]
    pub trade: TradeConfig,
    #[serde(default)]
    pub submission: SubmissionConfig,
    #[serde(default)]
    pub pair_index: PairIndexConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub bot: BotConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub rpc_url: String,
    #[serde(default)]
    pub commitment: CommitmentSetting,
    #[serde(default)]
    pub wallet: WalletConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GlobalConfig {
    pub fn rpc_url(&self) -> Option<&str> {
        let trimmed = self.rpc_url.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

#[derive(Clone, Deserialize, Default)]
pub struct WalletConfig {
    #[serde(default)]
    pub private_key: String,
}

impl fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletConfig")
            .field("private_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "super::default_logging_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
    #[serde(default = "super::default_timezone_offset_hours")]
    pub timezone_offset_hours: i8,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CommitmentSetting {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl CommitmentSetting {
    pub fn as_config(self) -> CommitmentConfig {
        match self {
            CommitmentSetting::Processed => CommitmentConfig::processed(),
            CommitmentSetting::Confirmed => CommitmentConfig::confirmed(),
            CommitmentSetting::Finalized => CommitmentConfig::finalized(),
        }
    }
}

/// 计价资产：启动时选定，之后不可变。
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuoteAssetKind {
    #[default]
    Wsol,
    Usdc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteAsset {
    pub symbol: &'static str,
    pub mint: Pubkey,
    pub decimals: u8,
}

impl QuoteAssetKind {
    pub fn asset(self) -> QuoteAsset {
        match self {
            QuoteAssetKind::Wsol => QuoteAsset {
                symbol: "WSOL",
                mint: WSOL_MINT,
                decimals: WSOL_DECIMALS,
            },
            QuoteAssetKind::Usdc => QuoteAsset {
                symbol: "USDC",
                mint: USDC_MINT,
                decimals: USDC_DECIMALS,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TradeConfig {
    #[serde(default)]
    pub quote_asset: QuoteAssetKind,
    #[serde(default = "super::default_compute_unit_price")]
    pub compute_unit_price_micro_lamports: u64,
    #[serde(default = "super::default_compute_unit_limit")]
    pub compute_unit_limit: u32,
    #[serde(default)]
    pub min_amount_out: MinAmountOut,
}

/// 卖出时的最小输出约束。`AcceptAny` 即 min_amount_out = 0，优先保证退出。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MinAmountOut {
    #[default]
    AcceptAny,
    Fixed(u64),
}

impl MinAmountOut {
    pub fn base_units(self) -> u64 {
        match self {
            MinAmountOut::AcceptAny => 0,
            MinAmountOut::Fixed(value) => value,
        }
    }
}

impl<'de> Deserialize<'de> for MinAmountOut {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MinAmountOutVisitor;

        impl<'de> Visitor<'de> for MinAmountOutVisitor {
            type Value = MinAmountOut;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("字符串 \"accept_any\" 或 { fixed: <u64> }")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: DeError,
            {
                match value.trim().to_ascii_lowercase().as_str() {
                    "accept_any" | "any" | "" => Ok(MinAmountOut::AcceptAny),
                    other => Err(E::custom(format!("未知的 min_amount_out 策略: {other}"))),
                }
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut fixed = None;
                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "fixed" => fixed = Some(map.next_value::<u64>()?),
                        other => {
                            return Err(A::Error::custom(format!(
                                "min_amount_out 不支持字段 {other}"
                            )));
                        }
                    }
                }
                fixed
                    .map(MinAmountOut::Fixed)
                    .ok_or_else(|| A::Error::custom("min_amount_out 缺少 fixed 字段"))
            }
        }

        deserializer.deserialize_any(MinAmountOutVisitor)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BlockhashPolicy {
    /// 每次重试都拉取新的 blockhash 并重新签名。
    #[default]
    RefreshPerAttempt,
    /// 只拉取一次 blockhash，重试时重发同一笔已签名交易（签名不变）。
    ReuseAcrossAttempts,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionConfig {
    #[serde(default = "super::default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "super::default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "super::default_confirm_poll_interval_ms")]
    pub confirm_poll_interval_ms: u64,
    /// 确认阶段区块高度连续读取失败的上限，超过即按过期处理。
    #[serde(default = "super::default_max_poll_failures")]
    pub max_poll_failures: u32,
    #[serde(default)]
    pub blockhash_policy: BlockhashPolicy,
    #[serde(default)]
    pub skip_preflight: PreflightConfig,
}

/// 各操作是否跳过 preflight 模拟：wrap/unwrap 保留，sell 跳过。
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PreflightConfig {
    #[serde(default)]
    pub wrap: bool,
    #[serde(default)]
    pub unwrap: bool,
    #[serde(default = "super::default_true")]
    pub sell: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PairIndexConfig {
    #[serde(default = "super::default_dexscreener_url")]
    pub base_url: String,
    #[serde(default = "super::default_chain_id")]
    pub chain_id: String,
    /// 允许的 dexId；为空表示不过滤。
    #[serde(default = "super::default_dex_ids")]
    pub dex_ids: Vec<String>,
    #[serde(default = "super::default_http_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OracleConfig {
    #[serde(default = "super::default_jupiter_price_url")]
    pub jupiter_price_url: String,
    #[serde(default)]
    pub jupiter_api_key: Option<String>,
    #[serde(default = "super::default_http_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct BotConfig {
    #[serde(default)]
    pub prometheus: PrometheusConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrometheusConfig {
    #[serde(default)]
    pub enable: bool,
    #[serde(default = "super::default_prometheus_listen")]
    pub listen: String,
}
