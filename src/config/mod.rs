pub mod loader;
pub mod types;
pub mod wallet;

pub use loader::*;
pub use types::*;

use self::types as cfg;

pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn default_logging_level() -> String {
    "info".to_string()
}

pub(crate) fn default_timezone_offset_hours() -> i8 {
    0
}

pub(crate) fn default_compute_unit_price() -> u64 {
    421_197
}

pub(crate) fn default_compute_unit_limit() -> u32 {
    101_337
}

pub(crate) fn default_max_attempts() -> u32 {
    3
}

pub(crate) fn default_retry_delay_ms() -> u64 {
    500
}

pub(crate) fn default_confirm_poll_interval_ms() -> u64 {
    500
}

pub(crate) fn default_max_poll_failures() -> u32 {
    20
}

pub(crate) fn default_dexscreener_url() -> String {
    "https://api.dexscreener.com".to_string()
}

pub(crate) fn default_jupiter_price_url() -> String {
    "https://lite-api.jup.ag/price/v2".to_string()
}

pub(crate) fn default_chain_id() -> String {
    "solana".to_string()
}

pub(crate) fn default_dex_ids() -> Vec<String> {
    vec!["raydium".to_string()]
}

pub(crate) fn default_http_timeout_ms() -> u64 {
    5_000
}

pub(crate) fn default_prometheus_listen() -> String {
    "0.0.0.0:9898".to_string()
}

impl Default for cfg::AppConfig {
    fn default() -> Self {
        Self {
            global: cfg::GlobalConfig::default(),
            trade: cfg::TradeConfig::default(),
            submission: cfg::SubmissionConfig::default(),
            pair_index: cfg::PairIndexConfig::default(),
            oracle: cfg::OracleConfig::default(),
            bot: cfg::BotConfig::default(),
        }
    }
}

impl Default for cfg::GlobalConfig {
    fn default() -> Self {
        Self {
            rpc_url: String::new(),
            commitment: cfg::CommitmentSetting::default(),
            wallet: cfg::WalletConfig::default(),
            logging: cfg::LoggingConfig::default(),
        }
    }
}

impl Default for cfg::LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_logging_level(),
            json: false,
            timezone_offset_hours: default_timezone_offset_hours(),
        }
    }
}

impl Default for cfg::TradeConfig {
    fn default() -> Self {
        Self {
            quote_asset: cfg::QuoteAssetKind::default(),
            compute_unit_price_micro_lamports: default_compute_unit_price(),
            compute_unit_limit: default_compute_unit_limit(),
            min_amount_out: cfg::MinAmountOut::default(),
        }
    }
}

impl Default for cfg::SubmissionConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            confirm_poll_interval_ms: default_confirm_poll_interval_ms(),
            max_poll_failures: default_max_poll_failures(),
            blockhash_policy: cfg::BlockhashPolicy::default(),
            skip_preflight: cfg::PreflightConfig::default(),
        }
    }
}

impl Default for cfg::PreflightConfig {
    fn default() -> Self {
        Self {
            wrap: false,
            unwrap: false,
            sell: default_true(),
        }
    }
}

impl Default for cfg::PairIndexConfig {
    fn default() -> Self {
        Self {
            base_url: default_dexscreener_url(),
            chain_id: default_chain_id(),
            dex_ids: default_dex_ids(),
            timeout_ms: default_http_timeout_ms(),
        }
    }
}

impl Default for cfg::OracleConfig {
    fn default() -> Self {
        Self {
            jupiter_price_url: default_jupiter_price_url(),
            jupiter_api_key: None,
            timeout_ms: default_http_timeout_ms(),
        }
    }
}

impl Default for cfg::PrometheusConfig {
    fn default() -> Self {
        Self {
            enable: false,
            listen: default_prometheus_listen(),
        }
    }
}
