use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use url::Url;

use super::AppConfig;

pub const DEFAULT_CONFIG_PATHS: &[&str] = &["raydium-exit.yaml", "config/raydium-exit.yaml"];

pub const ENV_RPC_URL: &str = "RAYDIUM_EXIT_RPC_URL";
pub const ENV_PRIVATE_KEY: &str = "RAYDIUM_EXIT_PRIVATE_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("配置缺失或非法: {0}")]
    Invalid(String),
}

/// 加载配置：显式路径优先，否则依次尝试默认路径；都不存在时使用默认值。
/// 环境变量覆盖在文件之后应用，最后统一校验。
pub fn load_config(path: Option<PathBuf>) -> Result<AppConfig, ConfigError> {
    let explicit = path.is_some();
    let candidate_paths = match path {
        Some(p) => vec![p],
        None => DEFAULT_CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .collect::<Vec<PathBuf>>(),
    };

    let mut loaded = None;
    for candidate in &candidate_paths {
        if let Some(config) = try_load_file(candidate)? {
            loaded = Some(config);
            break;
        }
    }

    let mut config = match loaded {
        Some(config) => config,
        None if explicit => {
            return Err(ConfigError::Invalid(format!(
                "配置文件不存在: {}",
                candidate_paths[0].display()
            )));
        }
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut config)?;
    validate(&config)?;
    Ok(config)
}

fn try_load_file(path: &Path) -> Result<Option<AppConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let config: AppConfig =
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(Some(config))
}

fn apply_env_overrides(config: &mut AppConfig) -> Result<(), ConfigError> {
    if let Some(url) = read_env(ENV_RPC_URL)? {
        config.global.rpc_url = url;
    }
    if let Some(key) = read_env(ENV_PRIVATE_KEY)? {
        config.global.wallet.private_key = key;
    }
    Ok(())
}

fn read_env(var: &str) -> Result<Option<String>, ConfigError> {
    match env::var(var) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value.trim().to_string())),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(ConfigError::Invalid(format!("读取 {var} 失败: {err}"))),
    }
}

pub fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    let rpc_url = config.global.rpc_url().ok_or_else(|| {
        ConfigError::Invalid(format!(
            "缺少 RPC 地址，请配置 global.rpc_url 或环境变量 {ENV_RPC_URL}"
        ))
    })?;
    ensure_url("global.rpc_url", rpc_url)?;
    ensure_url("pair_index.base_url", &config.pair_index.base_url)?;
    ensure_url("oracle.jupiter_price_url", &config.oracle.jupiter_price_url)?;

    if config.global.wallet.private_key.trim().is_empty() {
        return Err(ConfigError::Invalid(format!(
            "缺少私钥配置，请提供 global.wallet.private_key 或环境变量 {ENV_PRIVATE_KEY}"
        )));
    }
    if config.trade.compute_unit_limit == 0 {
        return Err(ConfigError::Invalid(
            "trade.compute_unit_limit 必须大于 0".to_string(),
        ));
    }
    if config.submission.max_attempts == 0 {
        return Err(ConfigError::Invalid(
            "submission.max_attempts 必须至少为 1".to_string(),
        ));
    }
    if config.submission.max_poll_failures == 0 {
        return Err(ConfigError::Invalid(
            "submission.max_poll_failures 必须至少为 1".to_string(),
        ));
    }
    Ok(())
}

fn ensure_url(field: &str, value: &str) -> Result<(), ConfigError> {
    Url::parse(value.trim())
        .map(|_| ())
        .map_err(|err| ConfigError::Invalid(format!("{field} 不是合法 URL ({value}): {err}")))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::config::{BlockhashPolicy, MinAmountOut, QuoteAssetKind};

    const SAMPLE: &str = r#"
global:
  rpc_url: http://localhost:8899
  wallet:
    private_key: "[1,2,3]"
trade:
  quote_asset: usdc
  min_amount_out:
    fixed: 10
submission:
  max_attempts: 5
  blockhash_policy: reuse_across_attempts
  skip_preflight:
    sell: false
"#;

    #[test]
    fn loads_explicit_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(SAMPLE.as_bytes()).expect("write config");

        let config = try_load_file(file.path())
            .expect("load")
            .expect("file exists");
        assert_eq!(config.global.rpc_url(), Some("http://localhost:8899"));
        assert_eq!(config.trade.quote_asset, QuoteAssetKind::Usdc);
        assert_eq!(config.trade.min_amount_out, MinAmountOut::Fixed(10));
        assert_eq!(config.submission.max_attempts, 5);
        assert_eq!(
            config.submission.blockhash_policy,
            BlockhashPolicy::ReuseAcrossAttempts
        );
        assert!(!config.submission.skip_preflight.sell);
        assert!(!config.submission.skip_preflight.wrap);
        assert_eq!(config.submission.retry_delay_ms, 500);
        validate(&config).expect("valid config");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = load_config(Some(dir.path().join("absent.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_yaml_reports_path() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"global: [unterminated").expect("write config");
        let err = try_load_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn validate_rejects_missing_wallet_and_zero_attempts() {
        let mut config = AppConfig::default();
        config.global.rpc_url = "http://localhost:8899".to_string();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("私钥"));

        config.global.wallet.private_key = "key".to_string();
        config.submission.max_attempts = 0;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("max_attempts"));

        config.submission.max_attempts = 3;
        config.submission.max_poll_failures = 0;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("max_poll_failures"));
    }

    #[test]
    fn validate_rejects_bad_rpc_url() {
        let mut config = AppConfig::default();
        config.global.rpc_url = "not a url".to_string();
        config.global.wallet.private_key = "key".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::Invalid(_))));
    }
}
