use solana_sdk::signature::Keypair;
use zeroize::Zeroizing;

use super::{ConfigError, WalletConfig};

/// 从配置解析钱包私钥；中间字节缓冲在离开作用域时清零。
pub fn load_keypair(wallet: &WalletConfig) -> Result<Keypair, ConfigError> {
    let raw = Zeroizing::new(wallet.private_key.trim().to_string());
    if raw.is_empty() {
        return Err(ConfigError::Invalid("私钥为空".to_string()));
    }
    parse_keypair_string(raw.as_str())
        .map_err(|err| ConfigError::Invalid(format!("私钥格式非法: {err}")))
}

/// 支持三种格式：JSON 字节数组、逗号分隔字节、base58 字符串。
pub fn parse_keypair_string(raw: &str) -> Result<Keypair, anyhow::Error> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        anyhow::bail!("keypair string empty");
    }

    let bytes: Zeroizing<Vec<u8>> = if trimmed.starts_with('[') {
        Zeroizing::new(serde_json::from_str(trimmed)?)
    } else if trimmed.contains(',') {
        Zeroizing::new(
            trimmed
                .split(',')
                .map(|part| part.trim())
                .filter(|part| !part.is_empty())
                .map(|part| part.parse::<u8>())
                .collect::<Result<Vec<_>, _>>()?,
        )
    } else {
        Zeroizing::new(bs58::decode(trimmed).into_vec()?)
    };
    Ok(Keypair::try_from(bytes.as_slice())?)
}

#[cfg(test)]
mod tests {
    use solana_sdk::signature::Signer;

    use super::*;

    #[test]
    fn parses_all_supported_encodings() {
        let keypair = Keypair::new();
        let bytes = keypair.to_bytes();

        let json = serde_json::to_string(&bytes.to_vec()).unwrap();
        assert_eq!(parse_keypair_string(&json).unwrap().pubkey(), keypair.pubkey());

        let csv = bytes
            .iter()
            .map(|b| b.to_string())
            .collect::<Vec<_>>()
            .join(",");
        assert_eq!(parse_keypair_string(&csv).unwrap().pubkey(), keypair.pubkey());

        let b58 = bs58::encode(bytes).into_string();
        assert_eq!(parse_keypair_string(&b58).unwrap().pubkey(), keypair.pubkey());
    }

    #[test]
    fn rejects_garbage_without_echoing_it() {
        let wallet = WalletConfig {
            private_key: "0OIl-not-base58".to_string(),
        };
        let err = load_keypair(&wallet).unwrap_err();
        assert!(!err.to_string().contains("0OIl-not-base58"));
    }
}
