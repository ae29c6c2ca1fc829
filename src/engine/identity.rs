use std::fmt;
use std::sync::Arc;

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};

use crate::config::WalletConfig;
use crate::config::wallet::load_keypair;

use super::error::EngineResult;

/// 进程内唯一的钱包身份；初始化后只读。
#[derive(Clone)]
pub struct EngineIdentity {
    pub pubkey: Pubkey,
    signer: Arc<Keypair>,
}

impl fmt::Debug for EngineIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineIdentity")
            .field("pubkey", &self.pubkey)
            .finish_non_exhaustive()
    }
}

impl EngineIdentity {
    pub fn from_wallet(wallet: &WalletConfig) -> EngineResult<Self> {
        let keypair = load_keypair(wallet)?;
        Ok(Self::from_keypair(keypair))
    }

    pub fn from_keypair(keypair: Keypair) -> Self {
        Self {
            pubkey: keypair.pubkey(),
            signer: Arc::new(keypair),
        }
    }

    pub fn signer(&self) -> &Keypair {
        &self.signer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_shows_only_pubkey() {
        let keypair = Keypair::new();
        let secret = keypair.to_base58_string();
        let identity = EngineIdentity::from_keypair(keypair);
        let rendered = format!("{identity:?}");
        assert!(rendered.contains(&identity.pubkey.to_string()));
        assert!(!rendered.contains(&secret));
    }

    #[test]
    fn loads_from_wallet_config() {
        let keypair = Keypair::new();
        let wallet = WalletConfig {
            private_key: keypair.to_base58_string(),
        };
        let identity = EngineIdentity::from_wallet(&wallet).expect("identity");
        assert_eq!(identity.pubkey, keypair.pubkey());
    }
}
