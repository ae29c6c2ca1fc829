//! 由 token mint 解析出 Raydium AMM v4 池子的 PoolKeys。

pub mod error;

use std::sync::Arc;

use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use crate::api::{PairIndex, PairRecord};
use crate::config::PairIndexConfig;
use crate::instructions::raydium::{
    OPENBOOK_PROGRAM_ID, PoolKeys, RAYDIUM_AMM_V4_PROGRAM_ID, decode_amm_info,
    decode_market_state, derive_pool_keys,
};
use crate::monitoring::events;
use crate::rpc::AccountSource;

pub use error::ResolutionError;

/// 每次解析都重新查询索引与链上账户，不缓存。
#[derive(Clone)]
pub struct PoolStateResolver {
    pairs: Arc<dyn PairIndex>,
    accounts: Arc<dyn AccountSource>,
    chain_id: String,
    dex_ids: Vec<String>,
}

impl PoolStateResolver {
    pub fn new(
        pairs: Arc<dyn PairIndex>,
        accounts: Arc<dyn AccountSource>,
        config: &PairIndexConfig,
    ) -> Self {
        Self {
            pairs,
            accounts,
            chain_id: config.chain_id.clone(),
            dex_ids: config
                .dex_ids
                .iter()
                .map(|id| id.trim().to_ascii_lowercase())
                .filter(|id| !id.is_empty())
                .collect(),
        }
    }

    pub async fn resolve(&self, mint: &Pubkey, quote: &Pubkey) -> Result<PoolKeys, ResolutionError> {
        let result = self.resolve_inner(mint, quote).await;
        match &result {
            Ok(keys) => events::pool_resolved(mint, &keys.id, "raydium"),
            Err(err) => events::pool_resolution_failed(mint, &err.to_string()),
        }
        result
    }

    async fn resolve_inner(
        &self,
        mint: &Pubkey,
        quote: &Pubkey,
    ) -> Result<PoolKeys, ResolutionError> {
        let records = self.pairs.token_pairs(mint).await?;
        let candidate = self
            .first_match(&records, mint, quote)
            .ok_or(ResolutionError::NoPoolFound {
                mint: *mint,
                quote: *quote,
            })?;
        let pool = candidate.pair_address;
        debug!(
            target: "resolver",
            mint = %mint,
            pool = %pool,
            dex_id = %candidate.dex_id,
            candidates = records.len(),
            "选中候选池子"
        );

        let pool_account = self
            .accounts
            .fetch_account(&pool)
            .await?
            .ok_or(ResolutionError::PoolAccountMissing(pool))?;
        if pool_account.owner != RAYDIUM_AMM_V4_PROGRAM_ID {
            return Err(ResolutionError::MalformedPoolState {
                pool,
                reason: format!("owner {} 不是 Raydium AMM v4", pool_account.owner),
            });
        }
        let amm = decode_amm_info(&pool, &pool_account.data).map_err(|err| {
            ResolutionError::MalformedPoolState {
                pool,
                reason: err.to_string(),
            }
        })?;
        if amm.market_program_id != OPENBOOK_PROGRAM_ID {
            debug!(
                target: "resolver",
                pool = %pool,
                market_program = %amm.market_program_id,
                "池子使用非默认市场程序"
            );
        }

        let market_account = self
            .accounts
            .fetch_account(&amm.market_id)
            .await?
            .ok_or(ResolutionError::MarketAccountMissing(amm.market_id))?;
        if market_account.owner != amm.market_program_id {
            return Err(ResolutionError::MalformedMarketState {
                market: amm.market_id,
                reason: format!(
                    "owner {} 与池子记录的市场程序 {} 不一致",
                    market_account.owner, amm.market_program_id
                ),
            });
        }
        let market = decode_market_state(&amm.market_id, &market_account.data).map_err(|err| {
            ResolutionError::MalformedMarketState {
                market: amm.market_id,
                reason: err.to_string(),
            }
        })?;

        let keys = derive_pool_keys(pool, &amm, &market).map_err(|err| {
            ResolutionError::MalformedPoolState {
                pool,
                reason: err.to_string(),
            }
        })?;
        if !keys.pairs(mint, quote) {
            return Err(ResolutionError::MalformedPoolState {
                pool,
                reason: format!(
                    "链上 mint {}/{} 与索引记录 {mint}/{quote} 不一致",
                    keys.base_mint, keys.quote_mint
                ),
            });
        }
        Ok(keys)
    }

    /// 第一个满足链、dex 与报价资产条件的交易对，不按流动性排序。
    fn first_match<'a>(
        &self,
        records: &'a [PairRecord],
        mint: &Pubkey,
        quote: &Pubkey,
    ) -> Option<&'a PairRecord> {
        records.iter().find(|record| {
            record.chain_id == self.chain_id
                && (self.dex_ids.is_empty()
                    || self
                        .dex_ids
                        .iter()
                        .any(|id| id.eq_ignore_ascii_case(&record.dex_id)))
                && record.quotes(mint, quote)
        })
    }
}


#[cfg(test)]
mod tests {
    use solana_sdk::account::Account;

    use super::mock::{StaticPairIndex, raydium_pair};
    use super::*;
    use crate::instructions::raydium::layout::fixtures::{
        amm_info_bytes, market_state_bytes, sample_amm_info, sample_market_state,
    };
    use crate::instructions::wsol::WSOL_MINT;
    use crate::rpc::mock::MockChain;

    fn account(owner: Pubkey, data: Vec<u8>) -> Account {
        Account {
            lamports: 1_000_000,
            data,
            owner,
            executable: false,
            rent_epoch: 0,
        }
    }

    struct Fixture {
        chain: Arc<MockChain>,
        mint: Pubkey,
        pool: Pubkey,
        market: Pubkey,
    }

    fn seeded_chain() -> Fixture {
        let chain = Arc::new(MockChain::new());
        let (mint, pool, market) = (
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
        );
        let amm = sample_amm_info(mint, WSOL_MINT, market);
        let state = sample_market_state(market, mint, WSOL_MINT);
        chain.insert_account(pool, account(RAYDIUM_AMM_V4_PROGRAM_ID, amm_info_bytes(&amm)));
        chain.insert_account(market, account(OPENBOOK_PROGRAM_ID, market_state_bytes(&state)));
        Fixture {
            chain,
            mint,
            pool,
            market,
        }
    }

    fn resolver(index: Arc<StaticPairIndex>, chain: Arc<MockChain>) -> PoolStateResolver {
        PoolStateResolver::new(index, chain, &PairIndexConfig::default())
    }

    #[tokio::test]
    async fn resolves_first_matching_raydium_pair() {
        let fx = seeded_chain();
        let index = Arc::new(StaticPairIndex::new(vec![
            PairRecord {
                dex_id: "orca".to_string(),
                ..raydium_pair(Pubkey::new_unique(), fx.mint, WSOL_MINT)
            },
            raydium_pair(Pubkey::new_unique(), fx.mint, Pubkey::new_unique()),
            raydium_pair(fx.pool, fx.mint, WSOL_MINT),
            raydium_pair(Pubkey::new_unique(), fx.mint, WSOL_MINT),
        ]));

        let keys = resolver(index.clone(), fx.chain.clone())
            .resolve(&fx.mint, &WSOL_MINT)
            .await
            .expect("resolve");

        assert_eq!(keys.id, fx.pool);
        assert_eq!(keys.market_id, fx.market);
        assert_eq!(index.calls(), 1);
        assert_eq!(fx.chain.calls().account_fetches, 2);
    }

    #[tokio::test]
    async fn no_matching_pair_is_no_pool_found_without_chain_reads() {
        let fx = seeded_chain();
        let index = Arc::new(StaticPairIndex::new(vec![raydium_pair(
            fx.pool,
            fx.mint,
            Pubkey::new_unique(),
        )]));

        let err = resolver(index, fx.chain.clone())
            .resolve(&fx.mint, &WSOL_MINT)
            .await
            .unwrap_err();
        assert!(matches!(err, ResolutionError::NoPoolFound { .. }));
        assert_eq!(fx.chain.calls().account_fetches, 0);
    }

    #[tokio::test]
    async fn missing_pool_account_is_reported() {
        let fx = seeded_chain();
        let absent = Pubkey::new_unique();
        let index = Arc::new(StaticPairIndex::new(vec![raydium_pair(
            absent, fx.mint, WSOL_MINT,
        )]));
        let err = resolver(index, fx.chain)
            .resolve(&fx.mint, &WSOL_MINT)
            .await
            .unwrap_err();
        assert!(matches!(err, ResolutionError::PoolAccountMissing(pool) if pool == absent));
    }

    #[tokio::test]
    async fn foreign_owner_or_truncated_data_is_malformed() {
        let fx = seeded_chain();
        let foreign = Pubkey::new_unique();
        fx.chain
            .insert_account(foreign, account(Pubkey::new_unique(), vec![0; 752]));
        let truncated = Pubkey::new_unique();
        fx.chain
            .insert_account(truncated, account(RAYDIUM_AMM_V4_PROGRAM_ID, vec![1; 100]));

        for pool in [foreign, truncated] {
            let index = Arc::new(StaticPairIndex::new(vec![raydium_pair(
                pool, fx.mint, WSOL_MINT,
            )]));
            let err = resolver(index, fx.chain.clone())
                .resolve(&fx.mint, &WSOL_MINT)
                .await
                .unwrap_err();
            assert!(matches!(err, ResolutionError::MalformedPoolState { .. }), "{err}");
        }
    }

    #[tokio::test]
    async fn missing_market_is_reported() {
        let chain = Arc::new(MockChain::new());
        let (mint, pool, market) = (
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
        );
        let amm = sample_amm_info(mint, WSOL_MINT, market);
        chain.insert_account(pool, account(RAYDIUM_AMM_V4_PROGRAM_ID, amm_info_bytes(&amm)));
        let index = Arc::new(StaticPairIndex::new(vec![raydium_pair(pool, mint, WSOL_MINT)]));

        let err = resolver(index, chain)
            .resolve(&mint, &WSOL_MINT)
            .await
            .unwrap_err();
        assert!(matches!(err, ResolutionError::MarketAccountMissing(id) if id == market));
    }

    #[tokio::test]
    async fn pair_index_failure_propagates() {
        let fx = seeded_chain();
        let index = Arc::new(StaticPairIndex::failing("bad gateway"));
        let err = resolver(index, fx.chain)
            .resolve(&fx.mint, &WSOL_MINT)
            .await
            .unwrap_err();
        assert!(matches!(err, ResolutionError::PairIndex(_)));
    }
}
