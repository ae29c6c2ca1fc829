use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;
use tracing::info;

use crate::api::{DexScreenerClient, JupiterPriceClient, PairIndex, PriceSource};
use crate::cache::associated_token_address;
use crate::config::{AppConfig, PreflightConfig, QuoteAsset};
use crate::instructions::raydium::PoolKeys;
use crate::instructions::wsol::wsol_account;
use crate::instructions::{FeeDirectives, InstructionBuilder};
use crate::lander::{SubmissionOutcome, SubmissionPolicy, TransactionSubmitter};
use crate::oracle::PriceOracle;
use crate::resolver::PoolStateResolver;
use crate::rpc::{AccountSource, RpcGateway, TransactionGateway, token_balance};

use super::error::EngineResult;
use super::identity::EngineIdentity;

const HTTP_POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// 一条命令的结果。`Noop` 表示没有需要提交的交易。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandReport {
    Noop { reason: String },
    Submitted {
        outcome: SubmissionOutcome,
        price: Option<Decimal>,
    },
}

impl CommandReport {
    pub fn is_success(&self) -> bool {
        match self {
            CommandReport::Noop { .. } => true,
            CommandReport::Submitted { outcome, .. } => outcome.is_confirmed(),
        }
    }
}

pub struct SessionComponents {
    pub identity: EngineIdentity,
    pub quote: QuoteAsset,
    pub builder: InstructionBuilder,
    pub accounts: Arc<dyn AccountSource>,
    pub submitter: TransactionSubmitter,
    pub resolver: PoolStateResolver,
    pub oracle: PriceOracle,
    pub skip_preflight: PreflightConfig,
}

/// 启动时构建一次，持有钱包、计价资产与各组件；命令之间不共享可变状态。
pub struct Session {
    identity: EngineIdentity,
    quote: QuoteAsset,
    builder: InstructionBuilder,
    accounts: Arc<dyn AccountSource>,
    submitter: TransactionSubmitter,
    resolver: PoolStateResolver,
    oracle: PriceOracle,
    skip_preflight: PreflightConfig,
}

impl Session {
    pub fn new(components: SessionComponents) -> Self {
        let SessionComponents {
            identity,
            quote,
            builder,
            accounts,
            submitter,
            resolver,
            oracle,
            skip_preflight,
        } = components;
        Self {
            identity,
            quote,
            builder,
            accounts,
            submitter,
            resolver,
            oracle,
            skip_preflight,
        }
    }

    /// 配置须已通过校验。
    pub fn from_config(config: &AppConfig) -> EngineResult<Self> {
        let identity = EngineIdentity::from_wallet(&config.global.wallet)?;
        let quote = config.trade.quote_asset.asset();
        let rpc_url = config.global.rpc_url().unwrap_or_default();
        let gateway = Arc::new(RpcGateway::new(
            rpc_url,
            config.global.commitment.as_config(),
        ));

        let http = reqwest::Client::builder()
            .pool_idle_timeout(HTTP_POOL_IDLE_TIMEOUT)
            .user_agent(concat!("raydium-exit/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let dexscreener = Arc::new(DexScreenerClient::new(http.clone(), &config.pair_index));
        let jupiter = Arc::new(JupiterPriceClient::new(http, &config.oracle));

        let builder = InstructionBuilder::new(
            identity.pubkey,
            quote,
            FeeDirectives::new(
                config.trade.compute_unit_price_micro_lamports,
                config.trade.compute_unit_limit,
            ),
            config.trade.min_amount_out,
        );
        let accounts: Arc<dyn AccountSource> = gateway.clone();
        let transactions: Arc<dyn TransactionGateway> = gateway.clone();
        let pair_index: Arc<dyn PairIndex> = dexscreener.clone();
        let sources: Vec<Arc<dyn PriceSource>> = vec![jupiter, dexscreener];

        info!(
            target: "engine",
            wallet = %identity.pubkey,
            quote = quote.symbol,
            rpc = %gateway.url(),
            "会话已初始化"
        );

        Ok(Self::new(SessionComponents {
            quote,
            builder,
            accounts: accounts.clone(),
            submitter: TransactionSubmitter::new(
                transactions,
                SubmissionPolicy::from(&config.submission),
            ),
            resolver: PoolStateResolver::new(pair_index, accounts, &config.pair_index),
            oracle: PriceOracle::new(sources),
            skip_preflight: config.submission.skip_preflight,
            identity,
        }))
    }

    pub fn identity(&self) -> &EngineIdentity {
        &self.identity
    }

    pub fn quote(&self) -> &QuoteAsset {
        &self.quote
    }

    /// 包裹 `amount` SOL；WSOL 账户不存在时一并创建。
    pub async fn wrap(&self, amount: Decimal) -> EngineResult<CommandReport> {
        let account = wsol_account(&self.identity.pubkey);
        let exists = self.accounts.fetch_account(&account).await?.is_some();
        let instructions = self.builder.wrap(amount, exists)?;
        let outcome = self
            .submitter
            .submit(
                "wrap",
                &instructions,
                self.identity.signer(),
                self.skip_preflight.wrap,
            )
            .await;
        Ok(CommandReport::Submitted {
            outcome,
            price: None,
        })
    }

    /// 关闭 WSOL 账户取回全部余额；余额为 0 或账户不存在时不提交。
    pub async fn unwrap(&self, amount: Option<Decimal>) -> EngineResult<CommandReport> {
        let account = wsol_account(&self.identity.pubkey);
        let balance = token_balance(self.accounts.as_ref(), &account)
            .await?
            .unwrap_or(0);
        let instructions = self.builder.unwrap(balance, amount)?;
        if instructions.is_empty() {
            return Ok(CommandReport::Noop {
                reason: format!("WSOL 账户 {account} 余额为 0"),
            });
        }
        let outcome = self
            .submitter
            .submit(
                "unwrap",
                &instructions,
                self.identity.signer(),
                self.skip_preflight.unwrap,
            )
            .await;
        Ok(CommandReport::Submitted {
            outcome,
            price: None,
        })
    }

    /// 以全部余额卖出 `mint` 换取计价资产，成交后查询价格用于展示。
    pub async fn sell(&self, mint: &Pubkey) -> EngineResult<CommandReport> {
        let keys = self.resolver.resolve(mint, &self.quote.mint).await?;
        let account = associated_token_address(&self.identity.pubkey, mint);
        let balance = token_balance(self.accounts.as_ref(), &account)
            .await?
            .unwrap_or(0);
        if balance == 0 {
            return Ok(CommandReport::Noop {
                reason: format!("{mint} 余额为 0，无需卖出"),
            });
        }

        let instructions = self.builder.swap_sell(&keys, mint, balance)?;
        info!(
            target: "engine",
            mint = %mint,
            pool = %keys.id,
            amount_in = balance,
            "准备卖出"
        );
        let outcome = self
            .submitter
            .submit(
                "sell",
                &instructions,
                self.identity.signer(),
                self.skip_preflight.sell,
            )
            .await;
        let price = self.oracle.quote(mint).await;
        Ok(CommandReport::Submitted { outcome, price })
    }

    /// 只读：解析并返回池子账户集合，不提交交易。
    pub async fn inspect_pool(&self, mint: &Pubkey) -> EngineResult<PoolKeys> {
        Ok(self.resolver.resolve(mint, &self.quote.mint).await?)
    }

    pub async fn price(&self, mint: &Pubkey) -> Option<Decimal> {
        self.oracle.quote(mint).await
    }
}
