use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;

pub const DEFAULT_AMOUNT: &str = "0.001";

#[derive(Parser, Debug)]
#[command(
    name = "raydium-exit",
    version,
    about = "SOL/WSOL 包裹与 Raydium AMM v4 全额卖出工具"
)]
pub struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        global = true,
        help = "配置文件路径（默认查找 raydium-exit.yaml 或 config/raydium-exit.yaml）"
    )]
    pub config: Option<PathBuf>,

    /// 直接传入 token mint 等价于 `sell <MINT>`
    #[arg(value_name = "MINT")]
    pub mint: Option<Pubkey>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 将 SOL 包裹为 WSOL
    Wrap(AmountArgs),
    /// 关闭 WSOL 账户取回全部 SOL
    Unwrap(AmountArgs),
    /// 在 Raydium AMM v4 上卖出全部 token 余额
    Sell(MintArgs),
    /// 解析并打印池子账户（只读）
    #[command(name = "pool")]
    InspectPool(MintArgs),
    /// 查询 token 当前价格
    Price(MintArgs),
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct AmountArgs {
    #[arg(value_name = "AMOUNT", default_value = DEFAULT_AMOUNT, help = "SOL 数量（十进制）")]
    pub amount: Decimal,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct MintArgs {
    #[arg(value_name = "MINT")]
    pub mint: Pubkey,
}

impl Cli {
    /// 将裸 mint 参数归一为 `sell` 子命令。
    pub fn resolve_command(&self) -> Result<Command> {
        match (&self.command, self.mint) {
            (Some(command), _) => Ok(command.clone()),
            (None, Some(mint)) => Ok(Command::Sell(MintArgs { mint })),
            (None, None) => Err(anyhow!(
                "缺少命令：wrap [AMOUNT] | unwrap [AMOUNT] | sell <MINT> | pool <MINT> | price <MINT> | <MINT>"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    const MINT: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";

    fn parse(args: &[&str]) -> Command {
        let cli = Cli::try_parse_from(std::iter::once("raydium-exit").chain(args.iter().copied()))
            .expect("parse");
        cli.resolve_command().expect("command")
    }

    #[test]
    fn wrap_and_unwrap_default_amount() {
        let default = Decimal::from_str(DEFAULT_AMOUNT).unwrap();
        assert_eq!(parse(&["wrap"]), Command::Wrap(AmountArgs { amount: default }));
        assert_eq!(
            parse(&["unwrap", "0.25"]),
            Command::Unwrap(AmountArgs {
                amount: Decimal::from_str("0.25").unwrap()
            })
        );
    }

    #[test]
    fn bare_mint_means_sell() {
        let mint = Pubkey::from_str(MINT).unwrap();
        assert_eq!(parse(&[MINT]), Command::Sell(MintArgs { mint }));
        assert_eq!(parse(&["sell", MINT]), Command::Sell(MintArgs { mint }));
        assert_eq!(parse(&["pool", MINT]), Command::InspectPool(MintArgs { mint }));
    }

    #[test]
    fn rejects_invalid_amount_and_mint() {
        let bin = "raydium-exit";
        assert!(Cli::try_parse_from([bin, "wrap", "abc"]).is_err());
        assert!(Cli::try_parse_from([bin, "not-a-mint"]).is_err());
        let cli = Cli::try_parse_from([bin]).expect("no args parses");
        assert!(cli.resolve_command().is_err());
    }

    #[test]
    fn config_flag_is_global() {
        for args in [
            ["raydium-exit", "wrap", "--config", "x.yaml"],
            ["raydium-exit", "--config", "x.yaml", "wrap"],
        ] {
            let cli = Cli::try_parse_from(args).unwrap();
            assert_eq!(cli.config, Some(PathBuf::from("x.yaml")));
            assert!(matches!(cli.resolve_command().unwrap(), Command::Wrap(_)));
        }
    }
}
