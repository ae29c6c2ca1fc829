use anyhow::{Result, bail};
use tracing::{info, warn};

use crate::cli::args::{Cli, Command};
use crate::cli::context::{build_session, init_metrics};
use crate::config::AppConfig;
use crate::engine::{CommandReport, Session};
use crate::lander::SubmissionOutcome;

/// 执行一条命令；除 `Confirmed` 与无操作外的结果都转为错误，进程以非零码退出。
pub async fn run(cli: Cli, config: AppConfig) -> Result<()> {
    let command = cli.resolve_command()?;
    init_metrics(&config)?;
    let session = build_session(&config)?;
    dispatch(&session, command).await
}

async fn dispatch(session: &Session, command: Command) -> Result<()> {
    match command {
        Command::Wrap(args) => {
            let report = session.wrap(args.amount).await?;
            finish("wrap", &report)
        }
        Command::Unwrap(args) => {
            let report = session.unwrap(Some(args.amount)).await?;
            finish("unwrap", &report)
        }
        Command::Sell(args) => {
            let report = session.sell(&args.mint).await?;
            finish("sell", &report).map_err(|err| err.context(format!("mint {}", args.mint)))
        }
        Command::InspectPool(args) => {
            let keys = session.inspect_pool(&args.mint).await?;
            println!("{keys:#?}");
            Ok(())
        }
        Command::Price(args) => {
            match session.price(&args.mint).await {
                Some(price) => println!("{} {price} USD", args.mint),
                None => bail!("所有价格来源都未返回 {} 的价格", args.mint),
            }
            Ok(())
        }
    }
}

fn finish(operation: &str, report: &CommandReport) -> Result<()> {
    match report {
        CommandReport::Noop { reason } => {
            info!(target: "cli", operation, reason = %reason, "无需提交交易");
            println!("{operation}: 无操作（{reason}）");
            Ok(())
        }
        CommandReport::Submitted { outcome, price } => {
            if let Some(price) = price {
                info!(target: "cli", operation, price = %price, "成交后价格（USD）");
            }
            match outcome {
                SubmissionOutcome::Confirmed(signature) => {
                    println!("{signature}");
                    Ok(())
                }
                SubmissionOutcome::ExecutionFailed(signature, err) => {
                    warn!(target: "cli", operation, signature = %signature, "交易执行失败");
                    bail!("{operation} 交易 {signature} 执行失败: {err}")
                }
                SubmissionOutcome::SubmissionFailed(failure) => {
                    bail!("{operation} 提交失败: {failure}")
                }
            }
        }
    }
}
