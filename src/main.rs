use anyhow::Result;
use clap::Parser;

mod api;
mod cache;
mod cli;
mod config;
mod engine;
mod instructions;
mod lander;
mod monitoring;
mod oracle;
mod resolver;
mod rpc;

use cli::args::Cli;
use cli::context::{init_tracing, load_configuration};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_configuration(cli.config.clone())?;
    init_tracing(&config.global.logging)?;
    cli::run(cli, config).await
}
