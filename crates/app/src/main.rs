use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod export;
mod interrupt;
mod ocr_fill;
mod query;
mod scan;
mod writer;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Command::Scan(args) => scan::run(args).await,
        Command::Query(args) => query::run(args).await,
        Command::Ocr(args) => ocr_fill::run(args).await,
        Command::ExportJson(args) => export::run(args),
    }
}
