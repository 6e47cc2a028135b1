pub mod ai;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod naming;
pub mod safety;

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub use error::{Error, ExtractError, Result};

pub fn run() -> anyhow::Result<()> {
    // Load .env from the working directory if there is one
    let _ = dotenvy::dotenv();

    // Default: warn for dependencies, info for this crate
    // Use RUST_LOG=debug for per-detector and per-extractor decisions
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,rename_with_llm=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(cli::execute(cli))
}
