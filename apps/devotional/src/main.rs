mod cli;
mod commands;
mod config;
mod entries;
mod errors;
mod generation;
mod llm_client;
mod models;
mod passages;
mod storage;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Cli, Commands};
use crate::errors::PipelineError;

#[tokio::main]
async fn main() {
    // .env is optional; real environment variables win
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        let code = e
            .downcast_ref::<PipelineError>()
            .map(PipelineError::code)
            .unwrap_or("ERROR");
        error!(code, "{e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    info!("devotional v{}", env!("CARGO_PKG_VERSION"));
    let paths = cli.paths();

    match cli.command {
        Commands::Generate { count } => commands::generate(&paths, count).await,
        Commands::Publish => commands::publish(&paths),
        Commands::Backfill => commands::backfill_registry(&paths),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), level))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
