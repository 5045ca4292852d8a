mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use graphrag::config::GraphConfig;
use graphrag::service::GraphRagService;

/// We need an async main function for the async code
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with stderr output so stdout stays clean for results
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = cli::Cli::parse();

    let mut config = match &cli.config {
        Some(path) => GraphConfig::load_from_file(path)?,
        None => GraphConfig::default(),
    };
    if let Some(db_path) = &cli.db {
        config.db_path = db_path.clone();
    }
    if let cli::Commands::Extract {
        no_semantic: true, ..
    } = &cli.command
    {
        config.enable_semantic_extraction = false;
    }

    let service = GraphRagService::new(config)?;

    match cli.command {
        cli::Commands::Extract { input, .. } => commands::extract::run(&service, &input).await?,
        cli::Commands::Query {
            query,
            max_depth,
            top_k,
            format,
        } => commands::query::run(&service, &query, max_depth, top_k, format).await?,
        cli::Commands::Stats { format } => commands::stats::run(&service, format)?,
        cli::Commands::Entity { id } => commands::entity::run(&service, &id)?,
        cli::Commands::Health => commands::health::run(&service)?,
    }

    Ok(())
}
