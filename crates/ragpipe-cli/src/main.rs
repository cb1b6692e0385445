//! Ragpipe CLI
//!
//! Grounded question answering over a pre-built vector index.

use anyhow::Result;
use clap::Parser;
use ragpipe_core::{Config, RagError};

mod app;
mod commands;
mod output;

use app::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_level.into()),
        )
        .init();

    let config = Config::load()?;

    let result = match cli.command {
        Commands::Ask { question } => commands::ask::run(&question, &config, cli.format).await,
        Commands::Chat => commands::chat::run(&config, cli.format).await,
        Commands::Config => commands::config::run(&config),
    };

    if let Err(e) = result {
        if let Some(rag_err) = e.downcast_ref::<RagError>() {
            eprintln!("Error: {}", rag_err);
            std::process::exit(rag_err.exit_code());
        }
        return Err(e);
    }

    Ok(())
}
