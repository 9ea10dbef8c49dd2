//! RagRoot CLI
//!
//! Grounded question answering over your knowledge base, with corrective
//! web-search fallback and an optional self-correcting agent mode.

use anyhow::Result;
use clap::Parser;
use ragroot_core::{Agent, Config, HttpCompletionClient, HttpEvidenceStore, HttpWebSearch};
use std::sync::Arc;

mod app;
mod commands;

use app::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    // Load config (use RAGROOT_CONFIG env var if set, otherwise the default path)
    let config = match std::env::var("RAGROOT_CONFIG") {
        Ok(path) => Config::load_from(std::path::Path::new(&path))?,
        Err(_) => Config::load()?,
    };

    match cli.command {
        Commands::Ask(args) => {
            let agent = build_agent(&config)?;
            commands::ask::run(args, agent, &config.retrieval, cli.format, cli.verbose).await
        }
        Commands::Agent(args) => {
            let agent = build_agent(&config)?;
            commands::agent::run(args, agent, &config.retrieval, cli.format, cli.verbose).await
        }
        Commands::Chunk(args) => commands::chunk::run(args, cli.format),
    }
}

fn build_agent(config: &Config) -> Result<Agent> {
    let completion = HttpCompletionClient::new(config.completion.clone())?;
    let store = HttpEvidenceStore::new(config.store.clone())?;
    let web = HttpWebSearch::new(config.web_search.clone())?;

    Ok(
        Agent::new(Arc::new(completion), Arc::new(store), Arc::new(web))
            .with_web_max_results(config.web_search.max_results),
    )
}
