mod cli;
mod commands;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use veil_cache::MemoryCache;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    // One memoization layer per process, shared by every subcommand.
    let cache = Arc::new(MemoryCache::new());

    match cli.command {
        cli::Commands::Redact {
            file,
            no_preserve_context,
            whitelist,
            blacklist,
        } => {
            commands::redact::handle(file, no_preserve_context, whitelist, blacklist, cache).await
        }
        cli::Commands::Verify { kind, items, file } => {
            commands::verify::handle(kind, items, file, cache).await
        }
    }
}
