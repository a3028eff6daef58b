// sieve/src/main.rs

mod cli;
mod commands;

use clap::Parser;

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Setup Logging (Tracing)
    // RUST_LOG=debug sieve run ... pour voir les détails
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        // --- USE CASE: VALIDATION RUN ---
        Commands::Run(args) => commands::run::execute(args).await?,

        // --- USE CASE: FILE CHECKS ---
        Commands::CheckFile {
            config,
            path,
            check,
        } => commands::check_file::execute(config, path, check)?,

        // --- USE CASE: REGISTRY ---
        Commands::Expectations { category } => commands::expectations::execute(category)?,
    }

    Ok(())
}
