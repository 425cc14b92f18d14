//! Binary crate for the `weather` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Loading `.env` and the optional config file
//! - Human-friendly output formatting

use clap::Parser;
use std::io;
use tracing_subscriber::EnvFilter;

mod cli;
mod display;

fn init_tracing() {
    // RUST_LOG=debug shows cache decisions.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
