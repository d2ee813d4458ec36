//! Binary crate for the `forecast` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Logging setup
//! - Human-friendly output formatting

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod cli;

fn setup_logging(verbose: bool) {
    let default = if verbose { "forecast=debug" } else { "forecast=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    setup_logging(cmd.verbose);
    cmd.run().await
}
