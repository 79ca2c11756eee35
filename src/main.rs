// src/main.rs

//! gorun
//!
//! Entry point for the gorun CLI.
//!
//! gorun launches `go run <file>` or `go test -v -run <pattern>` with the
//! Apollo config-service settings (server URL, cluster, app id, access key)
//! and the service registry exported as environment variables, and relays
//! the child's output to the terminal as it is produced.
//!
//! Responsibilities of this file:
//! - Load `.env` and initialise logging
//! - Parse CLI arguments
//! - Hand off execution to the runner

mod cli;
mod config;
mod env;
mod error;
mod launch;
mod relay;
mod runner;
mod settings;
mod util;

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Program entry point.
///
/// Uses Tokio because the child's stdout and stderr are relayed by two
/// tasks running alongside the wait on the child.
#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();

    // `.env` must be loaded before clap reads its environment fallbacks.
    // Variables that are already exported win.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            tracing::warn!(error = %e, "ignoring unreadable .env file");
        }
    }

    let cli = cli::Cli::parse_from(cli::normalize_args(std::env::args_os()));

    runner::run(cli).await
}

/// Diagnostics go to stderr so they never mix with relayed stdout.
/// `RUST_LOG` controls the level; the default only shows warnings.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
