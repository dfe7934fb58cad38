//! Autopsy CLI - Money leak forensics for transaction histories
//!
//! Usage:
//!   autopsy analyze transactions.json     Print the health report
//!   autopsy analyze tx.csv --format json  Report as JSON
//!   autopsy detectors                     List detectors
//!   autopsy config                        Show resolved configuration

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Analyze { file, now, format } => {
            commands::cmd_analyze(&file, now.as_deref(), &format, config)
        }
        Commands::Detectors => commands::cmd_detectors(config),
        Commands::Config { path } => commands::cmd_config(config, path),
    }
}
