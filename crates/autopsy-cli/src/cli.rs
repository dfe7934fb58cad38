//! CLI argument definitions using clap
//!
//! This module contains the clap structs for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Autopsy - Find the money leaks in a transaction history
#[derive(Parser)]
#[command(name = "autopsy")]
#[command(about = "Forensic financial health report for transaction histories", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Engine config file (defaults to the data-dir override, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a transaction file and print the health report
    Analyze {
        /// JSON (list or {"transactions": [...]}) or CSV file
        file: PathBuf,

        /// Reference instant for time windows (RFC 3339, defaults to now)
        #[arg(long)]
        now: Option<String>,

        /// Output format: text, json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List registered detectors
    Detectors,

    /// Show the resolved engine configuration
    Config {
        /// Print only the override file path
        #[arg(long)]
        path: bool,
    },
}
