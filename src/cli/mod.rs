//! Command-line interface using clap for argument parsing.

use clap::{Parser, Subcommand};

/// Rankarr - rating rollups and leaderboards for episodic shows
#[derive(Parser)]
#[command(name = "rankarr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API server (default)
    #[command(alias = "-d", alias = "--daemon")]
    Serve,

    /// Recompute every denormalized summary from the raw rating rows
    Repair,
}
