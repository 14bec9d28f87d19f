//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};

/// Keel - numbered SQL migrations with a transactional log
#[derive(Parser, Debug)]
#[command(name = "keel")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show every migration and whether it is applied
    Status(StatusArgs),

    /// Apply all pending migrations in id order
    Up(UpArgs),

    /// Roll back the most recent active migrations
    Down(DownArgs),

    /// Create an empty up/down migration pair
    New(NewArgs),
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the up command
#[derive(Args, Debug)]
pub struct UpArgs {
    /// Apply only this migration id
    #[arg(long)]
    pub only: Option<u64>,
}

/// Arguments for the down command
#[derive(Args, Debug)]
pub struct DownArgs {
    /// Number of active migrations to roll back
    #[arg(short = 'n', long = "count", default_value_t = 1, conflicts_with_all = ["all", "only"])]
    pub count: usize,

    /// Roll back every active migration
    #[arg(long)]
    pub all: bool,

    /// Roll back only this migration id
    #[arg(long, conflicts_with = "all")]
    pub only: Option<u64>,
}

/// Arguments for the new command
#[derive(Args, Debug)]
pub struct NewArgs {
    /// Descriptive migration name (letters, digits, `_` or `-`)
    pub name: String,

    /// Use a YYYYMMDDHHMMSS timestamp instead of the next sequential id
    #[arg(long)]
    pub timestamp: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
