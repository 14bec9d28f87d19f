//! Keel CLI - apply and roll back numbered SQL migrations

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::{down, new, status, up};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match &cli.command {
        cli::Commands::Status(args) => status::execute(args, &cli.global),
        cli::Commands::Up(args) => up::execute(args, &cli.global),
        cli::Commands::Down(args) => down::execute(args, &cli.global),
        cli::Commands::New(args) => new::execute(args, &cli.global),
    }
}

/// `RUST_LOG` wins unless `--verbose` asks for debug output.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let env = env_logger::Env::default().default_filter_or(default_filter);
    let mut builder = env_logger::Builder::from_env(env);
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).format_target(false).init();
}
