//! Pane CLI - render device display markup

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::{condition, render, templates};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match &cli.command {
        cli::Commands::Render(args) => render::execute(args, &cli.global),
        cli::Commands::Templates(args) => templates::execute(args, &cli.global),
        cli::Commands::Condition(args) => condition::execute(args, &cli.global),
    }
}

/// `RUST_LOG` wins over `--verbose`
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}
