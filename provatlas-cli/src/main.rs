//! ProvAtlas CLI - boundary pipeline and tile tooling.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use error::CliError;

/// Province boundary pipeline and PBF tile tooling.
#[derive(Debug, Parser)]
#[command(name = "provatlas", version, about)]
struct Cli {
    /// Path to a provatlas.toml configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Download the upstream world boundary datasets
    Fetch(commands::fetch::FetchArgs),
    /// Split a world dataset into per-country boundary files
    Split(commands::split::SplitArgs),
    /// Build simplified boundaries and PBF tile trees for all levels
    Tiles(commands::tiles::TilesArgs),
    /// Query features in a bounding box through the tile loader
    Query(commands::query::QueryArgs),
    /// Summarize a boundary file or a PBF tile
    Inspect(commands::inspect::InspectArgs),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Fetch(args) => commands::fetch::run(args, cli.config.as_deref()),
        Command::Split(args) => commands::split::run(args, cli.config.as_deref()),
        Command::Tiles(args) => commands::tiles::run(args, cli.config.as_deref()),
        Command::Query(args) => commands::query::run(args, cli.config.as_deref()),
        Command::Inspect(args) => commands::inspect::run(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn report_error(error: &CliError) {
    eprintln!("error: {}", error);
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("  caused by: {}", cause);
        source = cause.source();
    }
}
