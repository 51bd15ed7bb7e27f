//! `provatlas tiles` - simplify boundaries and build PBF tile trees.

use std::path::Path;

use clap::Args;
use indicatif::ProgressBar;
use provatlas::pipeline::{build_tiles, simplify_boundaries, PipelineSummary};

use super::common::{load_config, print_summary};
use crate::error::CliError;

/// Arguments for the tiles command.
#[derive(Debug, Args)]
pub struct TilesArgs {
    /// Only build the named level (overview, detailed or ultra).
    #[arg(long)]
    level: Option<provatlas::coord::DetailLevel>,
}

/// Run the tiles command: simplify then tile, for each configured level.
pub fn run(args: TilesArgs, config_path: Option<&Path>) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let pipeline = &config.pipeline;

    let levels: Vec<_> = pipeline
        .levels
        .iter()
        .filter(|l| args.level.map_or(true, |only| only == l.level))
        .collect();
    if levels.is_empty() {
        return Err(CliError::Other("no matching levels configured".to_string()));
    }

    let source_dir = pipeline.source_boundaries_dir();
    let bar = ProgressBar::new(levels.len() as u64 * 2);
    let mut total = PipelineSummary::new();

    for level_config in levels {
        let level = level_config.level;
        let level_dir = pipeline.level_dir(level);

        let simplified =
            simplify_boundaries(&source_dir, &level_dir, level, level_config.tolerance())?;
        bar.inc(1);

        let tiled = build_tiles(&level_dir, &pipeline.tiles_dir, level, level_config.zooms())?;
        bar.inc(1);

        total.merge(simplified);
        total.merge(tiled);
    }
    bar.finish_and_clear();

    print_summary("tiles", &total);
    Ok(())
}
