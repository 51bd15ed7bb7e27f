//! `provatlas split` - world dataset to per-country boundary files.

use std::path::{Path, PathBuf};

use clap::Args;
use provatlas::pipeline::{split_world, SplitOptions};

use super::common::{load_config, print_summary};
use crate::error::CliError;

/// Arguments for the split command.
#[derive(Debug, Args)]
pub struct SplitArgs {
    /// World GeoJSON to split (defaults to the configured source).
    #[arg(long)]
    source: Option<PathBuf>,

    /// Output directory (defaults to `{boundaries_dir}/source`).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Feature property holding the country code.
    #[arg(long)]
    country_key: Option<String>,
}

/// Run the split command.
pub fn run(args: SplitArgs, config_path: Option<&Path>) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let source = args.source.unwrap_or_else(|| config.pipeline.source.clone());
    let out = args
        .out
        .unwrap_or_else(|| config.pipeline.source_boundaries_dir());

    let options = SplitOptions {
        country_key: args
            .country_key
            .unwrap_or_else(|| config.pipeline.country_key.clone()),
        name_key: config.pipeline.name_key.clone(),
        source_name: config.pipeline.source_name.clone(),
    };

    println!("Splitting {} into {}", source.display(), out.display());
    let summary = split_world(&source, &out, &options)?;
    print_summary("split", &summary);
    Ok(())
}
