//! `provatlas fetch` - download upstream world datasets.

use std::path::{Path, PathBuf};

use clap::Args;
use indicatif::ProgressBar;
use provatlas::download::{default_sources, download_all};

use super::common::{load_config, runtime};
use crate::error::CliError;

/// Arguments for the fetch command.
#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Directory to download into (defaults to the configured data dir).
    #[arg(long)]
    out: Option<PathBuf>,
}

/// Run the fetch command.
pub fn run(args: FetchArgs, config_path: Option<&Path>) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let dest = args.out.unwrap_or(config.pipeline.data_dir);
    let sources = default_sources();

    println!("Fetching {} datasets into {}", sources.len(), dest.display());
    let bar = ProgressBar::new_spinner();
    bar.set_message("downloading");
    bar.enable_steady_tick(std::time::Duration::from_millis(120));

    let report = runtime()?.block_on(download_all(&sources, &dest));
    bar.finish_and_clear();
    let report = report?;

    for item in &report.succeeded {
        println!("  ok {} -> {} ({} bytes)", item.name, item.path.display(), item.bytes);
    }
    for (name, error) in &report.failed {
        println!("  failed {}: {}", name, error);
    }

    if report.is_complete() {
        Ok(())
    } else {
        Err(CliError::Other(format!(
            "{} of {} datasets failed to download",
            report.failed.len(),
            sources.len()
        )))
    }
}
