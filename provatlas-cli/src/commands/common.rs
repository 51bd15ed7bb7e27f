//! Shared helpers for CLI commands.

use std::path::Path;

use provatlas::config::ConfigFile;
use provatlas::pipeline::PipelineSummary;

use crate::error::CliError;

/// Load the configuration file, or defaults when none was given.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile, CliError> {
    match path {
        Some(path) => Ok(ConfigFile::load(path)?),
        None => Ok(ConfigFile::default()),
    }
}

/// Build a Tokio runtime for commands with async work.
///
/// The pipeline commands are synchronous; only fetch and query need a
/// runtime, so they own one instead of the whole CLI being async.
pub fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Other(format!("failed to create runtime: {}", e)))
}

/// Print a stage summary and its warnings.
pub fn print_summary(stage: &str, summary: &PipelineSummary) {
    println!(
        "{}: {} features in, {} countries, {} files, {} tiles, {} skipped",
        stage,
        summary.features_in,
        summary.countries,
        summary.files_written,
        summary.tiles_written,
        summary.features_skipped,
    );
    for warning in &summary.warnings {
        println!("  warning [{}]: {}", warning.country, warning.message);
    }
}
