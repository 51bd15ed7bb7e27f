//! `provatlas query` - bounding-box feature query through the tile loader.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use provatlas::config::format_size;
use provatlas::coord::DetailLevel;
use provatlas::geometry::LonLatBBox;
use provatlas::loader::TileLoader;
use provatlas::source::{DirectoryTileSource, HttpTileSource, TileSource};

use super::common::{load_config, runtime};
use crate::error::CliError;

/// Arguments for the query command.
#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Tile tree directory (defaults to the configured tiles dir).
    #[arg(long, conflicts_with = "url")]
    tiles: Option<PathBuf>,

    /// Tile tree base URL instead of a local directory.
    #[arg(long)]
    url: Option<String>,

    /// Detail level to query.
    #[arg(long, default_value = "detailed")]
    level: DetailLevel,

    /// Zoom level to query.
    #[arg(long, default_value_t = 4)]
    zoom: u8,

    /// Bounding box as min_lon,min_lat,max_lon,max_lat.
    #[arg(long, allow_hyphen_values = true)]
    bbox: String,
}

/// Run the query command.
pub fn run(args: QueryArgs, config_path: Option<&Path>) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let bbox = parse_bbox(&args.bbox)?;

    let source: Arc<dyn TileSource> = match &args.url {
        Some(url) => Arc::new(HttpTileSource::new(url.clone())?),
        None => {
            let root = args.tiles.unwrap_or_else(|| config.pipeline.tiles_dir.clone());
            Arc::new(DirectoryTileSource::new(root))
        }
    };

    let loader = TileLoader::new(source, config.cache.max_size_bytes);

    let query = runtime()?.block_on(loader.features_in_bbox(args.level, args.zoom, &bbox))?;

    println!(
        "{} features from {} tiles ({} absent, {} skipped)",
        query.features.len(),
        query.tiles_loaded,
        query.tiles_absent,
        query.skipped.len(),
    );
    for feature in &query.features {
        println!("  {} {}", feature.country, feature.name);
    }
    for skipped in &query.skipped {
        println!("  skipped {}: {}", skipped.tile, skipped.reason);
    }
    println!("loader: {}", loader.metrics().snapshot());
    println!(
        "cache: {} tiles, {} of {}",
        loader.cache().entry_count(),
        format_size(loader.cache().size_bytes()),
        format_size(loader.cache().max_size_bytes()),
    );

    Ok(())
}

fn parse_bbox(text: &str) -> Result<LonLatBBox, CliError> {
    let parts: Vec<f64> = text
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| CliError::Other(format!("invalid bbox {:?}: {}", text, e)))?;
    match parts[..] {
        [min_lon, min_lat, max_lon, max_lat] => {
            Ok(LonLatBBox::new(min_lon, min_lat, max_lon, max_lat))
        }
        _ => Err(CliError::Other(format!(
            "invalid bbox {:?}: expected 4 comma-separated numbers",
            text
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bbox() {
        let bbox = parse_bbox("-5.0, 40.0, 10.0, 55.0").unwrap();
        assert_eq!(bbox, LonLatBBox::new(-5.0, 40.0, 10.0, 55.0));
    }

    #[test]
    fn test_parse_bbox_wrong_arity() {
        assert!(parse_bbox("1,2,3").is_err());
    }

    #[test]
    fn test_parse_bbox_not_numbers() {
        assert!(parse_bbox("a,b,c,d").is_err());
    }
}
