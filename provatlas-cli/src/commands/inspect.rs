//! `provatlas inspect` - summarize a boundary file or a PBF tile.

use std::path::{Path, PathBuf};

use clap::Args;
use provatlas::boundary::BoundaryFile;
use provatlas::codec::TileData;
use provatlas::config::format_size;

use crate::error::CliError;

/// Arguments for the inspect command.
#[derive(Debug, Args)]
pub struct InspectArgs {
    /// A `.geojson` boundary file or a `.pbf` tile.
    path: PathBuf,
}

/// Run the inspect command.
pub fn run(args: InspectArgs) -> Result<(), CliError> {
    match args.path.extension().and_then(|e| e.to_str()) {
        Some("pbf") => inspect_tile(&args.path),
        Some("geojson") | Some("json") => inspect_boundary(&args.path),
        _ => Err(CliError::Other(format!(
            "{}: expected a .geojson or .pbf file",
            args.path.display()
        ))),
    }
}

fn inspect_tile(path: &Path) -> Result<(), CliError> {
    let bytes = std::fs::read(path).map_err(|e| CliError::Other(format!(
        "failed to read {}: {}",
        path.display(),
        e
    )))?;
    let tile = TileData::decode(&bytes)
        .map_err(|e| CliError::Other(format!("failed to decode {}: {}", path.display(), e)))?;

    println!("tile {} level {}", tile.coord, tile.level);
    println!("  size:      {}", format_size(bytes.len() as u64));
    println!("  precision: 1e-{}", tile.precision);
    println!("  features:  {}", tile.features.len());
    for feature in &tile.features {
        println!(
            "    {} {} ({} coords)",
            feature.country,
            feature.name,
            feature.geometry.coord_count()
        );
    }
    Ok(())
}

fn inspect_boundary(path: &Path) -> Result<(), CliError> {
    let boundary = BoundaryFile::read(path)?;

    println!("boundary {} ({})", boundary.metadata.country, boundary.game.display_name);
    println!("  source:    {}", boundary.metadata.source);
    println!("  level:     {}", boundary.metadata.level);
    println!("  generated: {}", boundary.metadata.generated);
    println!("  region:    {}", boundary.game.region);
    println!(
        "  stats:     pop {} gdp {} stability {:.2}",
        boundary.game.stats.population, boundary.game.stats.gdp, boundary.game.stats.stability
    );
    println!("  features:  {}", boundary.feature_count());
    if let Some(bbox) = boundary.bbox() {
        println!(
            "  bbox:      [{:.3}, {:.3}, {:.3}, {:.3}]",
            bbox.min_lon, bbox.min_lat, bbox.max_lon, bbox.max_lat
        );
    }
    Ok(())
}
