//! Tile stage: simplified boundaries to a PBF tile tree.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::json;
use tracing::{info, warn};

use super::{PipelineError, PipelineSummary};
use crate::boundary::BoundaryFile;
use crate::codec::{TileData, TileFeature, TileGeometry};
use crate::coord::{tiles_for_bbox, DetailLevel, TileCoord};
use crate::geometry::LonLatBBox;
use crate::source::tile_rel_path;

/// A feature prepared for tiling: codec geometry plus its bbox.
struct TileRecord {
    feature: TileFeature,
    bbox: LonLatBBox,
}

/// Build the PBF tile tree for one detail level.
///
/// Reads every boundary file in `level_dir` (the simplify stage's output
/// for this level) and writes `{tiles_root}/{level}/{z}/{x}/{y}.pbf` for
/// each zoom in `zooms`. A tile carries every feature whose bounding box
/// intersects the tile bounds; features are not clipped. Tiles with no
/// features are not written.
pub fn build_tiles(
    level_dir: &Path,
    tiles_root: &Path,
    level: DetailLevel,
    zooms: std::ops::RangeInclusive<u8>,
) -> Result<PipelineSummary, PipelineError> {
    let mut summary = PipelineSummary::new();
    let records = collect_records(level_dir, &mut summary)?;

    for zoom in zooms {
        // Assign each feature to every tile its bbox intersects
        let mut assignment: BTreeMap<TileCoord, Vec<usize>> = BTreeMap::new();
        for (index, record) in records.iter().enumerate() {
            let range = tiles_for_bbox(&record.bbox, zoom)?;
            for coord in range {
                assignment.entry(coord).or_default().push(index);
            }
        }

        for (coord, indices) in assignment {
            let mut tile = TileData::new(level, coord);
            tile.features = indices
                .iter()
                .map(|&i| records[i].feature.clone())
                .collect();

            let rel = tile_rel_path(level, &coord);
            let path = tiles_root.join(&rel);
            if let Err(e) = write_tile(&path, &tile) {
                warn!(tile = %coord, error = %e, "failed to write tile, skipping");
                summary.add_warning(rel, e.to_string());
                continue;
            }
            summary.tiles_written += 1;
        }
        info!(level = %level, zoom, "tile pyramid level written");
    }

    Ok(summary)
}

/// Load boundary files and flatten them into tileable records.
fn collect_records(
    level_dir: &Path,
    summary: &mut PipelineSummary,
) -> Result<Vec<TileRecord>, PipelineError> {
    let entries = std::fs::read_dir(level_dir).map_err(|e| PipelineError::Io {
        path: level_dir.to_path_buf(),
        source: e,
    })?;

    let mut paths: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "geojson"))
        .collect();
    paths.sort();

    let mut records = Vec::new();
    for path in paths {
        let boundary = match BoundaryFile::read(&path) {
            Ok(b) => b,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "unreadable boundary, skipping");
                summary.add_warning(
                    path.file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    e.to_string(),
                );
                continue;
            }
        };

        summary.countries += 1;
        summary.features_in += boundary.feature_count();

        let country = &boundary.metadata.country;
        let properties = json!({ "region": boundary.game.region }).to_string();

        for feature in &boundary.features {
            let geometry = feature
                .geometry
                .as_ref()
                .and_then(|g| TileGeometry::from_geojson(&g.value));
            let Some(geometry) = geometry else {
                summary.features_skipped += 1;
                summary.add_warning(country.clone(), "geometry not tileable".to_string());
                continue;
            };
            let Some(bbox) = geometry.bbox() else {
                summary.features_skipped += 1;
                summary.add_warning(country.clone(), "empty geometry".to_string());
                continue;
            };

            records.push(TileRecord {
                feature: TileFeature {
                    country: country.clone(),
                    name: boundary.game.display_name.clone(),
                    properties: Some(properties.clone()),
                    geometry,
                },
                bbox,
            });
        }
    }

    Ok(records)
}

fn write_tile(path: &Path, tile: &TileData) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, tile.encode())
}
