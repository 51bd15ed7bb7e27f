//! Simplify stage: per-detail-level boundary copies.

use std::path::Path;

use geo::Simplify;
use tracing::{info, warn};

use super::{PipelineError, PipelineSummary};
use crate::boundary::BoundaryFile;
use crate::coord::DetailLevel;

/// Produce simplified copies of every boundary file in a directory.
///
/// Each feature geometry is simplified with Ramer-Douglas-Peucker at the
/// given tolerance (degrees). Features whose rings collapse under the
/// tolerance are dropped with a warning; a country left with no features
/// is not written at all. Output files keep their `{code}.geojson` names
/// under `out_dir`, with `metadata.level` set to the level's code.
pub fn simplify_boundaries(
    boundaries_dir: &Path,
    out_dir: &Path,
    level: DetailLevel,
    tolerance: f64,
) -> Result<PipelineSummary, PipelineError> {
    let mut summary = PipelineSummary::new();

    for path in boundary_paths(boundaries_dir)? {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut boundary = match BoundaryFile::read(&path) {
            Ok(b) => b,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "unreadable boundary, skipping");
                summary.add_warning(stem, e.to_string());
                continue;
            }
        };

        summary.countries += 1;
        summary.features_in += boundary.feature_count();

        let country = boundary.metadata.country.clone();
        let mut kept = Vec::with_capacity(boundary.features.len());
        for feature in boundary.features {
            match simplify_feature(feature, tolerance) {
                Some(simplified) => kept.push(simplified),
                None => {
                    summary.features_skipped += 1;
                    summary.add_warning(
                        country.clone(),
                        format!("feature degenerate at tolerance {}", tolerance),
                    );
                }
            }
        }

        if kept.is_empty() {
            warn!(country = %country, "no features survive simplification, skipping file");
            summary.add_warning(country, "no features survive simplification".to_string());
            continue;
        }

        boundary.features = kept;
        boundary.metadata.level = level.code().to_string();

        let out_path = out_dir.join(format!("{}.geojson", country));
        match boundary.write(&out_path) {
            Ok(()) => {
                summary.files_written += 1;
                info!(country = %country, level = %level, "simplified boundary written");
            }
            Err(e) => {
                warn!(country = %country, error = %e, "failed to write simplified boundary");
                summary.add_warning(country, e.to_string());
            }
        }
    }

    Ok(summary)
}

/// Sorted list of `*.geojson` paths in a directory.
fn boundary_paths(dir: &Path) -> Result<Vec<std::path::PathBuf>, PipelineError> {
    let entries = std::fs::read_dir(dir).map_err(|e| PipelineError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut paths: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "geojson"))
        .collect();
    paths.sort();
    Ok(paths)
}

/// Simplify one feature, or `None` when its geometry degenerates.
fn simplify_feature(feature: geojson::Feature, tolerance: f64) -> Option<geojson::Feature> {
    let geometry = feature.geometry.as_ref()?;
    let geo: geo::Geometry<f64> = geo::Geometry::try_from(geometry.clone()).ok()?;
    let simplified = simplify_geometry(geo, tolerance)?;

    Some(geojson::Feature {
        geometry: Some(geojson::Geometry::new(geojson::Value::from(&simplified))),
        ..feature
    })
}

fn simplify_geometry(geometry: geo::Geometry<f64>, tolerance: f64) -> Option<geo::Geometry<f64>> {
    match geometry {
        geo::Geometry::Polygon(polygon) => {
            clean_polygon(polygon.simplify(&tolerance), tolerance).map(geo::Geometry::Polygon)
        }
        geo::Geometry::MultiPolygon(multi) => {
            let polygons: Vec<_> = multi
                .simplify(&tolerance)
                .0
                .into_iter()
                .filter_map(|p| clean_polygon(p, tolerance))
                .collect();
            if polygons.is_empty() {
                None
            } else {
                Some(geo::Geometry::MultiPolygon(geo::MultiPolygon(polygons)))
            }
        }
        geo::Geometry::LineString(line) => {
            let simplified = line.simplify(&tolerance);
            if simplified.0.len() < 2 {
                None
            } else {
                Some(geo::Geometry::LineString(simplified))
            }
        }
        geo::Geometry::MultiLineString(multi) => {
            let lines: Vec<_> = multi
                .simplify(&tolerance)
                .0
                .into_iter()
                .filter(|l| l.0.len() >= 2)
                .collect();
            if lines.is_empty() {
                None
            } else {
                Some(geo::Geometry::MultiLineString(geo::MultiLineString(lines)))
            }
        }
        // Points and other geometries have nothing to simplify
        other => Some(other),
    }
}

/// Drop degenerate polygons.
///
/// A polygon is degenerate when its exterior collapsed below a closed ring,
/// or when the whole shape is smaller than the simplification tolerance (it
/// cannot render at this level anyway). Collapsed holes are dropped while
/// keeping the polygon.
fn clean_polygon(polygon: geo::Polygon<f64>, tolerance: f64) -> Option<geo::Polygon<f64>> {
    use geo::BoundingRect;

    let extent_ok = polygon
        .bounding_rect()
        .is_some_and(|r| r.width() >= tolerance || r.height() >= tolerance);
    if !extent_ok {
        return None;
    }

    let (exterior, interiors) = polygon.into_inner();
    if exterior.0.len() < 4 {
        return None;
    }
    let interiors: Vec<_> = interiors.into_iter().filter(|r| r.0.len() >= 4).collect();
    Some(geo::Polygon::new(exterior, interiors))
}
