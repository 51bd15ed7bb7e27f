//! Split stage: world GeoJSON to per-country boundary files.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use geo::Area;
use geojson::GeoJson;
use tracing::{info, warn};

use super::{PipelineError, PipelineSummary};
use crate::boundary::{
    derive_stats, feature_bbox, primary_region, BoundaryFile, BoundaryMetadata, GameMetadata,
    SOURCE_LEVEL,
};

/// Options for the split stage.
#[derive(Debug, Clone)]
pub struct SplitOptions {
    /// Feature property holding the country code.
    pub country_key: String,
    /// Feature property holding the display name.
    pub name_key: String,
    /// Dataset name recorded in the `metadata.source` field.
    pub source_name: String,
}

impl Default for SplitOptions {
    fn default() -> Self {
        // Natural Earth admin-0 conventions
        Self {
            country_key: "ISO_A3".to_string(),
            name_key: "ADMIN".to_string(),
            source_name: "world".to_string(),
        }
    }
}

/// Split a world FeatureCollection into one boundary file per country.
///
/// Features are grouped by the configured country property. Features
/// without a usable code are skipped with a warning; a country whose file
/// cannot be written is skipped the same way. Output files land at
/// `{out_dir}/{code}.geojson`.
pub fn split_world(
    source: &Path,
    out_dir: &Path,
    options: &SplitOptions,
) -> Result<PipelineSummary, PipelineError> {
    let text = std::fs::read_to_string(source).map_err(|e| PipelineError::Io {
        path: source.to_path_buf(),
        source: e,
    })?;
    let geojson: GeoJson = text.parse().map_err(|e: geojson::Error| PipelineError::Parse {
        path: source.to_path_buf(),
        message: e.to_string(),
    })?;
    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => {
            return Err(PipelineError::Parse {
                path: source.to_path_buf(),
                message: "not a FeatureCollection".to_string(),
            })
        }
    };

    let mut summary = PipelineSummary::new();
    summary.features_in = collection.features.len();

    // Group features by country code; BTreeMap keeps output order stable.
    let mut by_country: BTreeMap<String, Vec<geojson::Feature>> = BTreeMap::new();
    for (index, feature) in collection.features.into_iter().enumerate() {
        match country_code(&feature, &options.country_key) {
            Some(code) => by_country.entry(code).or_default().push(feature),
            None => {
                warn!(index, key = %options.country_key, "feature has no country code, skipping");
                summary.features_skipped += 1;
                summary.add_warning(
                    format!("feature #{}", index),
                    format!("missing or unusable {} property", options.country_key),
                );
            }
        }
    }
    summary.countries = by_country.len();

    let generated = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

    for (code, features) in by_country {
        let boundary = assemble_boundary(&code, features, options, &generated);
        let path = out_dir.join(format!("{}.geojson", code));
        match boundary.write(&path) {
            Ok(()) => {
                summary.files_written += 1;
                info!(country = %code, path = %path.display(), "boundary written");
            }
            Err(e) => {
                warn!(country = %code, error = %e, "failed to write boundary, skipping");
                summary.add_warning(code, e.to_string());
            }
        }
    }

    Ok(summary)
}

fn assemble_boundary(
    code: &str,
    features: Vec<geojson::Feature>,
    options: &SplitOptions,
    generated: &str,
) -> BoundaryFile {
    let display_name = features
        .iter()
        .find_map(|f| string_property(f, &options.name_key))
        .unwrap_or_else(|| code.to_string());

    // Region from the centroid of the union bbox
    let bbox = features.iter().filter_map(feature_bbox).reduce(|a, b| a.union(&b));
    let region = bbox
        .and_then(|b| {
            let (lon, lat) = b.center();
            primary_region(lat, lon)
        })
        .map(|r| r.code().to_string())
        .unwrap_or_else(|| "other".to_string());

    let area: f64 = features
        .iter()
        .filter_map(|f| f.geometry.as_ref())
        .filter_map(|g| geo::Geometry::<f64>::try_from(g.clone()).ok())
        .map(|g| g.unsigned_area())
        .sum();

    BoundaryFile {
        metadata: BoundaryMetadata {
            source: options.source_name.clone(),
            level: SOURCE_LEVEL.to_string(),
            country: code.to_string(),
            generated: generated.to_string(),
        },
        game: GameMetadata {
            display_name,
            region,
            stats: derive_stats(code, area),
        },
        features,
    }
}

fn country_code(feature: &geojson::Feature, key: &str) -> Option<String> {
    let code = string_property(feature, key)?;
    // Natural Earth marks unassigned territories with "-99"
    if code.is_empty() || code == "-99" {
        return None;
    }
    Some(code)
}

fn string_property(feature: &geojson::Feature, key: &str) -> Option<String> {
    feature
        .properties
        .as_ref()?
        .get(key)?
        .as_str()
        .map(|s| s.to_string())
}
