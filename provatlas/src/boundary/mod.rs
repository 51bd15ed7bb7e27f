//! Boundary file model.
//!
//! A boundary file is a GeoJSON FeatureCollection carrying two foreign
//! members next to the standard fields:
//!
//! - `metadata`: provenance (`source`, `level`, `country`, `generated`)
//! - `gameMetadata`: display name, region, and starting economic stats
//!
//! The pipeline writes one boundary file per country; the game reads them
//! for province panels while the map itself is driven by PBF tiles.

mod region;
mod stats;

pub use region::{primary_region, suggest_region, Region};
pub use stats::derive_stats;

use std::path::{Path, PathBuf};

use geojson::{FeatureCollection, GeoJson};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::LonLatBBox;

/// Level code recorded in files holding unsimplified split output.
pub const SOURCE_LEVEL: &str = "source";

/// Foreign member key for the provenance block.
const METADATA_KEY: &str = "metadata";
/// Foreign member key for the game block.
const GAME_METADATA_KEY: &str = "gameMetadata";

/// Errors from reading and writing boundary files.
#[derive(Debug, Error)]
pub enum BoundaryError {
    /// Could not read the file.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Offending path.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not write the file.
    #[error("failed to write {path}: {source}")]
    Write {
        /// Offending path.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid GeoJSON.
    #[error("failed to parse {path}: {message}")]
    Parse {
        /// Offending path.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// The file parses but is not a FeatureCollection.
    #[error("{path}: not a FeatureCollection")]
    NotFeatureCollection {
        /// Offending path.
        path: PathBuf,
    },

    /// A required foreign member block is missing.
    #[error("{path}: missing {key} block")]
    MissingBlock {
        /// Offending path.
        path: PathBuf,
        /// Which block.
        key: &'static str,
    },

    /// A foreign member block does not match its schema.
    #[error("{path}: malformed {key} block: {source}")]
    MalformedBlock {
        /// Offending path.
        path: PathBuf,
        /// Which block.
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Provenance block of a boundary file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryMetadata {
    /// Name of the upstream dataset the boundary came from.
    pub source: String,
    /// Detail level code, or `"source"` for unsimplified splits.
    pub level: String,
    /// Country code this file describes.
    pub country: String,
    /// RFC 3339 timestamp of when the file was generated.
    pub generated: String,
}

/// Starting economic stats for a country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartingStats {
    /// Starting population.
    pub population: u64,
    /// Starting gross domestic product.
    pub gdp: u64,
    /// Starting stability in [0, 1].
    pub stability: f64,
}

/// Game-facing block of a boundary file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameMetadata {
    /// Name shown in nation and province panels.
    pub display_name: String,
    /// Continent region code (see [`Region`]).
    pub region: String,
    /// Starting economic stats.
    pub stats: StartingStats,
}

/// An in-memory boundary file: provenance, game block, and features.
#[derive(Debug, Clone)]
pub struct BoundaryFile {
    /// Provenance block.
    pub metadata: BoundaryMetadata,
    /// Game block.
    pub game: GameMetadata,
    /// The country's features.
    pub features: Vec<geojson::Feature>,
}

impl BoundaryFile {
    /// Read and validate a boundary file.
    ///
    /// The file must be a GeoJSON FeatureCollection with well-formed
    /// `metadata` and `gameMetadata` blocks.
    pub fn read(path: &Path) -> Result<Self, BoundaryError> {
        let text = std::fs::read_to_string(path).map_err(|e| BoundaryError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let geojson: GeoJson = text.parse().map_err(|e: geojson::Error| BoundaryError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let collection = match geojson {
            GeoJson::FeatureCollection(fc) => fc,
            _ => {
                return Err(BoundaryError::NotFeatureCollection {
                    path: path.to_path_buf(),
                })
            }
        };

        let members = collection.foreign_members.as_ref();
        let metadata = extract_block(members, METADATA_KEY, path)?;
        let game = extract_block(members, GAME_METADATA_KEY, path)?;

        Ok(Self {
            metadata,
            game,
            features: collection.features,
        })
    }

    /// Write the boundary file as pretty-printed GeoJSON.
    ///
    /// Parent directories are created as needed.
    pub fn write(&self, path: &Path) -> Result<(), BoundaryError> {
        let mut members = geojson::JsonObject::new();
        members.insert(
            METADATA_KEY.to_string(),
            serde_json::to_value(&self.metadata).expect("metadata serializes"),
        );
        members.insert(
            GAME_METADATA_KEY.to_string(),
            serde_json::to_value(&self.game).expect("game metadata serializes"),
        );

        let collection = FeatureCollection {
            bbox: None,
            features: self.features.clone(),
            foreign_members: Some(members),
        };

        let json = serde_json::to_string_pretty(&collection).expect("collection serializes");

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| BoundaryError::Write {
                path: path.to_path_buf(),
                source: e,
            })?;
        }
        std::fs::write(path, json).map_err(|e| BoundaryError::Write {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Union bounding box of all feature geometries.
    pub fn bbox(&self) -> Option<LonLatBBox> {
        let mut bbox: Option<LonLatBBox> = None;
        for feature in &self.features {
            if let Some(b) = feature_bbox(feature) {
                bbox = Some(match bbox {
                    Some(acc) => acc.union(&b),
                    None => b,
                });
            }
        }
        bbox
    }

    /// Number of features in the file.
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }
}

/// Bounding box of one GeoJSON feature, `None` when the geometry is absent
/// or not representable.
pub fn feature_bbox(feature: &geojson::Feature) -> Option<LonLatBBox> {
    let geometry = feature.geometry.as_ref()?;
    let geo: geo::Geometry<f64> = geo::Geometry::try_from(geometry.clone()).ok()?;
    LonLatBBox::from_geo(&geo)
}

fn extract_block<T: serde::de::DeserializeOwned>(
    members: Option<&geojson::JsonObject>,
    key: &'static str,
    path: &Path,
) -> Result<T, BoundaryError> {
    let value = members
        .and_then(|m| m.get(key))
        .ok_or_else(|| BoundaryError::MissingBlock {
            path: path.to_path_buf(),
            key,
        })?;
    serde_json::from_value(value.clone()).map_err(|e| BoundaryError::MalformedBlock {
        path: path.to_path_buf(),
        key,
        source: e,
    })
}
