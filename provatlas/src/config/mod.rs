//! TOML configuration for the pipeline and the loader cache.
//!
//! Every field has a default, so an empty file (or no file at all) yields
//! a working configuration. Unknown keys are rejected to catch typos.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coord::DetailLevel;

/// Default cache budget: browser-scale, not server-scale.
pub const DEFAULT_CACHE_SIZE_BYTES: u64 = 64 * 1024 * 1024;

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Could not read the config file.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Offending path.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the schema.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// Offending path.
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ConfigFile {
    /// Pipeline settings.
    pub pipeline: PipelineConfig,
    /// Loader cache settings.
    pub cache: CacheConfig,
}

impl ConfigFile {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Pipeline stage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PipelineConfig {
    /// World GeoJSON the split stage reads.
    pub source: PathBuf,
    /// Directory datasets are downloaded into.
    pub data_dir: PathBuf,
    /// Root directory for boundary files.
    pub boundaries_dir: PathBuf,
    /// Root directory for the tile trees.
    pub tiles_dir: PathBuf,
    /// Feature property holding the country code.
    pub country_key: String,
    /// Feature property holding the display name.
    pub name_key: String,
    /// Dataset name recorded in boundary provenance.
    pub source_name: String,
    /// Detail levels to build.
    pub levels: Vec<LevelConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("data/world-110m.geojson"),
            data_dir: PathBuf::from("data"),
            boundaries_dir: PathBuf::from("boundaries"),
            tiles_dir: PathBuf::from("tiles"),
            country_key: "ISO_A3".to_string(),
            name_key: "ADMIN".to_string(),
            source_name: "naturalearth".to_string(),
            levels: DetailLevel::ALL.iter().map(|&l| LevelConfig::new(l)).collect(),
        }
    }
}

impl PipelineConfig {
    /// Directory holding the unsimplified split output.
    pub fn source_boundaries_dir(&self) -> PathBuf {
        self.boundaries_dir.join("source")
    }

    /// Directory holding one level's simplified boundaries.
    pub fn level_dir(&self, level: DetailLevel) -> PathBuf {
        self.boundaries_dir.join(level.code())
    }
}

/// Per-level settings, with defaults taken from the level itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelConfig {
    /// Which detail level this entry configures.
    pub level: DetailLevel,
    /// Simplification tolerance override, degrees.
    pub tolerance: Option<f64>,
    /// Lowest zoom override.
    pub min_zoom: Option<u8>,
    /// Highest zoom override.
    pub max_zoom: Option<u8>,
}

impl LevelConfig {
    /// Create an entry with the level's built-in defaults.
    pub fn new(level: DetailLevel) -> Self {
        Self {
            level,
            tolerance: None,
            min_zoom: None,
            max_zoom: None,
        }
    }

    /// Resolved simplification tolerance.
    pub fn tolerance(&self) -> f64 {
        self.tolerance.unwrap_or_else(|| self.level.tolerance())
    }

    /// Resolved zoom range.
    pub fn zooms(&self) -> RangeInclusive<u8> {
        let defaults = self.level.zoom_range();
        let min = self.min_zoom.unwrap_or(*defaults.start());
        let max = self.max_zoom.unwrap_or(*defaults.end());
        min..=max
    }
}

/// Loader cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct CacheConfig {
    /// Maximum cached bytes.
    pub max_size_bytes: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: DEFAULT_CACHE_SIZE_BYTES,
        }
    }
}

/// Render a byte count for humans.
pub fn format_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * KIB;
    const GIB: u64 = 1024 * MIB;

    if bytes >= GIB {
        format!("{:.1} GiB", bytes as f64 / GIB as f64)
    } else if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{} B", bytes)
    }
}
