//! Tile coordinate and detail level types.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::LonLatBBox;

/// Minimum latitude representable in Web Mercator (degrees).
pub const MIN_LAT: f64 = -85.05112878;
/// Maximum latitude representable in Web Mercator (degrees).
pub const MAX_LAT: f64 = 85.05112878;
/// Minimum longitude (degrees).
pub const MIN_LON: f64 = -180.0;
/// Maximum longitude (degrees).
pub const MAX_LON: f64 = 180.0;
/// Minimum zoom level.
pub const MIN_ZOOM: u8 = 0;
/// Maximum zoom level the tile tree supports.
pub const MAX_ZOOM: u8 = 12;

/// Errors from coordinate validation and conversion.
#[derive(Debug, Error)]
pub enum CoordError {
    /// Latitude outside the Web Mercator domain.
    #[error("invalid latitude: {0} (must be within [{MIN_LAT}, {MAX_LAT}])")]
    InvalidLatitude(f64),

    /// Longitude outside [-180, 180].
    #[error("invalid longitude: {0} (must be within [{MIN_LON}, {MAX_LON}])")]
    InvalidLongitude(f64),

    /// Zoom level beyond `MAX_ZOOM`.
    #[error("invalid zoom: {0} (max: {MAX_ZOOM})")]
    InvalidZoom(u8),

    /// Unknown detail level code.
    #[error("unknown detail level: {0:?} (expected overview, detailed or ultra)")]
    InvalidLevel(String),
}

/// Slippy-map tile coordinate: column `x`, row `y`, zoom level.
///
/// `x` grows eastward from the antimeridian, `y` grows southward from the
/// north clip latitude. Both are less than `2^zoom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    /// Tile column.
    pub x: u32,
    /// Tile row.
    pub y: u32,
    /// Zoom level.
    pub zoom: u8,
}

impl TileCoord {
    /// Geographic bounds of this tile.
    pub fn bounds(&self) -> LonLatBBox {
        let (west, north) = super::tile_to_lon_lat(self);
        let southeast = TileCoord {
            x: self.x + 1,
            y: self.y + 1,
            zoom: self.zoom,
        };
        let (east, south) = super::tile_to_lon_lat(&southeast);
        LonLatBBox::new(west, south, east, north)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// Boundary simplification degree, one tile pyramid per level.
///
/// Levels map to directory names in boundary and tile trees; each carries a
/// default simplification tolerance and the zoom range its pyramid covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    /// Coarse world view, heavily simplified.
    Overview,
    /// Mid-zoom view.
    Detailed,
    /// Close-up view, lightly simplified.
    Ultra,
}

impl DetailLevel {
    /// All levels, coarsest first.
    pub const ALL: [DetailLevel; 3] = [
        DetailLevel::Overview,
        DetailLevel::Detailed,
        DetailLevel::Ultra,
    ];

    /// Directory code for this level.
    pub fn code(&self) -> &'static str {
        match self {
            DetailLevel::Overview => "overview",
            DetailLevel::Detailed => "detailed",
            DetailLevel::Ultra => "ultra",
        }
    }

    /// Default Ramer-Douglas-Peucker tolerance in degrees.
    pub fn tolerance(&self) -> f64 {
        match self {
            DetailLevel::Overview => 0.1,
            DetailLevel::Detailed => 0.01,
            DetailLevel::Ultra => 0.001,
        }
    }

    /// Default zoom range of this level's tile pyramid.
    pub fn zoom_range(&self) -> RangeInclusive<u8> {
        match self {
            DetailLevel::Overview => 0..=3,
            DetailLevel::Detailed => 4..=7,
            DetailLevel::Ultra => 8..=10,
        }
    }

    /// Stable wire index used by the tile codec.
    pub fn index(&self) -> u8 {
        match self {
            DetailLevel::Overview => 0,
            DetailLevel::Detailed => 1,
            DetailLevel::Ultra => 2,
        }
    }

    /// Inverse of [`DetailLevel::index`].
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(DetailLevel::Overview),
            1 => Some(DetailLevel::Detailed),
            2 => Some(DetailLevel::Ultra),
            _ => None,
        }
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for DetailLevel {
    type Err = CoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "overview" => Ok(DetailLevel::Overview),
            "detailed" => Ok(DetailLevel::Detailed),
            "ultra" => Ok(DetailLevel::Ultra),
            other => Err(CoordError::InvalidLevel(other.to_string())),
        }
    }
}

/// Row-major iterator over the tiles intersecting a bounding box.
///
/// Produced by [`tiles_for_bbox`](super::tiles_for_bbox). Yields every tile
/// in the inclusive `[x_min, x_max] x [y_min, y_max]` range exactly once.
#[derive(Debug, Clone)]
pub struct TileRange {
    pub(crate) zoom: u8,
    pub(crate) x_min: u32,
    pub(crate) x_max: u32,
    pub(crate) y_min: u32,
    pub(crate) y_max: u32,
    pub(crate) next_x: u32,
    pub(crate) next_y: u32,
    pub(crate) exhausted: bool,
}

impl TileRange {
    /// Total number of tiles in the range, regardless of iteration state.
    pub fn tile_count(&self) -> usize {
        let cols = (self.x_max - self.x_min + 1) as usize;
        let rows = (self.y_max - self.y_min + 1) as usize;
        cols * rows
    }
}

impl Iterator for TileRange {
    type Item = TileCoord;

    fn next(&mut self) -> Option<TileCoord> {
        if self.exhausted {
            return None;
        }
        let tile = TileCoord {
            x: self.next_x,
            y: self.next_y,
            zoom: self.zoom,
        };
        if self.next_x < self.x_max {
            self.next_x += 1;
        } else if self.next_y < self.y_max {
            self.next_x = self.x_min;
            self.next_y += 1;
        } else {
            self.exhausted = true;
        }
        Some(tile)
    }
}
