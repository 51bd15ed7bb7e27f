//! Longitude/latitude bounding boxes.
//!
//! The pipeline and the loader both reason about features through their
//! axis-aligned geographic bounding boxes: the tiler assigns a feature to
//! every tile its bbox intersects, and the loader filters tile features
//! against a query bbox the same way.

use geo::BoundingRect;

/// Axis-aligned bounding box in geographic coordinates (degrees).
///
/// Coordinates follow GeoJSON order: longitude first, latitude second.
/// Degenerate boxes (a point or a line) are valid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LonLatBBox {
    /// Western edge in degrees.
    pub min_lon: f64,
    /// Southern edge in degrees.
    pub min_lat: f64,
    /// Eastern edge in degrees.
    pub max_lon: f64,
    /// Northern edge in degrees.
    pub max_lat: f64,
}

impl LonLatBBox {
    /// Create a bounding box from its corner coordinates.
    ///
    /// Corners are reordered if given swapped, so `new` never produces an
    /// empty box from valid coordinates.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon: min_lon.min(max_lon),
            min_lat: min_lat.min(max_lat),
            max_lon: min_lon.max(max_lon),
            max_lat: min_lat.max(max_lat),
        }
    }

    /// Bounding box of a geometry, or `None` for empty geometries.
    pub fn from_geo(geometry: &geo::Geometry<f64>) -> Option<Self> {
        let rect = geometry.bounding_rect()?;
        Some(Self {
            min_lon: rect.min().x,
            min_lat: rect.min().y,
            max_lon: rect.max().x,
            max_lat: rect.max().y,
        })
    }

    /// Bounding box of a single point.
    pub fn from_point(lon: f64, lat: f64) -> Self {
        Self {
            min_lon: lon,
            min_lat: lat,
            max_lon: lon,
            max_lat: lat,
        }
    }

    /// Returns true if the two boxes share any point.
    ///
    /// Edges count: a feature sitting exactly on a tile boundary belongs
    /// to the tiles on both sides.
    pub fn intersects(&self, other: &LonLatBBox) -> bool {
        self.min_lon <= other.max_lon
            && other.min_lon <= self.max_lon
            && self.min_lat <= other.max_lat
            && other.min_lat <= self.max_lat
    }

    /// Returns true if the point lies inside or on the boundary.
    pub fn contains_point(&self, lon: f64, lat: f64) -> bool {
        (self.min_lon..=self.max_lon).contains(&lon) && (self.min_lat..=self.max_lat).contains(&lat)
    }

    /// Smallest box covering both boxes.
    pub fn union(&self, other: &LonLatBBox) -> LonLatBBox {
        LonLatBBox {
            min_lon: self.min_lon.min(other.min_lon),
            min_lat: self.min_lat.min(other.min_lat),
            max_lon: self.max_lon.max(other.max_lon),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }

    /// Extend this box to cover another point.
    pub fn expand(&mut self, lon: f64, lat: f64) {
        self.min_lon = self.min_lon.min(lon);
        self.min_lat = self.min_lat.min(lat);
        self.max_lon = self.max_lon.max(lon);
        self.max_lat = self.max_lat.max(lat);
    }

    /// Center of the box as `(lon, lat)`.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }

    /// Width in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Height in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }
}
