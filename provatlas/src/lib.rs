//! ProvAtlas - province boundary pipeline and tile streaming
//!
//! This library provides the data path for a browser grand-strategy map:
//! an offline pipeline that turns world GeoJSON into per-country boundary
//! files and PBF map tiles, and a client-side loader that fetches, decodes,
//! and caches those tiles on demand.
//!
//! # Pipeline
//!
//! ```text
//! world GeoJSON -> split -> boundaries/source/{code}.geojson
//!                -> simplify -> boundaries/{level}/{code}.geojson
//!                -> tile -> tiles/{level}/{z}/{x}/{y}.pbf
//! ```
//!
//! # Loader
//!
//! ```text
//! TileLoader -> TileCache (moka, byte-weighed, keyed by level + z/x/y)
//!            -> TileSource (directory or HTTP)
//!            -> codec (PBF decode)
//! ```

pub mod boundary;
pub mod cache;
pub mod codec;
pub mod config;
pub mod coord;
pub mod download;
pub mod geometry;
pub mod loader;
pub mod pipeline;
pub mod source;
pub mod telemetry;
