//! PBF tile codec.
//!
//! Tiles are stored as protobuf wire-format messages (geobuf-style):
//! varint scalars, length-delimited submessages, and coordinate rings
//! packed as zigzag deltas quantized to a decimal precision grid. The
//! format is written out by hand; the messages are small and fixed, and
//! nothing else in the stack speaks protobuf.
//!
//! # Layout
//!
//! ```text
//! Tile     := version precision level zoom x y feature*
//! Feature  := country name [properties] geometry
//! Geometry := type [lengths] coords
//! ```
//!
//! `coords` holds interleaved `(lon, lat)` deltas, restarting at each ring.
//! `lengths` describes ring structure: point counts per ring for polygons,
//! with polygon/ring counts prepended for multipolygons.

mod tile;
mod varint;

pub use tile::{
    TileData, TileFeature, TileGeometry, DEFAULT_PRECISION, TILE_FORMAT_VERSION,
};
pub use varint::{read_svarint, read_uvarint, write_svarint, write_uvarint};

use thiserror::Error;

/// Errors from tile encoding and decoding.
///
/// Decoding is total: any byte sequence yields either a tile or one of
/// these, never a panic.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Input ended in the middle of a value.
    #[error("unexpected end of tile data")]
    UnexpectedEof,

    /// Varint does not fit in 64 bits.
    #[error("varint overflows 64 bits")]
    VarintOverflow,

    /// Length prefix points past the end of the buffer.
    #[error("field length {length} exceeds remaining {remaining} bytes")]
    TruncatedField { length: u64, remaining: usize },

    /// Tile was written by a newer format version.
    #[error("unsupported tile format version {0}")]
    UnsupportedVersion(u64),

    /// Detail level index not recognized.
    #[error("unknown detail level index {0}")]
    UnknownLevel(u64),

    /// Tile coordinate fields are inconsistent.
    #[error("invalid tile coordinate {x}/{y} at zoom {zoom}")]
    InvalidTileCoord { zoom: u64, x: u64, y: u64 },

    /// Geometry type tag not recognized.
    #[error("unknown geometry type {0}")]
    UnknownGeometryType(u64),

    /// Ring structure does not match the coordinate count.
    #[error("malformed geometry: {0}")]
    MalformedGeometry(&'static str),

    /// A string field holds invalid UTF-8.
    #[error("invalid UTF-8 in string field")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// Wire type this decoder cannot skip.
    #[error("unsupported wire type {0}")]
    UnknownWireType(u8),
}
