//! Tile message encoding and decoding.

use super::varint::{read_svarint, read_uvarint, write_svarint, write_uvarint};
use super::CodecError;
use crate::coord::{DetailLevel, TileCoord, MAX_ZOOM};
use crate::geometry::LonLatBBox;

/// Current tile format version.
pub const TILE_FORMAT_VERSION: u64 = 1;

/// Default coordinate precision in decimal digits (geobuf's default).
pub const DEFAULT_PRECISION: u8 = 6;

/// Precision beyond which the quantization grid would overflow i64 deltas.
const MAX_PRECISION: u8 = 9;

// Wire types.
const WIRE_VARINT: u8 = 0;
const WIRE_FIXED64: u8 = 1;
const WIRE_LEN: u8 = 2;
const WIRE_FIXED32: u8 = 5;

// Tile message fields.
const TILE_VERSION: u32 = 1;
const TILE_PRECISION: u32 = 2;
const TILE_LEVEL: u32 = 3;
const TILE_ZOOM: u32 = 4;
const TILE_X: u32 = 5;
const TILE_Y: u32 = 6;
const TILE_FEATURE: u32 = 7;

// Feature message fields.
const FEATURE_COUNTRY: u32 = 1;
const FEATURE_NAME: u32 = 2;
const FEATURE_PROPERTIES: u32 = 3;
const FEATURE_GEOMETRY: u32 = 4;

// Geometry message fields.
const GEOM_TYPE: u32 = 1;
const GEOM_LENGTHS: u32 = 2;
const GEOM_COORDS: u32 = 3;

// Geometry type tags.
const GEOM_POINT: u64 = 1;
const GEOM_LINESTRING: u64 = 2;
const GEOM_POLYGON: u64 = 3;
const GEOM_MULTIPOLYGON: u64 = 4;

/// A decoded PBF tile: addressing plus the boundary features it carries.
#[derive(Debug, Clone, PartialEq)]
pub struct TileData {
    /// Detail level of the pyramid this tile belongs to.
    pub level: DetailLevel,
    /// Tile address within the pyramid.
    pub coord: TileCoord,
    /// Coordinate precision in decimal digits.
    pub precision: u8,
    /// Boundary features intersecting this tile.
    pub features: Vec<TileFeature>,
}

impl TileData {
    /// Create an empty tile at the default precision.
    pub fn new(level: DetailLevel, coord: TileCoord) -> Self {
        Self {
            level,
            coord,
            precision: DEFAULT_PRECISION,
            features: Vec::new(),
        }
    }

    /// Encode this tile to protobuf wire format.
    pub fn encode(&self) -> Vec<u8> {
        let precision = self.precision.min(MAX_PRECISION);
        let scale = 10f64.powi(precision as i32);

        let mut buf = Vec::with_capacity(64 + self.features.len() * 128);
        write_field_uvarint(&mut buf, TILE_VERSION, TILE_FORMAT_VERSION);
        write_field_uvarint(&mut buf, TILE_PRECISION, precision as u64);
        write_field_uvarint(&mut buf, TILE_LEVEL, self.level.index() as u64);
        write_field_uvarint(&mut buf, TILE_ZOOM, self.coord.zoom as u64);
        write_field_uvarint(&mut buf, TILE_X, self.coord.x as u64);
        write_field_uvarint(&mut buf, TILE_Y, self.coord.y as u64);

        for feature in &self.features {
            let encoded = feature.encode(scale);
            write_field_bytes(&mut buf, TILE_FEATURE, &encoded);
        }
        buf
    }

    /// Decode a tile from protobuf wire format.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut pos = 0;
        let mut version = None;
        let mut precision = DEFAULT_PRECISION as u64;
        let mut level = None;
        let mut zoom: u64 = 0;
        let mut x: u64 = 0;
        let mut y: u64 = 0;
        let mut raw_features: Vec<&[u8]> = Vec::new();

        while pos < bytes.len() {
            let (field, wire) = read_tag(bytes, &mut pos)?;
            match (field, wire) {
                (TILE_VERSION, WIRE_VARINT) => version = Some(read_uvarint(bytes, &mut pos)?),
                (TILE_PRECISION, WIRE_VARINT) => precision = read_uvarint(bytes, &mut pos)?,
                (TILE_LEVEL, WIRE_VARINT) => level = Some(read_uvarint(bytes, &mut pos)?),
                (TILE_ZOOM, WIRE_VARINT) => zoom = read_uvarint(bytes, &mut pos)?,
                (TILE_X, WIRE_VARINT) => x = read_uvarint(bytes, &mut pos)?,
                (TILE_Y, WIRE_VARINT) => y = read_uvarint(bytes, &mut pos)?,
                (TILE_FEATURE, WIRE_LEN) => raw_features.push(read_bytes(bytes, &mut pos)?),
                _ => skip_field(bytes, &mut pos, wire)?,
            }
        }

        let version = version.ok_or(CodecError::UnsupportedVersion(0))?;
        if version != TILE_FORMAT_VERSION {
            return Err(CodecError::UnsupportedVersion(version));
        }
        if precision > MAX_PRECISION as u64 {
            return Err(CodecError::MalformedGeometry("precision too large"));
        }
        let level = level.ok_or(CodecError::UnknownLevel(u64::MAX))?;
        let level = u8::try_from(level)
            .ok()
            .and_then(DetailLevel::from_index)
            .ok_or(CodecError::UnknownLevel(level))?;

        if zoom > MAX_ZOOM as u64 {
            return Err(CodecError::InvalidTileCoord { zoom, x, y });
        }
        let max_index = 1u64 << zoom;
        if x >= max_index || y >= max_index {
            return Err(CodecError::InvalidTileCoord { zoom, x, y });
        }

        let scale = 10f64.powi(precision as i32);
        let mut features = Vec::with_capacity(raw_features.len());
        for raw in raw_features {
            features.push(TileFeature::decode(raw, scale)?);
        }

        Ok(Self {
            level,
            coord: TileCoord {
                x: x as u32,
                y: y as u32,
                zoom: zoom as u8,
            },
            precision: precision as u8,
            features,
        })
    }
}

/// One boundary feature inside a tile.
#[derive(Debug, Clone, PartialEq)]
pub struct TileFeature {
    /// Country code the feature belongs to (e.g. "FRA").
    pub country: String,
    /// Display name.
    pub name: String,
    /// Optional JSON blob of extra properties.
    pub properties: Option<String>,
    /// Feature geometry in geographic coordinates.
    pub geometry: TileGeometry,
}

impl TileFeature {
    fn encode(&self, scale: f64) -> Vec<u8> {
        let mut buf = Vec::with_capacity(64);
        write_field_bytes(&mut buf, FEATURE_COUNTRY, self.country.as_bytes());
        write_field_bytes(&mut buf, FEATURE_NAME, self.name.as_bytes());
        if let Some(props) = &self.properties {
            write_field_bytes(&mut buf, FEATURE_PROPERTIES, props.as_bytes());
        }
        let geom = self.geometry.encode(scale);
        write_field_bytes(&mut buf, FEATURE_GEOMETRY, &geom);
        buf
    }

    fn decode(bytes: &[u8], scale: f64) -> Result<Self, CodecError> {
        let mut pos = 0;
        let mut country = String::new();
        let mut name = String::new();
        let mut properties = None;
        let mut geometry = None;

        while pos < bytes.len() {
            let (field, wire) = read_tag(bytes, &mut pos)?;
            match (field, wire) {
                (FEATURE_COUNTRY, WIRE_LEN) => {
                    country = String::from_utf8(read_bytes(bytes, &mut pos)?.to_vec())?;
                }
                (FEATURE_NAME, WIRE_LEN) => {
                    name = String::from_utf8(read_bytes(bytes, &mut pos)?.to_vec())?;
                }
                (FEATURE_PROPERTIES, WIRE_LEN) => {
                    properties = Some(String::from_utf8(read_bytes(bytes, &mut pos)?.to_vec())?);
                }
                (FEATURE_GEOMETRY, WIRE_LEN) => {
                    geometry = Some(TileGeometry::decode(read_bytes(bytes, &mut pos)?, scale)?);
                }
                _ => skip_field(bytes, &mut pos, wire)?,
            }
        }

        let geometry = geometry.ok_or(CodecError::MalformedGeometry("feature has no geometry"))?;
        Ok(Self {
            country,
            name,
            properties,
            geometry,
        })
    }
}

/// Feature geometry variants the tile format carries.
///
/// Coordinates are `(lon, lat)` pairs in degrees. Polygon rings follow
/// GeoJSON conventions: the first ring is the exterior, the rest are holes.
#[derive(Debug, Clone, PartialEq)]
pub enum TileGeometry {
    /// A single position (e.g. a capital marker).
    Point { lon: f64, lat: f64 },
    /// An open polyline.
    LineString(Vec<(f64, f64)>),
    /// A single polygon as a list of rings.
    Polygon(Vec<Vec<(f64, f64)>>),
    /// A collection of polygons.
    MultiPolygon(Vec<Vec<Vec<(f64, f64)>>>),
}

impl TileGeometry {
    /// Bounding box over all coordinates, `None` for empty geometries.
    pub fn bbox(&self) -> Option<LonLatBBox> {
        let mut bbox: Option<LonLatBBox> = None;
        self.for_each_coord(&mut |lon, lat| match bbox.as_mut() {
            Some(b) => b.expand(lon, lat),
            None => bbox = Some(LonLatBBox::from_point(lon, lat)),
        });
        bbox
    }

    /// Total number of coordinate pairs.
    pub fn coord_count(&self) -> usize {
        let mut count = 0;
        self.for_each_coord(&mut |_, _| count += 1);
        count
    }

    fn for_each_coord(&self, f: &mut impl FnMut(f64, f64)) {
        match self {
            TileGeometry::Point { lon, lat } => f(*lon, *lat),
            TileGeometry::LineString(line) => {
                for &(lon, lat) in line {
                    f(lon, lat);
                }
            }
            TileGeometry::Polygon(rings) => {
                for ring in rings {
                    for &(lon, lat) in ring {
                        f(lon, lat);
                    }
                }
            }
            TileGeometry::MultiPolygon(polys) => {
                for rings in polys {
                    for ring in rings {
                        for &(lon, lat) in ring {
                            f(lon, lat);
                        }
                    }
                }
            }
        }
    }

    /// Convert from a GeoJSON geometry value.
    ///
    /// Returns `None` for geometry types the tile format does not carry
    /// (multipoints, multilinestrings, geometry collections).
    pub fn from_geojson(value: &geojson::Value) -> Option<Self> {
        fn pair(position: &[f64]) -> Option<(f64, f64)> {
            match position {
                [lon, lat, ..] => Some((*lon, *lat)),
                _ => None,
            }
        }
        fn ring(positions: &[Vec<f64>]) -> Option<Vec<(f64, f64)>> {
            positions.iter().map(|p| pair(p)).collect()
        }

        match value {
            geojson::Value::Point(position) => {
                let (lon, lat) = pair(position)?;
                Some(TileGeometry::Point { lon, lat })
            }
            geojson::Value::LineString(positions) => Some(TileGeometry::LineString(ring(positions)?)),
            geojson::Value::Polygon(rings) => Some(TileGeometry::Polygon(
                rings.iter().map(|r| ring(r)).collect::<Option<_>>()?,
            )),
            geojson::Value::MultiPolygon(polys) => Some(TileGeometry::MultiPolygon(
                polys
                    .iter()
                    .map(|rings| rings.iter().map(|r| ring(r)).collect::<Option<_>>())
                    .collect::<Option<_>>()?,
            )),
            _ => None,
        }
    }

    /// Convert back to a GeoJSON geometry value.
    pub fn to_geojson(&self) -> geojson::Value {
        fn positions(ring: &[(f64, f64)]) -> Vec<Vec<f64>> {
            ring.iter().map(|&(lon, lat)| vec![lon, lat]).collect()
        }

        match self {
            TileGeometry::Point { lon, lat } => geojson::Value::Point(vec![*lon, *lat]),
            TileGeometry::LineString(line) => geojson::Value::LineString(positions(line)),
            TileGeometry::Polygon(rings) => {
                geojson::Value::Polygon(rings.iter().map(|r| positions(r)).collect())
            }
            TileGeometry::MultiPolygon(polys) => geojson::Value::MultiPolygon(
                polys
                    .iter()
                    .map(|rings| rings.iter().map(|r| positions(r)).collect())
                    .collect(),
            ),
        }
    }

    fn encode(&self, scale: f64) -> Vec<u8> {
        let mut lengths: Vec<u64> = Vec::new();
        let mut coords: Vec<u8> = Vec::new();
        let type_tag;

        match self {
            TileGeometry::Point { lon, lat } => {
                type_tag = GEOM_POINT;
                encode_ring(&mut coords, &[(*lon, *lat)], scale);
            }
            TileGeometry::LineString(line) => {
                type_tag = GEOM_LINESTRING;
                encode_ring(&mut coords, line, scale);
            }
            TileGeometry::Polygon(rings) => {
                type_tag = GEOM_POLYGON;
                for ring in rings {
                    lengths.push(ring.len() as u64);
                    encode_ring(&mut coords, ring, scale);
                }
            }
            TileGeometry::MultiPolygon(polys) => {
                type_tag = GEOM_MULTIPOLYGON;
                lengths.push(polys.len() as u64);
                for rings in polys {
                    lengths.push(rings.len() as u64);
                    for ring in rings {
                        lengths.push(ring.len() as u64);
                        encode_ring(&mut coords, ring, scale);
                    }
                }
            }
        }

        let mut buf = Vec::with_capacity(coords.len() + 16);
        write_field_uvarint(&mut buf, GEOM_TYPE, type_tag);
        if !lengths.is_empty() {
            let mut packed = Vec::with_capacity(lengths.len() * 2);
            for len in &lengths {
                write_uvarint(&mut packed, *len);
            }
            write_field_bytes(&mut buf, GEOM_LENGTHS, &packed);
        }
        if !coords.is_empty() {
            write_field_bytes(&mut buf, GEOM_COORDS, &coords);
        }
        buf
    }

    fn decode(bytes: &[u8], scale: f64) -> Result<Self, CodecError> {
        let mut pos = 0;
        let mut type_tag = None;
        let mut lengths: Vec<u64> = Vec::new();
        let mut raw_coords: &[u8] = &[];

        while pos < bytes.len() {
            let (field, wire) = read_tag(bytes, &mut pos)?;
            match (field, wire) {
                (GEOM_TYPE, WIRE_VARINT) => type_tag = Some(read_uvarint(bytes, &mut pos)?),
                (GEOM_LENGTHS, WIRE_LEN) => {
                    let packed = read_bytes(bytes, &mut pos)?;
                    let mut p = 0;
                    while p < packed.len() {
                        lengths.push(read_uvarint(packed, &mut p)?);
                    }
                }
                (GEOM_COORDS, WIRE_LEN) => raw_coords = read_bytes(bytes, &mut pos)?,
                _ => skip_field(bytes, &mut pos, wire)?,
            }
        }

        let type_tag = type_tag.ok_or(CodecError::MalformedGeometry("geometry has no type"))?;
        let mut reader = RingReader {
            bytes: raw_coords,
            pos: 0,
            scale,
        };

        let geometry = match type_tag {
            GEOM_POINT => {
                let ring = reader.read_ring(1)?;
                let (lon, lat) = ring[0];
                TileGeometry::Point { lon, lat }
            }
            GEOM_LINESTRING => {
                let line = reader.read_remaining()?;
                TileGeometry::LineString(line)
            }
            GEOM_POLYGON => {
                let mut rings = Vec::with_capacity(lengths.len());
                for len in &lengths {
                    rings.push(reader.read_ring(*len as usize)?);
                }
                TileGeometry::Polygon(rings)
            }
            GEOM_MULTIPOLYGON => {
                let mut cursor = lengths.iter().copied();
                let poly_count = cursor
                    .next()
                    .ok_or(CodecError::MalformedGeometry("multipolygon has no counts"))?;
                // Every polygon consumes at least one further length entry,
                // so the counts are bounded by the length table itself.
                if poly_count as usize > lengths.len() {
                    return Err(CodecError::MalformedGeometry(
                        "polygon count exceeds length table",
                    ));
                }
                let mut polys = Vec::with_capacity(poly_count as usize);
                for _ in 0..poly_count {
                    let ring_count = cursor
                        .next()
                        .ok_or(CodecError::MalformedGeometry("missing ring count"))?;
                    if ring_count as usize > lengths.len() {
                        return Err(CodecError::MalformedGeometry(
                            "ring count exceeds length table",
                        ));
                    }
                    let mut rings = Vec::with_capacity(ring_count as usize);
                    for _ in 0..ring_count {
                        let len = cursor
                            .next()
                            .ok_or(CodecError::MalformedGeometry("missing ring length"))?;
                        rings.push(reader.read_ring(len as usize)?);
                    }
                    polys.push(rings);
                }
                TileGeometry::MultiPolygon(polys)
            }
            other => return Err(CodecError::UnknownGeometryType(other)),
        };

        if !reader.at_end() {
            return Err(CodecError::MalformedGeometry("trailing coordinates"));
        }
        Ok(geometry)
    }
}

/// Incremental reader over the packed delta-encoded coordinate stream.
struct RingReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    scale: f64,
}

impl RingReader<'_> {
    /// Read one ring of `len` points; deltas restart at each ring.
    fn read_ring(&mut self, len: usize) -> Result<Vec<(f64, f64)>, CodecError> {
        // Each point takes at least two varint bytes; a length table that
        // promises more points than the stream can hold is corrupt.
        let remaining = self.bytes.len() - self.pos;
        if len > remaining / 2 {
            return Err(CodecError::MalformedGeometry(
                "ring length exceeds coordinate data",
            ));
        }
        let mut ring = Vec::with_capacity(len);
        let mut qx: i64 = 0;
        let mut qy: i64 = 0;
        for _ in 0..len {
            qx = qx.wrapping_add(read_svarint(self.bytes, &mut self.pos)?);
            qy = qy.wrapping_add(read_svarint(self.bytes, &mut self.pos)?);
            ring.push((qx as f64 / self.scale, qy as f64 / self.scale));
        }
        Ok(ring)
    }

    /// Read pairs until the stream is exhausted (linestrings carry no
    /// length table).
    fn read_remaining(&mut self) -> Result<Vec<(f64, f64)>, CodecError> {
        let mut line = Vec::new();
        let mut qx: i64 = 0;
        let mut qy: i64 = 0;
        while self.pos < self.bytes.len() {
            qx = qx.wrapping_add(read_svarint(self.bytes, &mut self.pos)?);
            qy = qy.wrapping_add(read_svarint(self.bytes, &mut self.pos)?);
            line.push((qx as f64 / self.scale, qy as f64 / self.scale));
        }
        Ok(line)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }
}

fn encode_ring(buf: &mut Vec<u8>, ring: &[(f64, f64)], scale: f64) {
    let mut prev_x: i64 = 0;
    let mut prev_y: i64 = 0;
    for &(lon, lat) in ring {
        let qx = (lon * scale).round() as i64;
        let qy = (lat * scale).round() as i64;
        write_svarint(buf, qx.wrapping_sub(prev_x));
        write_svarint(buf, qy.wrapping_sub(prev_y));
        prev_x = qx;
        prev_y = qy;
    }
}

fn write_field_uvarint(buf: &mut Vec<u8>, field: u32, value: u64) {
    write_uvarint(buf, ((field as u64) << 3) | WIRE_VARINT as u64);
    write_uvarint(buf, value);
}

fn write_field_bytes(buf: &mut Vec<u8>, field: u32, bytes: &[u8]) {
    write_uvarint(buf, ((field as u64) << 3) | WIRE_LEN as u64);
    write_uvarint(buf, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

fn read_tag(bytes: &[u8], pos: &mut usize) -> Result<(u32, u8), CodecError> {
    let tag = read_uvarint(bytes, pos)?;
    Ok(((tag >> 3) as u32, (tag & 0x7) as u8))
}

fn read_bytes<'a>(bytes: &'a [u8], pos: &mut usize) -> Result<&'a [u8], CodecError> {
    let len = read_uvarint(bytes, pos)?;
    let remaining = bytes.len() - *pos;
    if len > remaining as u64 {
        return Err(CodecError::TruncatedField {
            length: len,
            remaining,
        });
    }
    let slice = &bytes[*pos..*pos + len as usize];
    *pos += len as usize;
    Ok(slice)
}

/// Skip a field of the given wire type, for forward compatibility with
/// fields this decoder does not know.
fn skip_field(bytes: &[u8], pos: &mut usize, wire: u8) -> Result<(), CodecError> {
    match wire {
        WIRE_VARINT => {
            read_uvarint(bytes, pos)?;
        }
        WIRE_LEN => {
            read_bytes(bytes, pos)?;
        }
        WIRE_FIXED64 => {
            if bytes.len() - *pos < 8 {
                return Err(CodecError::UnexpectedEof);
            }
            *pos += 8;
        }
        WIRE_FIXED32 => {
            if bytes.len() - *pos < 4 {
                return Err(CodecError::UnexpectedEof);
            }
            *pos += 4;
        }
        other => return Err(CodecError::UnknownWireType(other)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a coordinate already on the default precision grid so that
    /// encode/decode round-trips exactly.
    fn grid(micro_lon: i64, micro_lat: i64) -> (f64, f64) {
        (micro_lon as f64 / 1e6, micro_lat as f64 / 1e6)
    }

    fn square(origin_lon: i64, origin_lat: i64, size: i64) -> Vec<(f64, f64)> {
        vec![
            grid(origin_lon, origin_lat),
            grid(origin_lon + size, origin_lat),
            grid(origin_lon + size, origin_lat + size),
            grid(origin_lon, origin_lat + size),
            grid(origin_lon, origin_lat),
        ]
    }

    fn sample_tile() -> TileData {
        let mut tile = TileData::new(
            DetailLevel::Detailed,
            TileCoord { x: 33, y: 21, zoom: 6 },
        );
        tile.features.push(TileFeature {
            country: "FRA".to_string(),
            name: "France".to_string(),
            properties: Some(r#"{"region":"eur"}"#.to_string()),
            geometry: TileGeometry::Polygon(vec![square(2_000_000, 46_000_000, 3_000_000)]),
        });
        tile.features.push(TileFeature {
            country: "CHE".to_string(),
            name: "Switzerland".to_string(),
            properties: None,
            geometry: TileGeometry::MultiPolygon(vec![
                vec![square(7_000_000, 46_500_000, 500_000)],
                vec![
                    square(8_000_000, 47_000_000, 400_000),
                    square(8_100_000, 47_100_000, 100_000),
                ],
            ]),
        });
        tile
    }

    #[test]
    fn test_tile_roundtrip() {
        let tile = sample_tile();
        let encoded = tile.encode();
        let decoded = TileData::decode(&encoded).unwrap();
        assert_eq!(decoded, tile);
    }

    #[test]
    fn test_empty_tile_roundtrip() {
        let tile = TileData::new(DetailLevel::Overview, TileCoord { x: 0, y: 0, zoom: 0 });
        let decoded = TileData::decode(&tile.encode()).unwrap();
        assert_eq!(decoded, tile);
        assert!(decoded.features.is_empty());
    }

    #[test]
    fn test_point_and_linestring_roundtrip() {
        let mut tile = TileData::new(DetailLevel::Ultra, TileCoord { x: 530, y: 350, zoom: 10 });
        tile.features.push(TileFeature {
            country: "FRA".to_string(),
            name: "Paris".to_string(),
            properties: None,
            geometry: TileGeometry::Point {
                lon: 2.352_222,
                lat: 48.856_614,
            },
        });
        tile.features.push(TileFeature {
            country: "FRA".to_string(),
            name: "Seine".to_string(),
            properties: None,
            geometry: TileGeometry::LineString(vec![
                grid(2_300_000, 48_800_000),
                grid(2_400_000, 48_900_000),
                grid(2_500_000, 48_850_000),
            ]),
        });
        let decoded = TileData::decode(&tile.encode()).unwrap();
        assert_eq!(decoded, tile);
    }

    #[test]
    fn test_quantization_error_bound() {
        // An off-grid coordinate moves by at most half a grid step.
        let mut tile = TileData::new(DetailLevel::Overview, TileCoord { x: 0, y: 0, zoom: 0 });
        let lon = 12.345_678_901;
        let lat = -45.987_654_321;
        tile.features.push(TileFeature {
            country: "X".to_string(),
            name: String::new(),
            properties: None,
            geometry: TileGeometry::Point { lon, lat },
        });

        let decoded = TileData::decode(&tile.encode()).unwrap();
        match decoded.features[0].geometry {
            TileGeometry::Point {
                lon: dlon,
                lat: dlat,
            } => {
                assert!((dlon - lon).abs() <= 0.5e-6);
                assert!((dlat - lat).abs() <= 0.5e-6);
            }
            ref other => panic!("unexpected geometry {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejects_wrong_version() {
        let mut tile = sample_tile();
        tile.precision = DEFAULT_PRECISION;
        let mut encoded = tile.encode();
        // First two bytes are the version field: tag 0x08, value
        assert_eq!(encoded[0], 0x08);
        encoded[1] = 99;
        assert!(matches!(
            TileData::decode(&encoded),
            Err(CodecError::UnsupportedVersion(99))
        ));
    }

    #[test]
    fn test_decode_rejects_bad_tile_coord() {
        let tile = TileData::new(DetailLevel::Overview, TileCoord { x: 1, y: 0, zoom: 0 });
        // x=1 is out of range at zoom 0
        assert!(matches!(
            TileData::decode(&tile.encode()),
            Err(CodecError::InvalidTileCoord { .. })
        ));
    }

    #[test]
    fn test_decode_empty_input() {
        assert!(matches!(
            TileData::decode(&[]),
            Err(CodecError::UnsupportedVersion(0))
        ));
    }

    #[test]
    fn test_decode_truncated_feature() {
        let encoded = sample_tile().encode();
        let truncated = &encoded[..encoded.len() - 3];
        assert!(TileData::decode(truncated).is_err());
    }

    #[test]
    fn test_decode_skips_unknown_fields() {
        // Append an unknown varint field (field 15) to a valid tile;
        // decoders must ignore it.
        let tile = sample_tile();
        let mut encoded = tile.encode();
        write_field_uvarint(&mut encoded, 15, 12345);
        let decoded = TileData::decode(&encoded).unwrap();
        assert_eq!(decoded, tile);
    }

    #[test]
    fn test_geometry_bbox() {
        let geom = TileGeometry::Polygon(vec![square(2_000_000, 46_000_000, 3_000_000)]);
        let bbox = geom.bbox().unwrap();
        assert_eq!(bbox, LonLatBBox::new(2.0, 46.0, 5.0, 49.0));
    }

    #[test]
    fn test_geometry_from_geojson_polygon() {
        let value = geojson::Value::Polygon(vec![vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![0.0, 0.0],
        ]]);
        let geom = TileGeometry::from_geojson(&value).unwrap();
        assert_eq!(geom.coord_count(), 4);
        assert_eq!(geom.to_geojson(), value);
    }

    #[test]
    fn test_geometry_from_geojson_unsupported() {
        let value = geojson::Value::MultiPoint(vec![vec![0.0, 0.0]]);
        assert!(TileGeometry::from_geojson(&value).is_none());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        /// Strategy producing grid-aligned rings (3 to 12 points).
        fn ring_strategy() -> impl Strategy<Value = Vec<(f64, f64)>> {
            prop::collection::vec(
                (-179_000_000i64..179_000_000, -85_000_000i64..85_000_000),
                3..12,
            )
            .prop_map(|points| points.into_iter().map(|(x, y)| grid(x, y)).collect())
        }

        proptest! {
            #[test]
            fn test_polygon_roundtrip(rings in prop::collection::vec(ring_strategy(), 1..4)) {
                let mut tile = TileData::new(
                    DetailLevel::Detailed,
                    TileCoord { x: 0, y: 0, zoom: 0 },
                );
                tile.features.push(TileFeature {
                    country: "AAA".to_string(),
                    name: "prop".to_string(),
                    properties: None,
                    geometry: TileGeometry::Polygon(rings),
                });
                let decoded = TileData::decode(&tile.encode()).unwrap();
                prop_assert_eq!(decoded, tile);
            }

            #[test]
            fn test_multipolygon_roundtrip(
                polys in prop::collection::vec(
                    prop::collection::vec(ring_strategy(), 1..3),
                    1..4,
                )
            ) {
                let mut tile = TileData::new(
                    DetailLevel::Ultra,
                    TileCoord { x: 5, y: 9, zoom: 8 },
                );
                tile.features.push(TileFeature {
                    country: "BBB".to_string(),
                    name: "multi".to_string(),
                    properties: Some("{}".to_string()),
                    geometry: TileGeometry::MultiPolygon(polys),
                });
                let decoded = TileData::decode(&tile.encode()).unwrap();
                prop_assert_eq!(decoded, tile);
            }

            #[test]
            fn test_decode_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
                let _ = TileData::decode(&bytes);
            }
        }
    }
}
