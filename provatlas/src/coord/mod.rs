//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and Web Mercator slippy-map tile coordinates, plus the bounding-box tile
//! enumeration the pipeline and loader share.

mod types;

pub use types::{
    CoordError, DetailLevel, TileCoord, TileRange, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON,
    MIN_ZOOM,
};

use std::f64::consts::PI;

use crate::geometry::LonLatBBox;

/// Converts geographic coordinates to the tile containing them.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees (-85.05112878 to 85.05112878)
/// * `lon` - Longitude in degrees (-180.0 to 180.0)
/// * `zoom` - Zoom level (0 to 12)
///
/// # Returns
///
/// A `Result` containing the tile coordinates or an error if inputs are
/// invalid. Points exactly on the eastern or southern clip edge land in the
/// last tile of their row/column.
#[inline]
pub fn to_tile_coords(lat: f64, lon: f64, zoom: u8) -> Result<TileCoord, CoordError> {
    if !(MIN_LAT..=MAX_LAT).contains(&lat) {
        return Err(CoordError::InvalidLatitude(lat));
    }
    if !(MIN_LON..=MAX_LON).contains(&lon) {
        return Err(CoordError::InvalidLongitude(lon));
    }
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    let n = 2.0_f64.powi(zoom as i32);
    let max_index = (1u32 << zoom) - 1;

    let x = (((lon + 180.0) / 360.0 * n) as u32).min(max_index);

    let lat_rad = lat * PI / 180.0;
    let y = ((((1.0 - lat_rad.tan().asinh() / PI) / 2.0) * n) as u32).min(max_index);

    Ok(TileCoord { x, y, zoom })
}

/// Converts tile coordinates back to geographic coordinates.
///
/// Returns the `(lon, lat)` of the tile's northwest corner.
#[inline]
pub fn tile_to_lon_lat(tile: &TileCoord) -> (f64, f64) {
    let n = 2.0_f64.powi(tile.zoom as i32);

    let lon = tile.x as f64 / n * 360.0 - 180.0;

    let y = tile.y as f64 / n;
    let lat_rad = (PI * (1.0 - 2.0 * y)).sinh().atan();
    let lat = lat_rad * 180.0 / PI;

    (lon, lat)
}

/// Enumerate the tiles at `zoom` whose bounds intersect `bbox`.
///
/// The bbox is clamped to the Web Mercator domain first, so callers may pass
/// feature bboxes that poke past the clip latitudes. Boxes that cross the
/// antimeridian are not split; they clamp to [-180, 180].
pub fn tiles_for_bbox(bbox: &LonLatBBox, zoom: u8) -> Result<TileRange, CoordError> {
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    let min_lon = bbox.min_lon.clamp(MIN_LON, MAX_LON);
    let max_lon = bbox.max_lon.clamp(MIN_LON, MAX_LON);
    let min_lat = bbox.min_lat.clamp(MIN_LAT, MAX_LAT);
    let max_lat = bbox.max_lat.clamp(MIN_LAT, MAX_LAT);

    let northwest = to_tile_coords(max_lat, min_lon, zoom)?;
    let southeast = to_tile_coords(min_lat, max_lon, zoom)?;

    Ok(TileRange {
        zoom,
        x_min: northwest.x,
        x_max: southeast.x,
        y_min: northwest.y,
        y_max: southeast.y,
        next_x: northwest.x,
        next_y: northwest.y,
        exhausted: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_london_at_zoom_10() {
        // London: 51.5074N, 0.1278W sits just west of the meridian
        let tile = to_tile_coords(51.5074, -0.1278, 10).unwrap();
        assert_eq!(tile.x, 511);
        assert_eq!(tile.y, 340);
        assert_eq!(tile.zoom, 10);
    }

    #[test]
    fn test_zoom_zero_is_single_tile() {
        let tile = to_tile_coords(40.0, -74.0, 0).unwrap();
        assert_eq!(tile, TileCoord { x: 0, y: 0, zoom: 0 });
    }

    #[test]
    fn test_invalid_latitude() {
        let result = to_tile_coords(90.0, 0.0, 5);
        assert!(matches!(result, Err(CoordError::InvalidLatitude(_))));
    }

    #[test]
    fn test_invalid_longitude() {
        let result = to_tile_coords(0.0, 181.0, 5);
        assert!(matches!(result, Err(CoordError::InvalidLongitude(_))));
    }

    #[test]
    fn test_invalid_zoom() {
        let result = to_tile_coords(0.0, 0.0, MAX_ZOOM + 1);
        assert!(matches!(result, Err(CoordError::InvalidZoom(_))));
    }

    #[test]
    fn test_eastern_clip_edge_stays_in_range() {
        // lon = 180 must land in the last column, not one past it
        let tile = to_tile_coords(0.0, 180.0, 4).unwrap();
        assert_eq!(tile.x, 15);
    }

    #[test]
    fn test_southern_clip_edge_stays_in_range() {
        let tile = to_tile_coords(MIN_LAT, 0.0, 4).unwrap();
        assert_eq!(tile.y, 15);
    }

    #[test]
    fn test_tile_to_lon_lat_northwest_corner() {
        let tile = TileCoord { x: 0, y: 0, zoom: 1 };
        let (lon, lat) = tile_to_lon_lat(&tile);
        assert_eq!(lon, -180.0);
        assert!((lat - MAX_LAT).abs() < 1e-6);
    }

    #[test]
    fn test_tile_bounds_contain_origin_point() {
        let tile = to_tile_coords(51.5074, -0.1278, 8).unwrap();
        let bounds = tile.bounds();
        assert!(bounds.contains_point(-0.1278, 51.5074));
    }

    #[test]
    fn test_tiles_for_bbox_single_tile() {
        // A tiny bbox well inside one tile
        let bbox = LonLatBBox::new(-0.2, 51.4, -0.1, 51.5);
        let tiles: Vec<_> = tiles_for_bbox(&bbox, 6).unwrap().collect();
        assert_eq!(tiles.len(), 1);
        let expected = to_tile_coords(51.45, -0.15, 6).unwrap();
        assert_eq!(tiles[0], expected);
    }

    #[test]
    fn test_tiles_for_bbox_row_major_order() {
        // Western Europe spans several tiles at zoom 5
        let bbox = LonLatBBox::new(-10.0, 40.0, 15.0, 55.0);
        let range = tiles_for_bbox(&bbox, 5).unwrap();
        let tiles: Vec<_> = range.clone().collect();
        assert_eq!(tiles.len(), range.tile_count());

        for pair in tiles.windows(2) {
            let ordered = pair[0].y < pair[1].y || (pair[0].y == pair[1].y && pair[0].x < pair[1].x);
            assert!(ordered, "tiles out of row-major order: {} then {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_tiles_for_bbox_no_duplicates() {
        let bbox = LonLatBBox::new(-130.0, 20.0, -60.0, 55.0);
        let tiles: Vec<_> = tiles_for_bbox(&bbox, 4).unwrap().collect();
        let mut seen = std::collections::HashSet::new();
        for tile in &tiles {
            assert!(seen.insert(*tile), "duplicate tile {}", tile);
        }
    }

    #[test]
    fn test_tiles_for_bbox_clamps_out_of_domain() {
        // Greenland-style bbox poking past the mercator clip latitude
        let bbox = LonLatBBox::new(-75.0, 59.0, -10.0, 89.0);
        let tiles: Vec<_> = tiles_for_bbox(&bbox, 3).unwrap().collect();
        assert!(!tiles.is_empty());
        for tile in tiles {
            assert!(tile.x < 8 && tile.y < 8);
        }
    }

    #[test]
    fn test_tiles_for_bbox_covers_every_intersecting_tile() {
        let bbox = LonLatBBox::new(-5.0, 45.0, 9.0, 52.0);
        let zoom = 6;
        let covered: std::collections::HashSet<_> =
            tiles_for_bbox(&bbox, zoom).unwrap().collect();

        // Brute-force: every tile at this zoom whose bounds intersect the
        // bbox must be in the range.
        let n = 1u32 << zoom;
        for x in 0..n {
            for y in 0..n {
                let tile = TileCoord { x, y, zoom };
                if tile.bounds().intersects(&bbox) {
                    assert!(covered.contains(&tile), "missing tile {}", tile);
                }
            }
        }
    }

    #[test]
    fn test_detail_level_codes() {
        assert_eq!(DetailLevel::Overview.code(), "overview");
        assert_eq!(DetailLevel::Detailed.code(), "detailed");
        assert_eq!(DetailLevel::Ultra.code(), "ultra");
    }

    #[test]
    fn test_detail_level_tolerance_ordering() {
        // Coarser levels simplify harder
        assert!(DetailLevel::Overview.tolerance() > DetailLevel::Detailed.tolerance());
        assert!(DetailLevel::Detailed.tolerance() > DetailLevel::Ultra.tolerance());
    }

    #[test]
    fn test_detail_level_zoom_ranges_are_contiguous() {
        assert_eq!(*DetailLevel::Overview.zoom_range().start(), 0);
        assert_eq!(
            *DetailLevel::Detailed.zoom_range().start(),
            DetailLevel::Overview.zoom_range().end() + 1
        );
        assert_eq!(
            *DetailLevel::Ultra.zoom_range().start(),
            DetailLevel::Detailed.zoom_range().end() + 1
        );
        assert!(*DetailLevel::Ultra.zoom_range().end() <= MAX_ZOOM);
    }

    #[test]
    fn test_detail_level_index_roundtrip() {
        for level in DetailLevel::ALL {
            assert_eq!(DetailLevel::from_index(level.index()), Some(level));
        }
        assert_eq!(DetailLevel::from_index(3), None);
    }

    #[test]
    fn test_detail_level_from_str() {
        assert_eq!("ultra".parse::<DetailLevel>().unwrap(), DetailLevel::Ultra);
        assert!("mega".parse::<DetailLevel>().is_err());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_tile_coords_in_bounds(
                lat in MIN_LAT..MAX_LAT,
                lon in -180.0..180.0_f64,
                zoom in 0u8..=MAX_ZOOM
            ) {
                let tile = to_tile_coords(lat, lon, zoom)?;
                let max_index = 1u32 << zoom;
                prop_assert!(tile.x < max_index);
                prop_assert!(tile.y < max_index);
                prop_assert_eq!(tile.zoom, zoom);
            }

            #[test]
            fn test_point_within_its_tile_bounds(
                lat in (MIN_LAT + 0.01)..(MAX_LAT - 0.01),
                lon in -179.99..179.99_f64,
                zoom in 0u8..=MAX_ZOOM
            ) {
                let tile = to_tile_coords(lat, lon, zoom)?;
                let bounds = tile.bounds();
                // Allow for float slop of one millionth of a degree at the seams
                prop_assert!(bounds.min_lon - 1e-6 <= lon && lon <= bounds.max_lon + 1e-6);
                prop_assert!(bounds.min_lat - 1e-6 <= lat && lat <= bounds.max_lat + 1e-6);
            }

            #[test]
            fn test_longitude_monotonic(
                lat in 0.0..1.0_f64,
                lon1 in -180.0..-90.0_f64,
                lon2 in -90.0..0.0_f64,
                zoom in 6u8..=MAX_ZOOM
            ) {
                let tile1 = to_tile_coords(lat, lon1, zoom)?;
                let tile2 = to_tile_coords(lat, lon2, zoom)?;
                prop_assert!(tile1.x < tile2.x);
            }

            #[test]
            fn test_bbox_range_tiles_all_intersect(
                min_lon in -170.0..160.0_f64,
                min_lat in -80.0..70.0_f64,
                width in 0.1..20.0_f64,
                height in 0.1..10.0_f64,
                zoom in 0u8..=8
            ) {
                let bbox = LonLatBBox::new(min_lon, min_lat, min_lon + width, min_lat + height);
                let tiles: Vec<_> = tiles_for_bbox(&bbox, zoom)?.collect();
                prop_assert!(!tiles.is_empty());
                for tile in tiles {
                    prop_assert!(
                        tile.bounds().intersects(&bbox),
                        "tile {} does not intersect query bbox", tile
                    );
                }
            }

            #[test]
            fn test_reject_invalid_latitude(
                lat in -90.0..-85.06_f64,
                lon in -180.0..180.0_f64,
                zoom in 0u8..=MAX_ZOOM
            ) {
                let result = to_tile_coords(lat, lon, zoom);
                prop_assert!(matches!(result, Err(CoordError::InvalidLatitude(_))));
            }
        }
    }
}
