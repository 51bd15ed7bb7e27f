//! End-to-end pipeline test: world GeoJSON in, loader query out.
//!
//! Runs the full chain - split, simplify, tile, then a bounding-box query
//! through the tile loader over the freshly written tile tree.

use std::sync::Arc;

use serde_json::json;

use provatlas::boundary::BoundaryFile;
use provatlas::coord::DetailLevel;
use provatlas::geometry::LonLatBBox;
use provatlas::loader::TileLoader;
use provatlas::pipeline::{build_tiles, simplify_boundaries, split_world, SplitOptions};
use provatlas::source::DirectoryTileSource;

fn world_json() -> String {
    // Two countries and one unassignable feature
    json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"ISO_A3": "FRA", "ADMIN": "France"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[
                        [-1.0, 43.5], [0.2, 43.4], [2.0, 43.0], [4.5, 43.6],
                        [6.5, 44.0], [7.0, 45.8], [6.1, 46.3], [7.5, 47.6],
                        [8.2, 48.9], [6.4, 49.5], [4.2, 49.9], [2.5, 51.0],
                        [1.6, 50.9], [-1.8, 49.7], [-1.1, 48.6], [-2.5, 47.6],
                        [-1.2, 46.3], [-1.2, 44.6], [-1.0, 43.5]
                    ]]
                }
            },
            {
                "type": "Feature",
                "properties": {"ISO_A3": "ESP", "ADMIN": "Spain"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[
                        [-9.3, 36.0], [-7.0, 37.2], [-2.0, 36.7], [0.2, 38.9],
                        [3.3, 41.9], [0.7, 42.8], [-1.8, 43.4], [-7.7, 43.8],
                        [-9.3, 42.6], [-8.9, 38.6], [-9.3, 36.0]
                    ]]
                }
            },
            {
                "type": "Feature",
                "properties": {"ISO_A3": "-99", "ADMIN": "Disputed"},
                "geometry": {"type": "Point", "coordinates": [0.0, 0.0]}
            }
        ]
    })
    .to_string()
}

#[tokio::test]
async fn full_pipeline_produces_queryable_tiles() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("world.geojson");
    std::fs::write(&source, world_json()).unwrap();

    let boundaries = dir.path().join("boundaries/source");
    let split_summary = split_world(&source, &boundaries, &SplitOptions::default()).unwrap();
    assert_eq!(split_summary.files_written, 2);
    assert_eq!(split_summary.features_skipped, 1);

    // Split output validates as boundary files
    let fra = BoundaryFile::read(&boundaries.join("FRA.geojson")).unwrap();
    assert_eq!(fra.game.display_name, "France");
    assert_eq!(fra.game.region, "eur");

    // Simplify and tile each level
    let tiles_root = dir.path().join("tiles");
    for level in DetailLevel::ALL {
        let level_dir = dir.path().join("boundaries").join(level.code());
        let simplified =
            simplify_boundaries(&boundaries, &level_dir, level, level.tolerance()).unwrap();
        assert_eq!(simplified.files_written, 2, "level {}", level);

        let tiled = build_tiles(&level_dir, &tiles_root, level, level.zoom_range()).unwrap();
        assert!(tiled.tiles_written > 0, "level {}", level);
    }

    // Query western Europe through the loader
    let loader = TileLoader::new(
        Arc::new(DirectoryTileSource::new(&tiles_root)),
        4 * 1024 * 1024,
    );
    let bbox = LonLatBBox::new(-10.0, 35.0, 10.0, 52.0);
    let query = loader
        .features_in_bbox(DetailLevel::Detailed, 5, &bbox)
        .await
        .unwrap();

    assert!(query.is_complete());
    let mut countries: Vec<_> = query.features.iter().map(|f| f.country.clone()).collect();
    countries.sort();
    assert_eq!(countries, vec!["ESP", "FRA"]);

    // A second query hits the cache for every tile it loaded before
    let before = loader.metrics().snapshot();
    let again = loader
        .features_in_bbox(DetailLevel::Detailed, 5, &bbox)
        .await
        .unwrap();
    assert_eq!(again.features.len(), query.features.len());
    let after = loader.metrics().snapshot();
    assert_eq!(
        after.tiles_fetched, before.tiles_fetched,
        "repeat query must not hit the source"
    );
    assert!(after.cache_hits > before.cache_hits);
    assert!(loader.cache().entry_count() > 0);
    assert!(loader.cache().size_bytes() <= loader.cache().max_size_bytes());
}

#[tokio::test]
async fn query_outside_coverage_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("world.geojson");
    std::fs::write(&source, world_json()).unwrap();

    let boundaries = dir.path().join("boundaries/source");
    split_world(&source, &boundaries, &SplitOptions::default()).unwrap();

    let level = DetailLevel::Overview;
    let level_dir = dir.path().join("boundaries/overview");
    simplify_boundaries(&boundaries, &level_dir, level, level.tolerance()).unwrap();
    let tiles_root = dir.path().join("tiles");
    build_tiles(&level_dir, &tiles_root, level, level.zoom_range()).unwrap();

    let loader = TileLoader::new(Arc::new(DirectoryTileSource::new(&tiles_root)), 1024 * 1024);

    // Middle of the Pacific: tiles are absent, not errors
    let bbox = LonLatBBox::new(-160.0, -10.0, -150.0, 0.0);
    let query = loader.features_in_bbox(level, 3, &bbox).await.unwrap();

    assert!(query.is_complete());
    assert!(query.features.is_empty());
    assert_eq!(query.tiles_loaded, 0);
    assert!(query.tiles_absent > 0);
}
