//! On-demand tile loading.
//!
//! [`TileLoader`] ties the pieces together: cache first, then the source,
//! decode on the way out. Raw encoded bytes are what gets cached, so the
//! cache budget is measured in the same units as the wire format.
//!
//! Bounding-box queries enumerate the intersecting tiles, load each one,
//! and filter features by bbox intersection. Failures are handled per tile:
//! a broken tile is skipped with a warning and reported in the query result
//! rather than failing the whole query.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::TileCache;
use crate::codec::{CodecError, TileData, TileFeature};
use crate::coord::{tiles_for_bbox, CoordError, DetailLevel, TileCoord};
use crate::geometry::LonLatBBox;
use crate::source::{SourceError, TileSource};
use crate::telemetry::LoaderMetrics;

/// Errors from loading a single tile.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The source failed to produce the tile bytes.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The tile bytes did not decode.
    #[error("failed to decode tile {tile}: {source}")]
    Decode {
        /// Address of the broken tile.
        tile: TileCoord,
        #[source]
        source: CodecError,
    },
}

/// Result of a bounding-box feature query.
///
/// Queries are best-effort: features from loadable tiles are returned even
/// when some tiles fail, and the failures are listed in `skipped`.
#[derive(Debug, Default)]
pub struct BboxQuery {
    /// Features whose bbox intersects the query bbox, deduplicated by
    /// country code across tiles.
    pub features: Vec<TileFeature>,
    /// Tiles that existed and decoded.
    pub tiles_loaded: usize,
    /// Tiles the source has no data for.
    pub tiles_absent: usize,
    /// Tiles that failed to load or decode.
    pub skipped: Vec<SkippedTile>,
}

impl BboxQuery {
    /// Returns true if no tile had to be skipped.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// A tile dropped from a query, with the reason.
#[derive(Debug)]
pub struct SkippedTile {
    /// Address of the skipped tile.
    pub tile: TileCoord,
    /// Human-readable failure description.
    pub reason: String,
}

/// Cache-first tile loader.
pub struct TileLoader {
    source: Arc<dyn TileSource>,
    cache: TileCache,
    metrics: Arc<LoaderMetrics>,
}

impl TileLoader {
    /// Create a loader over a source, with a cache of the given byte budget.
    pub fn new(source: Arc<dyn TileSource>, cache_size_bytes: u64) -> Self {
        let metrics = Arc::new(LoaderMetrics::new());
        Self {
            cache: TileCache::with_metrics(cache_size_bytes, Arc::clone(&metrics)),
            source,
            metrics,
        }
    }

    /// Metrics recorded by this loader.
    pub fn metrics(&self) -> &Arc<LoaderMetrics> {
        &self.metrics
    }

    /// The loader's tile cache, for status displays.
    pub fn cache(&self) -> &TileCache {
        &self.cache
    }

    /// Load and decode one tile.
    ///
    /// Checks the cache first; on a miss the source is consulted and the
    /// raw bytes are cached before decoding. `Ok(None)` means the source
    /// has no such tile, which is normal for ocean tiles and is not cached.
    pub async fn load(
        &self,
        level: DetailLevel,
        tile: TileCoord,
    ) -> Result<Option<TileData>, LoadError> {
        if let Some(bytes) = self.cache.get(level, tile).await {
            return self.decode(tile, &bytes).map(Some);
        }

        match self.source.fetch(level, tile).await {
            Ok(Some(bytes)) => {
                self.metrics.tile_fetched(bytes.len());
                debug!(tile = %tile, level = %level, bytes = bytes.len(), "tile fetched");
                let bytes = self.cache.insert(level, tile, bytes).await;
                self.decode(tile, &bytes).map(Some)
            }
            Ok(None) => {
                self.metrics.tile_absent();
                Ok(None)
            }
            Err(e) => {
                self.metrics.fetch_failure();
                Err(e.into())
            }
        }
    }

    /// Collect all features intersecting `bbox` at the given level/zoom.
    ///
    /// Tiles that fail to load are skipped with a warning and reported in
    /// the result; the query itself only fails for invalid input.
    pub async fn features_in_bbox(
        &self,
        level: DetailLevel,
        zoom: u8,
        bbox: &LonLatBBox,
    ) -> Result<BboxQuery, CoordError> {
        let range = tiles_for_bbox(bbox, zoom)?;

        let mut query = BboxQuery::default();
        let mut seen_countries: HashSet<String> = HashSet::new();

        for tile in range {
            match self.load(level, tile).await {
                Ok(Some(data)) => {
                    query.tiles_loaded += 1;
                    for feature in data.features {
                        let intersects = feature
                            .geometry
                            .bbox()
                            .is_some_and(|b| b.intersects(bbox));
                        if intersects && seen_countries.insert(feature.country.clone()) {
                            query.features.push(feature);
                        }
                    }
                }
                Ok(None) => query.tiles_absent += 1,
                Err(e) => {
                    warn!(tile = %tile, error = %e, "skipping unloadable tile");
                    query.skipped.push(SkippedTile {
                        tile,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(query)
    }

    fn decode(&self, tile: TileCoord, bytes: &[u8]) -> Result<TileData, LoadError> {
        TileData::decode(bytes).map_err(|e| {
            self.metrics.decode_failure();
            LoadError::Decode { tile, source: e }
        })
    }
}
