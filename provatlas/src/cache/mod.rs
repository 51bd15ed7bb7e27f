//! Byte-size-bounded in-memory tile cache.
//!
//! The loader keeps recently used encoded tiles in memory so panning back
//! over the same map area does not refetch them. The budget bounds total
//! cached bytes, not tile count: an ultra tile full of coastline weighs
//! hundreds of times its empty overview neighbor. Eviction is automatic
//! once the budget is exceeded; there is no manual eviction surface.
//!
//! Backed by moka, whose lock-free internals make lookups and inserts safe
//! from async contexts without blocking the Tokio runtime.

use std::fmt;
use std::sync::Arc;

use moka::future::Cache as MokaCache;

use crate::coord::{DetailLevel, TileCoord};
use crate::telemetry::LoaderMetrics;

/// Cache key: a tile address qualified by its detail level.
///
/// The same z/x/y exists once per pyramid, so the level is part of the
/// tile's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileKey {
    /// Pyramid the tile belongs to.
    pub level: DetailLevel,
    /// Tile address within the pyramid.
    pub coord: TileCoord,
}

impl TileKey {
    /// Create a key from a level and a tile address.
    pub fn new(level: DetailLevel, coord: TileCoord) -> Self {
        Self { level, coord }
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.level.code(), self.coord)
    }
}

/// In-memory cache for encoded PBF tiles.
///
/// Stores tiles as shared `Arc<[u8]>` slices, so a hit hands out the bytes
/// without copying them and an insert can return the same allocation it
/// cached. When metrics are attached, every lookup reports a hit or a miss
/// to loader telemetry.
pub struct TileCache {
    tiles: MokaCache<TileKey, Arc<[u8]>>,
    max_size_bytes: u64,
    metrics: Option<Arc<LoaderMetrics>>,
}

impl TileCache {
    /// Create a cache with the given byte budget.
    pub fn new(max_size_bytes: u64) -> Self {
        Self::build(max_size_bytes, None)
    }

    /// Create a cache that reports hits and misses to loader telemetry.
    pub fn with_metrics(max_size_bytes: u64, metrics: Arc<LoaderMetrics>) -> Self {
        Self::build(max_size_bytes, Some(metrics))
    }

    fn build(max_size_bytes: u64, metrics: Option<Arc<LoaderMetrics>>) -> Self {
        let tiles = MokaCache::builder()
            // An entry costs what its encoded bytes cost. Weights are u32
            // in moka; no single tile comes anywhere near that.
            .weigher(|_key: &TileKey, tile: &Arc<[u8]>| {
                u32::try_from(tile.len()).unwrap_or(u32::MAX)
            })
            .max_capacity(max_size_bytes)
            .build();

        Self {
            tiles,
            max_size_bytes,
            metrics,
        }
    }

    /// Look up an encoded tile.
    pub async fn get(&self, level: DetailLevel, coord: TileCoord) -> Option<Arc<[u8]>> {
        let found = self.tiles.get(&TileKey::new(level, coord)).await;
        if let Some(m) = &self.metrics {
            if found.is_some() {
                m.cache_hit();
            } else {
                m.cache_miss();
            }
        }
        found
    }

    /// Cache an encoded tile, returning the shared bytes.
    ///
    /// The returned slice is the cached allocation, so callers can decode
    /// from it without holding their own copy.
    pub async fn insert(
        &self,
        level: DetailLevel,
        coord: TileCoord,
        encoded: Vec<u8>,
    ) -> Arc<[u8]> {
        let tile: Arc<[u8]> = encoded.into();
        self.tiles
            .insert(TileKey::new(level, coord), Arc::clone(&tile))
            .await;
        // Apply any pending eviction now so the size accessors reflect the
        // budget after every write.
        self.tiles.run_pending_tasks().await;
        tile
    }

    /// Number of tiles currently cached.
    pub fn entry_count(&self) -> u64 {
        self.tiles.entry_count()
    }

    /// Total encoded bytes currently cached.
    pub fn size_bytes(&self) -> u64 {
        self.tiles.weighted_size()
    }

    /// The configured byte budget.
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }
}
