//! Tile source abstraction.
//!
//! A [`TileSource`] hands back the encoded bytes of a tile on demand. The
//! published tile tree is just files at `{level}/{z}/{x}/{y}.pbf`, served
//! either straight from disk ([`DirectoryTileSource`]) or over HTTP from a
//! static host ([`HttpTileSource`]).
//!
//! A missing tile is not an error: oceans and uncovered areas simply have
//! no file, so `fetch` returns `Ok(None)` for them.

mod directory;
mod http;

pub use directory::DirectoryTileSource;
pub use http::HttpTileSource;

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::coord::{DetailLevel, TileCoord};

/// Boxed future type keeping [`TileSource`] dyn-compatible.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors from tile sources.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Filesystem error reading a tile.
    #[error("failed to read tile {path}: {source}")]
    Io {
        /// Relative tile path.
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Transport-level HTTP failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with an unexpected status.
    #[error("unexpected status {status} for {url}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },
}

/// On-demand access to encoded tiles.
///
/// Implementations must be `Send + Sync`; the loader shares one source
/// across concurrent tile loads.
pub trait TileSource: Send + Sync {
    /// Fetch the encoded bytes of a tile.
    ///
    /// Returns `Ok(Some(bytes))` when the tile exists, `Ok(None)` when the
    /// source has no such tile, and `Err` for actual failures.
    fn fetch(
        &self,
        level: DetailLevel,
        tile: TileCoord,
    ) -> BoxFuture<'_, Result<Option<Vec<u8>>, SourceError>>;
}

/// Relative path of a tile within a tile tree: `{level}/{z}/{x}/{y}.pbf`.
pub fn tile_rel_path(level: DetailLevel, tile: &TileCoord) -> String {
    format!("{}/{}/{}/{}.pbf", level.code(), tile.zoom, tile.x, tile.y)
}
