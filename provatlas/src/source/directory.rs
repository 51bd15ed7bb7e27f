//! Filesystem-backed tile source.

use std::path::PathBuf;

use super::{tile_rel_path, BoxFuture, SourceError, TileSource};
use crate::coord::{DetailLevel, TileCoord};

/// Tile source reading a published tile tree from a local directory.
///
/// Expects the layout the tiler writes: `{root}/{level}/{z}/{x}/{y}.pbf`.
#[derive(Debug, Clone)]
pub struct DirectoryTileSource {
    root: PathBuf,
}

impl DirectoryTileSource {
    /// Create a source rooted at the given tile tree directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The tile tree root.
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

impl TileSource for DirectoryTileSource {
    fn fetch(
        &self,
        level: DetailLevel,
        tile: TileCoord,
    ) -> BoxFuture<'_, Result<Option<Vec<u8>>, SourceError>> {
        let rel = tile_rel_path(level, &tile);
        let path = self.root.join(&rel);
        Box::pin(async move {
            match tokio::fs::read(&path).await {
                Ok(bytes) => Ok(Some(bytes)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(SourceError::Io { path: rel, source: e }),
            }
        })
    }
}
