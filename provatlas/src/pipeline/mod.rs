//! Offline boundary pipeline.
//!
//! Three stages turn a world GeoJSON dataset into what the game serves
//! statically:
//!
//! 1. [`split_world`] - one boundary file per country, with provenance and
//!    game metadata attached
//! 2. [`simplify_boundaries`] - per-detail-level simplified copies
//! 3. [`build_tiles`] - a PBF tile tree `{level}/{z}/{x}/{y}.pbf` per level
//!
//! Stages are best-effort: a country or feature that cannot be processed is
//! logged, recorded in the [`PipelineSummary`], and skipped.

mod simplify;
mod split;
mod summary;
mod tiler;

pub use simplify::simplify_boundaries;
pub use split::{split_world, SplitOptions};
pub use summary::{CountryWarning, PipelineSummary};
pub use tiler::build_tiles;

use std::path::PathBuf;

use thiserror::Error;

use crate::boundary::BoundaryError;
use crate::coord::CoordError;

/// Errors that abort a pipeline stage.
///
/// Per-country and per-feature problems become summary warnings instead;
/// these errors are reserved for unusable inputs (missing source file,
/// unreadable output directory).
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Filesystem failure on a path the stage cannot work without.
    #[error("failed to access {path}: {source}")]
    Io {
        /// Offending path.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source dataset is not usable GeoJSON.
    #[error("failed to parse {path}: {message}")]
    Parse {
        /// Offending path.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// Boundary file handling failed.
    #[error(transparent)]
    Boundary(#[from] BoundaryError),

    /// Tile arithmetic rejected the configuration.
    #[error(transparent)]
    Coord(#[from] CoordError),
}
