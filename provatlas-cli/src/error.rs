//! CLI error type.

use thiserror::Error;

/// Errors surfaced to the user; the process exits 1 on any of them.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file problem.
    #[error("configuration error")]
    Config(#[from] provatlas::config::ConfigError),

    /// A pipeline stage failed outright.
    #[error("pipeline error")]
    Pipeline(#[from] provatlas::pipeline::PipelineError),

    /// The download batch could not start.
    #[error("download error")]
    Download(#[from] provatlas::download::DownloadError),

    /// A boundary file could not be handled.
    #[error("boundary error")]
    Boundary(#[from] provatlas::boundary::BoundaryError),

    /// Tile arithmetic rejected the arguments.
    #[error("coordinate error")]
    Coord(#[from] provatlas::coord::CoordError),

    /// A tile source could not be constructed or read.
    #[error("tile source error")]
    Source(#[from] provatlas::source::SourceError),

    /// Freeform failure with context.
    #[error("{0}")]
    Other(String),
}
