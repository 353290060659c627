//! Error types for grid preparation and coarsening.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for grid-preparation operations.
#[derive(Debug, Error)]
pub enum GridError {
    /// A kernel, stride, or array argument violates the block-reduction
    /// contract, or staggered arrays have inconsistent shapes.
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    /// A required input is missing: no candidate grid-source file, or a
    /// dataset lacks one of the standard staggered coordinate variables.
    #[error("missing input: {0}")]
    MissingInput(String),

    /// A user-supplied path does not exist.
    #[error("path not found: {}", .0.display())]
    PathNotFound(PathBuf),
}

/// Convenience alias for `Result<T, GridError>`.
pub type GridResult<T> = Result<T, GridError>;
