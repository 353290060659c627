//! I/O utilities for dataset and grid files.
//!
//! This module provides:
//! - **Restart-file discovery**: locate the `*_rst.nc` grid source in a
//!   working directory
//! - **Dataset I/O**: read/write the in-memory [`Dataset`](crate::dataset::Dataset)
//!   container (requires the `netcdf` feature)
//! - **Grid-file output**: persist a generated [`GridFile`](crate::grid::GridFile)
//!   under the model's grid-file schema (requires the `netcdf` feature)
//! - **Preprocessing seam**: the [`Preprocessor`] collaborator trait and
//!   its dataset-coarsening implementation
//!
//! # File Naming
//!
//! The grid generator reads `<prefix>_rst.nc` and writes
//! `<prefix>_grd.nc`; the preprocessor writes `<stem>_coarse.nc` next
//! to its input.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{GridError, GridResult};

#[cfg(feature = "netcdf")]
mod netcdf_io;

#[cfg(feature = "netcdf")]
pub use netcdf_io::{
    read_dataset, write_dataset, write_grid, CoarsenPreprocessor, IoError, Preprocessor,
    FILL_VALUE_F32, FILL_VALUE_F64,
};

/// Find the restart file (`*_rst.nc`) in `dir`.
///
/// Candidates are sorted by name so the choice is deterministic; a
/// directory with no candidate is a [`GridError::MissingInput`].
pub fn find_restart_file(dir: impl AsRef<Path>) -> GridResult<PathBuf> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir)
        .map_err(|e| GridError::MissingInput(format!("cannot read {}: {}", dir.display(), e)))?;

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.ends_with("_rst.nc"))
                .unwrap_or(false)
        })
        .collect();
    candidates.sort();

    candidates.into_iter().next().ok_or_else(|| {
        GridError::MissingInput(format!("no *_rst.nc file found in {}", dir.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_find_restart_file() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("ocean_his.nc")).unwrap();
        File::create(dir.path().join("b_rst.nc")).unwrap();
        File::create(dir.path().join("a_rst.nc")).unwrap();

        let found = find_restart_file(dir.path()).unwrap();
        assert_eq!(found.file_name().unwrap(), "a_rst.nc");
    }

    #[test]
    fn test_no_restart_file() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("ocean_his.nc")).unwrap();
        assert!(matches!(
            find_restart_file(dir.path()),
            Err(GridError::MissingInput(_))
        ));
    }
}
