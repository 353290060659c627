//! # croco-prep
//!
//! Grid preparation and output coarsening for CROCO-style Arakawa
//! C-grid ocean models.
//!
//! This crate provides the building blocks for regional-model grid
//! workflows:
//! - Geodesy primitives (great-circle distance, ellipsoidal grid angle,
//!   meridional latitude stepping)
//! - Staggered-grid conversions (rho to u/v/psi points, mask
//!   propagation)
//! - A strided 2D block-reduction engine
//! - Grid-variant coarsening with ghost-point reconstruction (periodic
//!   east-west, no-flux north-south)
//! - A one-pass dataset coarsening orchestrator
//! - Full grid generation (metrics, rotation, Coriolis, masks) from a
//!   parent grid's extent
//!
//! NetCDF I/O and the CLI entry points live behind the `netcdf` and
//! `cli` features; per-variable coarsening parallelizes under the
//! `parallel` feature.

pub mod coarsen;
pub mod convolve;
pub mod dataset;
pub mod error;
pub mod geodesy;
pub mod grid;
pub mod io;
pub mod stagger;
pub mod types;

// Re-export main types for convenience
pub use coarsen::{
    coarsen_dataset, coarsen_rho_grid, coarsen_u_grid, coarsen_v_grid, latlon_ghost_points,
};
pub use convolve::convolve2d;
pub use dataset::{Dataset, DatasetBuilder, Variable};
pub use error::{GridError, GridResult};
pub use geodesy::{get_angle, get_next_lat, get_prev_lat, spheric_dist, EARTH_RADIUS};
pub use grid::{create_grid, get_metrics, meshgrid, GridExtent, GridFile, DEFAULT_DEPTH};
pub use io::find_restart_file;
#[cfg(feature = "netcdf")]
pub use io::{read_dataset, write_dataset, write_grid, CoarsenPreprocessor, IoError, Preprocessor};
pub use stagger::{rho2uvp, uvp_mask, Stagger};
pub use types::{GeoBounds, ResolutionPreset};
