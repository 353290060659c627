//! Spatial coarsening of staggered model output.
//!
//! This module downsamples full model-output datasets by an integer
//! factor while respecting the Arakawa C-grid layout:
//!
//! - [`coarsen_rho_grid`], [`coarsen_u_grid`], [`coarsen_v_grid`]:
//!   variant-specific block reduction with ghost-point reconstruction
//!   (periodic east-west, no-flux north-south)
//! - [`latlon_ghost_points`]: physical ghost-ring reconstruction for
//!   the coarse latitude/longitude grids
//! - [`coarsen_dataset`]: one-pass orchestrator over every gridded
//!   variable of a dataset

mod dataset;
mod variants;

pub use dataset::coarsen_dataset;
pub use variants::{coarsen_rho_grid, coarsen_u_grid, coarsen_v_grid, latlon_ghost_points};
