//! Grid-variant coarsening of staggered fields.
//!
//! All three variants strip the existing ghost points, block-reduce the
//! interior with a variant-specific kernel via [`convolve2d`], and
//! reconstruct the ghost points under the model's channel boundary
//! conventions: periodic along xi (east-west), no-flux along eta
//! (north-south).
//!
//! When the interior size is not divisible by the factor `n`, the
//! trailing remainder is truncated by the block-reduction floor; the
//! coarse grid then covers one fewer cell than a padded policy would.

use ndarray::{concatenate, Array1, Array2, ArrayD, ArrayViewD, Axis, Slice};

use crate::convolve::convolve2d;
use crate::error::{GridError, GridResult};
use crate::geodesy::{get_next_lat, get_prev_lat};
use crate::grid::meshgrid;

/// Uniform `n × n` averaging kernel.
fn box_filter(n: usize) -> Array2<f64> {
    Array2::from_elem((n, n), 1.0 / (n * n) as f64)
}

/// `(n, n+1)` trapezoidal edge filter: half-weight end taps along xi,
/// replicated over `n` rows, normalized to sum 1.
fn edge_filter_xi(n: usize) -> Array2<f64> {
    let mut filter = Array2::from_elem((n, n + 1), 1.0);
    filter.column_mut(0).fill(0.5);
    filter.column_mut(n).fill(0.5);
    let total = filter.sum();
    filter / total
}

/// `(n+1, n)` trapezoidal edge filter: half-weight end taps along eta,
/// replicated over `n` columns, normalized to sum 1.
fn edge_filter_eta(n: usize) -> Array2<f64> {
    let mut filter = Array2::from_elem((n + 1, n), 1.0);
    filter.row_mut(0).fill(0.5);
    filter.row_mut(n).fill(0.5);
    let total = filter.sum();
    filter / total
}

fn check_spatial(data: &ArrayD<f64>, n: usize) -> GridResult<()> {
    if n == 0 {
        return Err(GridError::InvalidShape(
            "coarsening factor must be non-zero".into(),
        ));
    }
    let nd = data.ndim();
    if nd < 2 {
        return Err(GridError::InvalidShape(format!(
            "field must have at least two axes, got {}",
            nd
        )));
    }
    let height = data.shape()[nd - 2];
    let width = data.shape()[nd - 1];
    if height < 3 || width < 3 {
        return Err(GridError::InvalidShape(format!(
            "spatial extent {}x{} leaves no interior once ghost points are stripped",
            height, width
        )));
    }
    Ok(())
}

/// Reattach periodic ghost columns: the west ghost is a copy of the last
/// column, the east ghost a copy of the first.
fn wrap_columns(data: &ArrayD<f64>, west: bool, east: bool) -> GridResult<ArrayD<f64>> {
    let xi = Axis(data.ndim() - 1);
    let mut parts: Vec<ArrayViewD<'_, f64>> = Vec::with_capacity(3);
    if west {
        parts.push(data.slice_axis(xi, Slice::from(-1..)));
    }
    parts.push(data.view());
    if east {
        parts.push(data.slice_axis(xi, Slice::from(..1)));
    }
    concatenate(xi, &parts).map_err(|e| GridError::InvalidShape(e.to_string()))
}

/// Reattach no-flux ghost rows by duplicating the edge rows outward.
fn replicate_rows(data: &ArrayD<f64>, south: bool, north: bool) -> GridResult<ArrayD<f64>> {
    let eta = Axis(data.ndim() - 2);
    let mut parts: Vec<ArrayViewD<'_, f64>> = Vec::with_capacity(3);
    if south {
        parts.push(data.slice_axis(eta, Slice::from(..1)));
    }
    parts.push(data.view());
    if north {
        parts.push(data.slice_axis(eta, Slice::from(-1..)));
    }
    concatenate(eta, &parts).map_err(|e| GridError::InvalidShape(e.to_string()))
}

/// Coarsen a cell-center (rho) field by an integer factor `n`.
///
/// Strips the one-point ghost border, applies a non-overlapping `n × n`
/// box filter, and reattaches ghost points: periodic wrap along xi,
/// edge replication along eta. With an `H × W` interior divisible by
/// `n`, the ghost-inclusive output shape is `(H/n + 2, W/n + 2)`.
pub fn coarsen_rho_grid(data: &ArrayD<f64>, n: usize) -> GridResult<ArrayD<f64>> {
    check_spatial(data, n)?;
    let nd = data.ndim();

    let interior = data.slice_each_axis(|ad| {
        if ad.axis.index() >= nd - 2 {
            Slice::from(1..-1)
        } else {
            Slice::from(..)
        }
    });

    let coarse = convolve2d(interior, &box_filter(n), (n, n))?;
    let coarse = wrap_columns(&coarse, true, true)?;
    replicate_rows(&coarse, true, true)
}

/// Coarsen an east-west face (u) field by an integer factor `n`.
///
/// Strips the eta ghost border and the duplicated seam column, rotates
/// the xi axis so the periodic seam lines up with the kernel taps,
/// applies the `(n, n+1)` trapezoidal edge filter, and reattaches a
/// single periodic ghost column at the west edge plus replicated rows
/// north and south.
pub fn coarsen_u_grid(data: &ArrayD<f64>, n: usize) -> GridResult<ArrayD<f64>> {
    check_spatial(data, n)?;
    let nd = data.ndim();
    let xi = Axis(nd - 1);

    let interior = data.slice_each_axis(|ad| {
        let i = ad.axis.index();
        if i == nd - 2 {
            Slice::from(1..-1)
        } else if i == nd - 1 {
            Slice::from(1..)
        } else {
            Slice::from(..)
        }
    });

    let rotated = concatenate(
        xi,
        &[
            interior.slice_axis(xi, Slice::from(1..)),
            interior.slice_axis(xi, Slice::from(..2)),
        ],
    )
    .map_err(|e| GridError::InvalidShape(e.to_string()))?;

    let coarse = convolve2d(rotated.view(), &edge_filter_xi(n), (n, n))?;
    let coarse = wrap_columns(&coarse, true, false)?;
    replicate_rows(&coarse, true, true)
}

/// Coarsen a north-south face (v) field by an integer factor `n`.
///
/// Symmetric counterpart of [`coarsen_u_grid`] with the axes swapped:
/// strips the xi ghost border and the duplicated seam row, applies the
/// `(n+1, n)` trapezoidal edge filter, and reattaches periodic ghost
/// columns on both sides plus a single replicated row at the south
/// edge.
pub fn coarsen_v_grid(data: &ArrayD<f64>, n: usize) -> GridResult<ArrayD<f64>> {
    check_spatial(data, n)?;
    let nd = data.ndim();
    let eta = Axis(nd - 2);

    let interior = data.slice_each_axis(|ad| {
        let i = ad.axis.index();
        if i == nd - 2 {
            Slice::from(1..)
        } else if i == nd - 1 {
            Slice::from(1..-1)
        } else {
            Slice::from(..)
        }
    });

    let rotated = concatenate(
        eta,
        &[
            interior.slice_axis(eta, Slice::from(1..)),
            interior.slice_axis(eta, Slice::from(..2)),
        ],
    )
    .map_err(|e| GridError::InvalidShape(e.to_string()))?;

    let coarse = convolve2d(rotated.view(), &edge_filter_eta(n), (n, n))?;
    let coarse = wrap_columns(&coarse, true, true)?;
    replicate_rows(&coarse, true, false)
}

/// Reconstruct the physical lat/lon ghost ring of a coarsened grid.
///
/// The box-averaged ghost entries left by [`coarsen_rho_grid`] are
/// discarded; one longitude column is extrapolated on each side by the
/// mean zonal spacing `dl`, and the matching latitude rows follow the
/// meridional recurrence ([`get_next_lat`] northward, its
/// Newton-Raphson inverse [`get_prev_lat`] southward). Returns the
/// `(lat, lon)` 2-D mesh including the new ghost ring.
pub fn latlon_ghost_points(
    lat: &Array2<f64>,
    lon: &Array2<f64>,
) -> GridResult<(Array2<f64>, Array2<f64>)> {
    let (rows, cols) = lat.dim();
    if rows < 3 || cols < 4 || lon.dim() != (rows, cols) {
        return Err(GridError::InvalidShape(format!(
            "lat/lon grids must agree and hold at least one interior row and two interior columns, got {:?} and {:?}",
            lat.dim(),
            lon.dim()
        )));
    }

    // Interior 1-D profiles: latitudes down the first column, longitudes
    // across the first row.
    let lat1: Vec<f64> = (1..rows - 1).map(|i| lat[[i, 0]]).collect();
    let lon1: Vec<f64> = (1..cols - 1).map(|j| lon[[0, j]]).collect();

    let m = lon1.len();
    let dl = (0..m - 1).map(|j| lon1[j + 1] - lon1[j]).sum::<f64>() / (m - 1) as f64;

    let mut lon_ext = Vec::with_capacity(m + 2);
    lon_ext.push(lon1[0] - dl);
    lon_ext.extend_from_slice(&lon1);
    lon_ext.push(lon1[m - 1] + dl);

    let k = lat1.len();
    let mut lat_ext = Vec::with_capacity(k + 2);
    lat_ext.push(get_prev_lat(lat1[0], dl));
    lat_ext.extend_from_slice(&lat1);
    lat_ext.push(get_next_lat(lat1[k - 1], dl));

    let (lon2, lat2) = meshgrid(&Array1::from(lon_ext), &Array1::from(lat_ext));
    Ok((lat2, lon2))
}
