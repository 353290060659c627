//! Grid generation for C-grid ocean models.
//!
//! From a parent dataset's latitude/longitude extent and a target zonal
//! spacing, [`create_grid`] synthesizes the full staggered-grid
//! geometry: rho/u/v/psi positions, spacing metrics, grid rotation,
//! Coriolis parameter, placeholder bathymetry, and wet/dry masks:
//! everything a grid-definition file carries.

mod metrics;

use std::f64::consts::PI;

use ndarray::{Array, Array1, Array2, Array3};

use crate::dataset::Dataset;
use crate::error::{GridError, GridResult};
use crate::geodesy::{get_angle, get_next_lat};
use crate::stagger::{rho2uvp, uvp_mask};
use crate::types::GeoBounds;

pub use metrics::get_metrics;

/// Constant placeholder depth assigned to the generated grid (m).
pub const DEFAULT_DEPTH: f64 = 2000.0;

/// Mesh two coordinate vectors into 2-D arrays.
///
/// `x` varies along columns and `y` along rows; returns `(X, Y)`, each
/// of shape `(y.len(), x.len())`.
pub fn meshgrid(x: &Array1<f64>, y: &Array1<f64>) -> (Array2<f64>, Array2<f64>) {
    let shape = (y.len(), x.len());
    let xx = Array2::from_shape_fn(shape, |(_, j)| x[j]);
    let yy = Array2::from_shape_fn(shape, |(i, _)| y[i]);
    (xx, yy)
}

/// Geographic extent and target spacing of a grid to generate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridExtent {
    /// Latitude/longitude bounds of the parent grid.
    pub bounds: GeoBounds,
    /// Target zonal spacing in degrees.
    pub dl: f64,
}

impl GridExtent {
    /// Extent of a parent dataset: `lat_rho`/`lon_rho` extrema and the
    /// parent's own zonal spacing.
    pub fn from_dataset(ds: &Dataset) -> GridResult<Self> {
        let lat = ds
            .get("lat_rho")
            .ok_or_else(|| GridError::MissingInput("lat_rho".into()))?;
        let lon = ds
            .get("lon_rho")
            .ok_or_else(|| GridError::MissingInput("lon_rho".into()))?;

        let (lat_min, lat_max) = min_max(&lat.data)?;
        let (lon_min, lon_max) = min_max(&lon.data)?;

        let shape = lon.data.shape();
        if shape.len() != 2 || shape[1] < 2 {
            return Err(GridError::InvalidShape(
                "lon_rho must be a 2-D grid with at least two columns".into(),
            ));
        }
        let dl = lon.data[[0, 1]] - lon.data[[0, 0]];

        Ok(Self {
            bounds: GeoBounds::new(lat_min, lat_max, lon_min, lon_max),
            dl,
        })
    }

    /// Override the target spacing (e.g. from a resolution preset).
    pub fn with_spacing(mut self, dl: f64) -> Self {
        self.dl = dl;
        self
    }
}

fn min_max(data: &ndarray::ArrayD<f64>) -> GridResult<(f64, f64)> {
    let mut iter = data.iter();
    let first = *iter
        .next()
        .ok_or_else(|| GridError::InvalidShape("empty coordinate array".into()))?;
    let mut min = first;
    let mut max = first;
    for &v in iter {
        min = min.min(v);
        max = max.max(v);
    }
    Ok((min, max))
}

/// A complete generated grid, ready to persist as a grid-definition
/// file.
///
/// Field names and staggering match the consuming model's grid-file
/// schema; the scalar placeholders (`xl`, `el`, `depthmin`, `depthmax`,
/// `hraw`, `alpha`) carry the missing value until a bathymetry pass
/// fills them in.
#[derive(Clone, Debug)]
pub struct GridFile {
    pub xl: f64,
    pub el: f64,
    pub depthmin: f64,
    pub depthmax: f64,
    /// Spherical-coordinates flag, written as `'T'`/`'F'`.
    pub spherical: bool,

    /// Grid rotation relative to true east (rho points, radians).
    pub angle: Array2<f64>,
    /// Bathymetry (m).
    pub h: Array2<f64>,
    /// Raw bathymetry with a leading singleton `bath` dimension.
    pub hraw: Array3<f64>,
    pub alpha: Array2<f64>,
    /// Coriolis parameter (1/s).
    pub f: Array2<f64>,
    /// Inverse zonal grid spacing (1/m).
    pub pm: Array2<f64>,
    /// Inverse meridional grid spacing (1/m).
    pub pn: Array2<f64>,
    pub dndx: Array2<f64>,
    pub dmde: Array2<f64>,

    pub x_rho: Array2<f64>,
    pub y_rho: Array2<f64>,
    pub x_u: Array2<f64>,
    pub y_u: Array2<f64>,
    pub x_v: Array2<f64>,
    pub y_v: Array2<f64>,
    pub x_psi: Array2<f64>,
    pub y_psi: Array2<f64>,

    pub lon_rho: Array2<f64>,
    pub lat_rho: Array2<f64>,
    pub lon_u: Array2<f64>,
    pub lat_u: Array2<f64>,
    pub lon_v: Array2<f64>,
    pub lat_v: Array2<f64>,
    pub lon_psi: Array2<f64>,
    pub lat_psi: Array2<f64>,

    pub mask_rho: Array2<bool>,
    pub mask_u: Array2<bool>,
    pub mask_v: Array2<bool>,
    pub mask_psi: Array2<bool>,

    /// `title` dataset attribute.
    pub title: String,
    /// Zonal spacing in degrees; formatted into the `resolution`
    /// attribute.
    pub resolution: f64,
}

/// Generate the full staggered-grid geometry for `extent`.
///
/// Longitudes are a fixed-step arange over `[lon_min, lon_max)`;
/// latitudes follow the forward recurrence `lat' = lat + dl·cos(lat)`
/// until exceeding `lat_max` (the first value beyond the bound is
/// kept), which spaces rows at a near-uniform physical distance.
pub fn create_grid(extent: &GridExtent, missing_value: f64, title: &str) -> GridResult<GridFile> {
    let dl = extent.dl;
    if dl <= 0.0 || !dl.is_finite() {
        return Err(GridError::InvalidShape(format!(
            "grid spacing must be positive, got {}",
            dl
        )));
    }
    let bounds = extent.bounds;

    let lon_vec = Array::range(bounds.lon_min, bounds.lon_max, dl);

    let mut lat = bounds.lat_min;
    let mut lat_vec = vec![lat];
    while lat <= bounds.lat_max {
        lat = get_next_lat(lat, dl);
        lat_vec.push(lat);
    }
    let lat_vec = Array1::from(lat_vec);

    if lon_vec.len() < 3 || lat_vec.len() < 3 {
        return Err(GridError::InvalidShape(format!(
            "extent too small for spacing {}: {} x {} rho points",
            dl,
            lat_vec.len(),
            lon_vec.len()
        )));
    }

    let (lon_rho, lat_rho) = meshgrid(&lon_vec, &lat_vec);
    let (mp, lp) = lat_rho.dim();

    let (lon_u, lon_v, lon_psi) = rho2uvp(&lon_rho);
    let (lat_u, lat_v, lat_psi) = rho2uvp(&lat_rho);

    let (m, l) = lat_psi.dim();
    tracing::info!(llm = l - 1, mmm = m - 1, resolution = dl, "generated grid size");

    let (pm, pn, dndx, dmde) = get_metrics(&lat_u, &lon_u, &lat_v, &lon_v);

    // Integrate the inverse metrics into Cartesian-like positions.
    let mut x_rho = Array2::<f64>::zeros((mp, lp));
    for j in 0..lp - 1 {
        for i in 0..mp {
            x_rho[[i, j + 1]] = x_rho[[i, j]] + 2.0 / (pm[[i, j + 1]] + pm[[i, j]]);
        }
    }
    let mut y_rho = Array2::<f64>::zeros((mp, lp));
    for i in 0..mp - 1 {
        for j in 0..lp {
            y_rho[[i + 1, j]] = y_rho[[i, j]] + 2.0 / (pn[[i + 1, j]] + pn[[i, j]]);
        }
    }
    let (x_u, x_v, x_psi) = rho2uvp(&x_rho);
    let (y_u, y_v, y_psi) = rho2uvp(&y_rho);

    let angle = get_angle(&lat_u, &lon_u);

    // Coriolis parameter with the sidereal-day correction.
    let f = lat_rho.mapv(|lat| 4.0 * PI * lat.to_radians().sin() * 366.25 / (24.0 * 3600.0 * 365.25));

    let h = Array2::from_elem((mp, lp), DEFAULT_DEPTH);
    let hraw = Array3::from_elem((1, mp, lp), missing_value);
    let alpha = Array2::from_elem((mp, lp), missing_value);

    let mask_rho = h.mapv(|depth| depth > 0.0);
    let (mask_u, mask_v, mask_psi) = uvp_mask(&mask_rho);

    Ok(GridFile {
        xl: missing_value,
        el: missing_value,
        depthmin: missing_value,
        depthmax: missing_value,
        spherical: true,
        angle,
        h,
        hraw,
        alpha,
        f,
        pm,
        pn,
        dndx,
        dmde,
        x_rho,
        y_rho,
        x_u,
        y_u,
        x_v,
        y_v,
        x_psi,
        y_psi,
        lon_rho,
        lat_rho,
        lon_u,
        lat_u,
        lon_v,
        lat_v,
        lon_psi,
        lat_psi,
        mask_rho,
        mask_u,
        mask_v,
        mask_psi,
        title: title.to_string(),
        resolution: dl,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_extent() -> GridExtent {
        GridExtent {
            bounds: GeoBounds::new(45.0, 45.5, -70.0, -69.0),
            dl: 0.05,
        }
    }

    #[test]
    fn test_meshgrid() {
        let x = Array1::from(vec![1.0, 2.0, 3.0]);
        let y = Array1::from(vec![10.0, 20.0]);
        let (xx, yy) = meshgrid(&x, &y);
        assert_eq!(xx.dim(), (2, 3));
        assert_eq!(xx[[1, 2]], 3.0);
        assert_eq!(yy[[1, 2]], 20.0);
    }

    #[test]
    fn test_grid_shapes_consistent() {
        let grid = create_grid(&test_extent(), 1e37, "test_grid").unwrap();
        let (mp, lp) = grid.lat_rho.dim();
        assert_eq!(grid.angle.dim(), (mp, lp));
        assert_eq!(grid.pm.dim(), (mp, lp));
        assert_eq!(grid.f.dim(), (mp, lp));
        assert_eq!(grid.lat_u.dim(), (mp, lp - 1));
        assert_eq!(grid.lat_v.dim(), (mp - 1, lp));
        assert_eq!(grid.lat_psi.dim(), (mp - 1, lp - 1));
        assert_eq!(grid.hraw.dim(), (1, mp, lp));
    }

    #[test]
    fn test_latitude_recurrence_overshoots_once() {
        let extent = test_extent();
        let grid = create_grid(&extent, 1e37, "test_grid").unwrap();
        let (mp, _) = grid.lat_rho.dim();
        // The last row is the first value beyond lat_max.
        assert!(grid.lat_rho[[mp - 1, 0]] > extent.bounds.lat_max);
        assert!(grid.lat_rho[[mp - 2, 0]] <= extent.bounds.lat_max);
        // Rows follow the recurrence.
        for i in 0..mp - 1 {
            let expected = get_next_lat(grid.lat_rho[[i, 0]], extent.dl);
            assert!((grid.lat_rho[[i + 1, 0]] - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_angle_near_zero_for_east_west_rows() {
        // Rows sit at constant latitude, so the rotation reduces to the
        // great-circle bearing offset sin(lat)*dlam/2, well under a
        // milliradian at this spacing.
        let grid = create_grid(&test_extent(), 1e37, "test_grid").unwrap();
        for &a in grid.angle.iter() {
            assert!(a.abs() < 1e-3, "angle = {}", a);
        }
    }

    #[test]
    fn test_coriolis_sign_and_magnitude() {
        let grid = create_grid(&test_extent(), 1e37, "test_grid").unwrap();
        // f at 45 N is about 1.03e-4 1/s.
        let f = grid.f[[0, 0]];
        assert!(f > 0.9e-4 && f < 1.2e-4, "f = {}", f);
    }

    #[test]
    fn test_masks_all_wet_and_propagated() {
        let grid = create_grid(&test_extent(), 1e37, "test_grid").unwrap();
        assert!(grid.mask_rho.iter().all(|&w| w));
        assert!(grid.mask_u.iter().all(|&w| w));
        assert!(grid.mask_v.iter().all(|&w| w));
        assert!(grid.mask_psi.iter().all(|&w| w));
        let (mp, lp) = grid.mask_rho.dim();
        assert_eq!(grid.mask_u.dim(), (mp, lp - 1));
        assert_eq!(grid.mask_v.dim(), (mp - 1, lp));
    }

    #[test]
    fn test_positions_monotone() {
        let grid = create_grid(&test_extent(), 1e37, "test_grid").unwrap();
        let (mp, lp) = grid.x_rho.dim();
        for i in 0..mp {
            for j in 1..lp {
                assert!(grid.x_rho[[i, j]] > grid.x_rho[[i, j - 1]]);
            }
        }
        for j in 0..lp {
            for i in 1..mp {
                assert!(grid.y_rho[[i, j]] > grid.y_rho[[i - 1, j]]);
            }
        }
    }

    #[test]
    fn test_zero_spacing_rejected() {
        let extent = test_extent().with_spacing(0.0);
        assert!(matches!(
            create_grid(&extent, 1e37, "test_grid"),
            Err(GridError::InvalidShape(_))
        ));
    }
}
