//! Dataset coarsening orchestrator.
//!
//! Walks a full model-output dataset once: every `(eta_*, xi_*)`
//! dimension pair is classified onto its staggered location, the
//! variables on that pair are coarsened with the matching variant,
//! untouched variables and attributes pass through, and the coordinate
//! variables (`xi_u`, `eta_v`, lat/lon at rho, u, and v points) are
//! recomputed for the coarse grid. The output dataset is assembled in
//! one shot from a [`DatasetBuilder`].

use std::collections::{BTreeMap, BTreeSet};

use ndarray::{Array1, Array2, ArrayD, Axis, Ix2};

use crate::coarsen::{coarsen_rho_grid, coarsen_u_grid, coarsen_v_grid, latlon_ghost_points};
use crate::dataset::{Dataset, DatasetBuilder, Variable};
use crate::error::{GridError, GridResult};
use crate::stagger::{rho2uvp, Stagger};

/// Coordinate variables every input dataset must already carry.
const REQUIRED_COORDS: [&str; 6] = ["lat_rho", "lon_rho", "xi_rho", "eta_rho", "xi_u", "eta_v"];

/// Latitude/longitude coordinates recomputed on the coarse grid, with
/// the dimension pair used when the input did not carry them.
const LATLON_COORDS: [(&str, (&str, &str)); 6] = [
    ("lat_rho", ("eta_rho", "xi_rho")),
    ("lon_rho", ("eta_rho", "xi_rho")),
    ("lat_u", ("eta_u", "xi_u")),
    ("lon_u", ("eta_u", "xi_u")),
    ("lat_v", ("eta_v", "xi_v")),
    ("lon_v", ("eta_v", "xi_v")),
];

/// Coarsen every gridded variable of `ds` by the integer factor `n`,
/// preserving the ghost-point convention, and rebuild the coordinate
/// metadata for the coarse grid.
///
/// Variables that do not live on a classified `(eta, xi)` pair pass
/// through unchanged; dimension pairs with no matching variables are
/// skipped. The input is never mutated.
pub fn coarsen_dataset(ds: &Dataset, n: usize) -> GridResult<Dataset> {
    for name in REQUIRED_COORDS {
        if ds.get(name).is_none() {
            return Err(GridError::MissingInput(format!(
                "dataset lacks coordinate variable {}",
                name
            )));
        }
    }

    let dim_names = ds.dim_names();
    let eta_dims: Vec<String> = dim_names
        .iter()
        .filter(|d| d.starts_with("eta_"))
        .cloned()
        .collect();
    let xi_dims: Vec<String> = dim_names
        .iter()
        .filter(|d| d.starts_with("xi_"))
        .cloned()
        .collect();

    let mut builder = DatasetBuilder::new();
    let mut handled: BTreeSet<String> = BTreeSet::new();
    let mut coarse_dims: BTreeMap<String, usize> = BTreeMap::new();

    for eta in &eta_dims {
        for xi in &xi_dims {
            let Some(stagger) = Stagger::classify(eta, xi) else {
                continue;
            };
            let names: Vec<String> = ds
                .variables
                .iter()
                .filter(|(name, var)| !handled.contains(*name) && var.uses_dims(eta, xi))
                .map(|(name, _)| name.clone())
                .collect();
            if names.is_empty() {
                continue;
            }
            tracing::debug!(eta = %eta, xi = %xi, vars = names.len(), "coarsening dimension pair");

            let group = coarsen_group(ds, &names, stagger, n)?;
            if let Some((_, var)) = group.first() {
                for (dim, &len) in var.dims.iter().zip(var.data.shape()) {
                    if dim == eta || dim == xi {
                        coarse_dims.insert(dim.clone(), len);
                    }
                }
            }
            for (name, var) in group {
                builder.insert(name.clone(), var);
                handled.insert(name);
            }
        }
    }

    // Re-emit the coordinate vector of every coarsened dimension as a
    // float64 index vector, carrying the input attributes.
    for (dim, len) in &coarse_dims {
        let mut var = Variable::new(vec![dim.clone()], index_vector(*len));
        if let Some(orig) = ds.get(dim) {
            var.attrs = orig.attrs.clone();
        }
        builder.insert(dim.clone(), var);
        builder.set_coord(dim.clone());
        handled.insert(dim.clone());
    }

    // Pass through everything the grid pairs did not touch.
    for (name, var) in &ds.variables {
        if !handled.contains(name) {
            builder.insert(name.clone(), var.clone());
            if ds.coords.contains(name) {
                builder.set_coord(name.clone());
            }
        }
    }

    // Derived staggered coordinate vectors from the new rho vectors.
    let xi_rho = coord_vector(&builder, "xi_rho")?;
    let eta_rho = coord_vector(&builder, "eta_rho")?;
    let (u, _, _) = rho2uvp(&xi_rho.view().insert_axis(Axis(0)));
    let xi_u = u.row(0).to_owned();
    let (_, v, _) = rho2uvp(&eta_rho.view().insert_axis(Axis(1)));
    let eta_v = v.column(0).to_owned();
    insert_coord_vector(&mut builder, ds, "xi_u", xi_u);
    insert_coord_vector(&mut builder, ds, "eta_v", eta_v);

    // Physical lat/lon ghost reconstruction on the coarse grid.
    let lat_rho = grid_2d(&builder, "lat_rho")?;
    let lon_rho = grid_2d(&builder, "lon_rho")?;
    let (latr, lonr) = latlon_ghost_points(&lat_rho, &lon_rho)?;
    let (latu, latv, _) = rho2uvp(&latr);
    let (lonu, lonv, _) = rho2uvp(&lonr);
    for (name, values) in [
        ("lat_rho", latr),
        ("lon_rho", lonr),
        ("lat_u", latu),
        ("lon_u", lonu),
        ("lat_v", latv),
        ("lon_v", lonv),
    ] {
        insert_latlon(&mut builder, ds, name, values);
    }

    builder.set_attrs(ds.attrs.clone());
    Ok(builder.build())
}

/// Coarsen one dimension-pair group of variables.
#[cfg(feature = "parallel")]
fn coarsen_group(
    ds: &Dataset,
    names: &[String],
    stagger: Stagger,
    n: usize,
) -> GridResult<Vec<(String, Variable)>> {
    use rayon::prelude::*;
    names
        .par_iter()
        .map(|name| coarsen_one(ds, name, stagger, n))
        .collect()
}

/// Coarsen one dimension-pair group of variables.
#[cfg(not(feature = "parallel"))]
fn coarsen_group(
    ds: &Dataset,
    names: &[String],
    stagger: Stagger,
    n: usize,
) -> GridResult<Vec<(String, Variable)>> {
    names
        .iter()
        .map(|name| coarsen_one(ds, name, stagger, n))
        .collect()
}

fn coarsen_one(
    ds: &Dataset,
    name: &str,
    stagger: Stagger,
    n: usize,
) -> GridResult<(String, Variable)> {
    let var = ds
        .get(name)
        .ok_or_else(|| GridError::MissingInput(name.to_string()))?;
    let data = match stagger {
        Stagger::Rho => coarsen_rho_grid(&var.data, n)?,
        Stagger::U => coarsen_u_grid(&var.data, n)?,
        Stagger::V => coarsen_v_grid(&var.data, n)?,
        Stagger::Psi => {
            return Err(GridError::InvalidShape(format!(
                "variable {} classified on psi points; psi fields are derived, not coarsened",
                name
            )))
        }
    };
    Ok((
        name.to_string(),
        Variable::new(var.dims.clone(), data).with_attrs(var.attrs.clone()),
    ))
}

fn index_vector(len: usize) -> ArrayD<f64> {
    Array1::from_shape_fn(len, |i| i as f64).into_dyn()
}

/// Read a 1-D coordinate vector out of the builder.
fn coord_vector(builder: &DatasetBuilder, name: &str) -> GridResult<Array1<f64>> {
    let var = builder
        .get(name)
        .ok_or_else(|| GridError::MissingInput(name.to_string()))?;
    var.data
        .clone()
        .into_dimensionality()
        .map_err(|e| GridError::InvalidShape(format!("{} is not a vector: {}", name, e)))
}

/// Read a 2-D grid out of the builder.
fn grid_2d(builder: &DatasetBuilder, name: &str) -> GridResult<Array2<f64>> {
    let var = builder
        .get(name)
        .ok_or_else(|| GridError::MissingInput(name.to_string()))?;
    var.data
        .clone()
        .into_dimensionality::<Ix2>()
        .map_err(|e| GridError::InvalidShape(format!("{} is not a 2-D grid: {}", name, e)))
}

fn insert_coord_vector(builder: &mut DatasetBuilder, ds: &Dataset, name: &str, values: Array1<f64>) {
    let mut var = Variable::new(vec![name.to_string()], values.into_dyn());
    if let Some(orig) = ds.get(name) {
        var.attrs = orig.attrs.clone();
    }
    builder.insert(name.to_string(), var);
    builder.set_coord(name.to_string());
}

fn insert_latlon(builder: &mut DatasetBuilder, ds: &Dataset, name: &str, values: Array2<f64>) {
    let dims = if let Some(existing) = builder.get(name) {
        existing.dims.clone()
    } else if let Some(orig) = ds.get(name) {
        orig.dims.clone()
    } else {
        let (eta, xi) = LATLON_COORDS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, dims)| *dims)
            .unwrap_or(("eta_rho", "xi_rho"));
        vec![eta.to_string(), xi.to_string()]
    };
    let attrs = builder
        .get(name)
        .map(|v| v.attrs.clone())
        .or_else(|| ds.get(name).map(|v| v.attrs.clone()))
        .unwrap_or_default();
    builder.insert(
        name.to_string(),
        Variable::new(dims, values.into_dyn()).with_attrs(attrs),
    );
    builder.set_coord(name.to_string());
}
