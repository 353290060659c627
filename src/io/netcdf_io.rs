//! NetCDF I/O for dataset coarsening and grid generation.
//!
//! The reader loads a self-describing gridded file into the in-memory
//! [`Dataset`] container (every variable as `f64`, attributes
//! stringified); the writers persist a coarsened [`Dataset`] or a
//! generated [`GridFile`] under the model's grid-file schema. Output is
//! assembled fully in memory before anything is written, so no partial
//! files are left behind on failure.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use chrono::Utc;
use ndarray::{Array2, ArrayD, IxDyn};
use thiserror::Error;

use crate::coarsen::coarsen_dataset;
use crate::dataset::{Dataset, DatasetBuilder, Variable};
use crate::error::GridError;
use crate::grid::GridFile;

/// Error type for NetCDF operations.
#[derive(Debug, Error)]
pub enum IoError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// NetCDF library error
    #[error("NetCDF error: {0}")]
    NetCDF(#[from] netcdf::Error),

    /// Missing variable
    #[error("Missing variable: {0}")]
    MissingVariable(String),

    /// Invalid data
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Grid-preparation error
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Fill value for missing data (CF-conventions standard).
pub const FILL_VALUE_F64: f64 = 9.96920996838687e+36;
pub const FILL_VALUE_F32: f32 = 9.96921e+36;

fn attr_to_string(value: &netcdf::AttributeValue) -> String {
    use netcdf::AttributeValue;
    match value {
        AttributeValue::Str(s) => s.clone(),
        AttributeValue::Double(v) => v.to_string(),
        AttributeValue::Float(v) => v.to_string(),
        AttributeValue::Int(v) => v.to_string(),
        AttributeValue::Uint(v) => v.to_string(),
        AttributeValue::Short(v) => v.to_string(),
        AttributeValue::Ushort(v) => v.to_string(),
        AttributeValue::Schar(v) => v.to_string(),
        AttributeValue::Uchar(v) => v.to_string(),
        AttributeValue::Longlong(v) => v.to_string(),
        AttributeValue::Ulonglong(v) => v.to_string(),
        other => format!("{:?}", other),
    }
}

/// Read a gridded file into the in-memory [`Dataset`] container.
///
/// Every variable is loaded as `f64` and attributes are stringified.
/// Variables whose values cannot be represented as `f64` (e.g. char
/// flags) are skipped with a warning. Variables named after one of
/// their dimensions are flagged as coordinates.
pub fn read_dataset(path: impl AsRef<Path>) -> Result<Dataset, IoError> {
    let file = netcdf::open(path)?;

    let dim_names: BTreeSet<String> = file.dimensions().map(|d| d.name().to_string()).collect();

    let mut builder = DatasetBuilder::new();
    for var in file.variables() {
        let name = var.name().to_string();
        let dims: Vec<String> = var
            .dimensions()
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();

        let values: Vec<f64> = match var.get_values(..) {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!(variable = %name, error = %e, "skipping variable not readable as f64");
                continue;
            }
        };
        let data = ArrayD::from_shape_vec(IxDyn(&shape), values)
            .map_err(|e| IoError::InvalidData(format!("variable {}: {}", name, e)))?;

        let mut attrs = BTreeMap::new();
        for attr in var.attributes() {
            let key = attr.name().to_string();
            match attr.value() {
                Ok(value) => {
                    attrs.insert(key, attr_to_string(&value));
                }
                Err(e) => {
                    tracing::warn!(variable = %name, attribute = %key, error = %e, "skipping unreadable attribute");
                }
            }
        }

        builder.insert(name.clone(), Variable::new(dims, data).with_attrs(attrs));
        if dim_names.contains(&name) {
            builder.set_coord(name);
        }
    }

    let mut attrs = BTreeMap::new();
    for attr in file.attributes() {
        let key = attr.name().to_string();
        match attr.value() {
            Ok(value) => {
                attrs.insert(key, attr_to_string(&value));
            }
            Err(e) => {
                tracing::warn!(attribute = %key, error = %e, "skipping unreadable attribute");
            }
        }
    }
    builder.set_attrs(attrs);

    Ok(builder.build())
}

/// Write a [`Dataset`] to a NetCDF file.
///
/// Dimension sizes are checked for consistency across variables before
/// the file is created.
pub fn write_dataset(ds: &Dataset, path: impl AsRef<Path>) -> Result<(), IoError> {
    let dims = ds.dims()?;

    let mut file = netcdf::create(path)?;
    for (name, len) in &dims {
        file.add_dimension(name, *len)?;
    }

    for (name, var) in &ds.variables {
        let dim_names: Vec<&str> = var.dims.iter().map(String::as_str).collect();
        let mut v = file.add_variable::<f64>(name, &dim_names)?;
        let flat: Vec<f64> = var.data.iter().copied().collect();
        v.put_values(&flat, ..)?;
        for (key, value) in &var.attrs {
            v.put_attribute(key, value.as_str())?;
        }
    }

    for (key, value) in &ds.attrs {
        file.add_attribute(key, value.as_str())?;
    }

    Ok(())
}

fn put_scalar(file: &mut netcdf::FileMut, name: &str, value: f64) -> Result<(), IoError> {
    let mut var = file.add_variable::<f64>(name, &["one"])?;
    var.put_values(&[value], ..)?;
    Ok(())
}

fn put_field(
    file: &mut netcdf::FileMut,
    name: &str,
    dims: [&str; 2],
    data: &Array2<f64>,
) -> Result<(), IoError> {
    let mut var = file.add_variable::<f64>(name, &dims)?;
    let flat: Vec<f64> = data.iter().copied().collect();
    var.put_values(&flat, ..)?;
    Ok(())
}

fn put_mask(
    file: &mut netcdf::FileMut,
    name: &str,
    dims: [&str; 2],
    mask: &Array2<bool>,
) -> Result<(), IoError> {
    let mut var = file.add_variable::<f64>(name, &dims)?;
    let flat: Vec<f64> = mask.iter().map(|&wet| if wet { 1.0 } else { 0.0 }).collect();
    var.put_values(&flat, ..)?;
    Ok(())
}

/// Write a generated [`GridFile`] under the model's grid-file schema.
pub fn write_grid(grid: &GridFile, path: impl AsRef<Path>) -> Result<(), IoError> {
    let (mp, lp) = grid.lat_rho.dim();

    let mut file = netcdf::create(path)?;
    file.add_dimension("one", 1)?;
    file.add_dimension("bath", 1)?;
    file.add_dimension("eta_rho", mp)?;
    file.add_dimension("xi_rho", lp)?;
    file.add_dimension("eta_u", mp)?;
    file.add_dimension("xi_u", lp - 1)?;
    file.add_dimension("eta_v", mp - 1)?;
    file.add_dimension("xi_v", lp)?;
    file.add_dimension("eta_psi", mp - 1)?;
    file.add_dimension("xi_psi", lp - 1)?;

    put_scalar(&mut file, "xl", grid.xl)?;
    put_scalar(&mut file, "el", grid.el)?;
    put_scalar(&mut file, "depthmin", grid.depthmin)?;
    put_scalar(&mut file, "depthmax", grid.depthmax)?;

    {
        let mut var = file.add_variable::<i8>("spherical", &["one"])?;
        let flag = if grid.spherical { b'T' } else { b'F' } as i8;
        var.put_values(&[flag], ..)?;
    }

    const RHO: [&str; 2] = ["eta_rho", "xi_rho"];
    const U: [&str; 2] = ["eta_u", "xi_u"];
    const V: [&str; 2] = ["eta_v", "xi_v"];
    const PSI: [&str; 2] = ["eta_psi", "xi_psi"];

    put_field(&mut file, "angle", RHO, &grid.angle)?;
    put_field(&mut file, "h", RHO, &grid.h)?;
    put_field(&mut file, "alpha", RHO, &grid.alpha)?;
    put_field(&mut file, "f", RHO, &grid.f)?;
    put_field(&mut file, "pm", RHO, &grid.pm)?;
    put_field(&mut file, "pn", RHO, &grid.pn)?;
    put_field(&mut file, "dndx", RHO, &grid.dndx)?;
    put_field(&mut file, "dmde", RHO, &grid.dmde)?;

    {
        let mut var = file.add_variable::<f64>("hraw", &["bath", "eta_rho", "xi_rho"])?;
        let flat: Vec<f64> = grid.hraw.iter().copied().collect();
        var.put_values(&flat, ..)?;
    }

    put_field(&mut file, "x_rho", RHO, &grid.x_rho)?;
    put_field(&mut file, "y_rho", RHO, &grid.y_rho)?;
    put_field(&mut file, "x_u", U, &grid.x_u)?;
    put_field(&mut file, "y_u", U, &grid.y_u)?;
    put_field(&mut file, "x_v", V, &grid.x_v)?;
    put_field(&mut file, "y_v", V, &grid.y_v)?;
    put_field(&mut file, "x_psi", PSI, &grid.x_psi)?;
    put_field(&mut file, "y_psi", PSI, &grid.y_psi)?;

    put_field(&mut file, "lon_rho", RHO, &grid.lon_rho)?;
    put_field(&mut file, "lat_rho", RHO, &grid.lat_rho)?;
    put_field(&mut file, "lon_u", U, &grid.lon_u)?;
    put_field(&mut file, "lat_u", U, &grid.lat_u)?;
    put_field(&mut file, "lon_v", V, &grid.lon_v)?;
    put_field(&mut file, "lat_v", V, &grid.lat_v)?;
    put_field(&mut file, "lon_psi", PSI, &grid.lon_psi)?;
    put_field(&mut file, "lat_psi", PSI, &grid.lat_psi)?;

    put_mask(&mut file, "mask_rho", RHO, &grid.mask_rho)?;
    put_mask(&mut file, "mask_u", U, &grid.mask_u)?;
    put_mask(&mut file, "mask_v", V, &grid.mask_v)?;
    put_mask(&mut file, "mask_psi", PSI, &grid.mask_psi)?;

    file.add_attribute("title", grid.title.as_str())?;
    let resolution = format!("1/{} deg", 1.0 / grid.resolution);
    file.add_attribute("resolution", resolution.as_str())?;
    file.add_attribute("type", "CROCO grid file")?;

    Ok(())
}

/// Collaborator that preprocesses a persisted model-output file.
///
/// Callers hand over a path; the implementation performs its work as a
/// side effect on storage and reports nothing on success.
pub trait Preprocessor {
    fn preprocess(&self, path: &Path) -> Result<(), IoError>;
}

/// [`Preprocessor`] that coarsens a model-output file.
///
/// Reads the dataset, coarsens every gridded variable by the configured
/// factor, appends a `history` attribute, and writes the result next to
/// the input as `<stem>_coarse.nc`.
#[derive(Clone, Copy, Debug)]
pub struct CoarsenPreprocessor {
    factor: usize,
}

impl CoarsenPreprocessor {
    pub fn new(factor: usize) -> Self {
        Self { factor }
    }

    /// Output path for a given input path.
    pub fn output_path(path: &Path) -> PathBuf {
        let stem = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.strip_suffix(".nc"))
            .unwrap_or("output");
        path.with_file_name(format!("{}_coarse.nc", stem))
    }
}

impl Preprocessor for CoarsenPreprocessor {
    fn preprocess(&self, path: &Path) -> Result<(), IoError> {
        if !path.exists() {
            return Err(GridError::PathNotFound(path.to_path_buf()).into());
        }

        let ds = read_dataset(path)?;
        let mut coarse = coarsen_dataset(&ds, self.factor)?;

        let stamp = Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
        let entry = format!("{}: coarsened by factor {}", stamp, self.factor);
        let history = match coarse.attrs.get("history") {
            Some(prior) => format!("{}\n{}", entry, prior),
            None => entry,
        };
        coarse.attrs.insert("history".to_string(), history);

        let out = Self::output_path(path);
        write_dataset(&coarse, &out)?;
        tracing::info!(input = %path.display(), output = %out.display(), factor = self.factor, "coarsened dataset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;

    fn sample_dataset() -> Dataset {
        let mut builder = DatasetBuilder::new();
        let mut attrs = BTreeMap::new();
        attrs.insert("units".to_string(), "meter".to_string());
        builder.insert(
            "zeta",
            Variable::new(
                vec!["eta_rho".to_string(), "xi_rho".to_string()],
                ArrayD::from_shape_fn(IxDyn(&[3, 4]), |ix| (ix[0] * 4 + ix[1]) as f64),
            )
            .with_attrs(attrs),
        );
        builder.insert(
            "eta_rho",
            Variable::new(
                vec!["eta_rho".to_string()],
                ArrayD::from_shape_fn(IxDyn(&[3]), |ix| ix[0] as f64),
            ),
        );
        builder.set_coord("eta_rho");
        let mut global = BTreeMap::new();
        global.insert("title".to_string(), "sample".to_string());
        builder.set_attrs(global);
        builder.build()
    }

    #[test]
    fn test_dataset_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.nc");

        let ds = sample_dataset();
        write_dataset(&ds, &path).unwrap();
        let back = read_dataset(&path).unwrap();

        let zeta = back.get("zeta").unwrap();
        assert_eq!(zeta.dims, vec!["eta_rho", "xi_rho"]);
        assert_eq!(zeta.data, ds.get("zeta").unwrap().data);
        assert_eq!(zeta.attrs["units"], "meter");
        assert_eq!(back.attrs["title"], "sample");
        assert!(back.coords.contains("eta_rho"));
    }

    #[test]
    fn test_output_path() {
        let out = CoarsenPreprocessor::output_path(Path::new("/data/ocean_avg.nc"));
        assert_eq!(out, Path::new("/data/ocean_avg_coarse.nc"));
    }
}
