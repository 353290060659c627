//! In-memory model of a self-describing gridded dataset.
//!
//! A [`Dataset`] is a named mapping from variable name to [`Variable`],
//! a set of names flagged as coordinates, and free-form string
//! attributes at dataset granularity. Coarsening never mutates a
//! dataset in place: a [`DatasetBuilder`] accumulates the new variables
//! and the final dataset is constructed once, at the end.

use std::collections::{BTreeMap, BTreeSet};

use ndarray::ArrayD;

use crate::error::{GridError, GridResult};

/// A single variable: named dimensions, values, and attributes.
///
/// For gridded variables the last two dimensions are the horizontal
/// `(eta, xi)` axes; any leading dimensions (time, vertical level) are
/// batch axes that coarsening passes through unchanged.
#[derive(Clone, Debug)]
pub struct Variable {
    /// Dimension names, outermost first.
    pub dims: Vec<String>,
    /// Values, shaped like `dims`.
    pub data: ArrayD<f64>,
    /// Per-variable attributes.
    pub attrs: BTreeMap<String, String>,
}

impl Variable {
    /// Create a variable with no attributes.
    pub fn new(dims: Vec<String>, data: ArrayD<f64>) -> Self {
        Self {
            dims,
            data,
            attrs: BTreeMap::new(),
        }
    }

    /// Attach attributes.
    pub fn with_attrs(mut self, attrs: BTreeMap<String, String>) -> Self {
        self.attrs = attrs;
        self
    }

    /// The trailing `(eta, xi)` dimension names, when the variable is
    /// horizontally gridded.
    pub fn horizontal_dims(&self) -> Option<(&str, &str)> {
        if self.dims.len() < 2 {
            return None;
        }
        let eta = &self.dims[self.dims.len() - 2];
        let xi = &self.dims[self.dims.len() - 1];
        if eta.starts_with("eta_") && xi.starts_with("xi_") {
            Some((eta, xi))
        } else {
            None
        }
    }

    /// Whether the variable carries both named dimensions.
    pub fn uses_dims(&self, eta: &str, xi: &str) -> bool {
        self.dims.iter().any(|d| d == eta) && self.dims.iter().any(|d| d == xi)
    }
}

/// A named collection of variables, coordinate flags, and attributes.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    /// Variables by name, coordinates included.
    pub variables: BTreeMap<String, Variable>,
    /// Names of variables flagged as coordinates.
    pub coords: BTreeSet<String>,
    /// Dataset-level attributes.
    pub attrs: BTreeMap<String, String>,
}

impl Dataset {
    /// Look up a variable by name.
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// All dimension names present in the dataset.
    pub fn dim_names(&self) -> BTreeSet<String> {
        self.variables
            .values()
            .flat_map(|v| v.dims.iter().cloned())
            .collect()
    }

    /// Dimension sizes, checked for consistency across variables.
    pub fn dims(&self) -> GridResult<BTreeMap<String, usize>> {
        let mut dims = BTreeMap::new();
        for (name, var) in &self.variables {
            for (dim, &len) in var.dims.iter().zip(var.data.shape()) {
                match dims.get(dim) {
                    None => {
                        dims.insert(dim.clone(), len);
                    }
                    Some(&seen) if seen == len => {}
                    Some(&seen) => {
                        return Err(GridError::InvalidShape(format!(
                            "dimension {} is {} in variable {} but {} elsewhere",
                            dim, len, name, seen
                        )));
                    }
                }
            }
        }
        Ok(dims)
    }
}

/// Accumulates variables and assembles a [`Dataset`] in one shot.
#[derive(Debug, Default)]
pub struct DatasetBuilder {
    variables: BTreeMap<String, Variable>,
    coords: BTreeSet<String>,
    attrs: BTreeMap<String, String>,
}

impl DatasetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a variable.
    pub fn insert(&mut self, name: impl Into<String>, var: Variable) {
        self.variables.insert(name.into(), var);
    }

    /// Flag a variable name as a coordinate.
    pub fn set_coord(&mut self, name: impl Into<String>) {
        self.coords.insert(name.into());
    }

    /// Replace the dataset-level attributes.
    pub fn set_attrs(&mut self, attrs: BTreeMap<String, String>) {
        self.attrs = attrs;
    }

    /// Whether a variable with this name has been inserted.
    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Look at a variable inserted earlier.
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// Assemble the final dataset.
    pub fn build(self) -> Dataset {
        Dataset {
            variables: self.variables,
            coords: self.coords,
            attrs: self.attrs,
        }
    }
}
