//! NetCDF round-trip tests (require the `netcdf` feature).

#![cfg(feature = "netcdf")]

use std::collections::BTreeMap;

use croco_prep::io::{read_dataset, write_dataset, write_grid};
use croco_prep::{create_grid, DatasetBuilder, GeoBounds, GridExtent, Variable};
use ndarray::{ArrayD, IxDyn};

#[test]
fn dataset_roundtrip_preserves_everything() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roundtrip.nc");

    let mut b = DatasetBuilder::new();
    b.insert(
        "zeta",
        Variable::new(
            vec!["time".to_string(), "eta_rho".to_string(), "xi_rho".to_string()],
            ArrayD::from_shape_fn(IxDyn(&[2, 3, 4]), |ix| (ix[0] * 12 + ix[1] * 4 + ix[2]) as f64),
        ),
    );
    b.insert(
        "xi_rho",
        Variable::new(
            vec!["xi_rho".to_string()],
            ArrayD::from_shape_fn(IxDyn(&[4]), |ix| ix[0] as f64),
        ),
    );
    b.set_coord("xi_rho");
    let mut attrs = BTreeMap::new();
    attrs.insert("title".to_string(), "roundtrip".to_string());
    b.set_attrs(attrs);
    let ds = b.build();

    write_dataset(&ds, &path).unwrap();
    let back = read_dataset(&path).unwrap();

    let zeta = back.get("zeta").unwrap();
    assert_eq!(zeta.dims, vec!["time", "eta_rho", "xi_rho"]);
    assert_eq!(zeta.data, ds.get("zeta").unwrap().data);
    assert!(back.coords.contains("xi_rho"));
    assert_eq!(back.attrs["title"], "roundtrip");
}

#[test]
fn grid_file_carries_the_full_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test_grd.nc");

    let extent = GridExtent {
        bounds: GeoBounds::new(45.0, 45.4, -70.0, -69.5),
        dl: 0.05,
    };
    let grid = create_grid(&extent, 1e37, "test_grid").unwrap();
    write_grid(&grid, &path).unwrap();

    let back = read_dataset(&path).unwrap();
    for name in [
        "xl", "el", "depthmin", "depthmax", "angle", "h", "hraw", "alpha", "f", "pm", "pn",
        "dndx", "dmde", "x_rho", "y_rho", "x_u", "y_u", "x_v", "y_v", "x_psi", "y_psi",
        "lon_rho", "lat_rho", "lon_u", "lat_u", "lon_v", "lat_v", "lon_psi", "lat_psi",
        "mask_rho", "mask_u", "mask_v", "mask_psi",
    ] {
        assert!(back.get(name).is_some(), "{} missing from grid file", name);
    }

    let (mp, lp) = grid.lat_rho.dim();
    assert_eq!(back.get("h").unwrap().data.shape(), &[mp, lp]);
    assert_eq!(back.get("hraw").unwrap().data.shape(), &[1, mp, lp]);
    assert_eq!(back.get("lat_u").unwrap().data.shape(), &[mp, lp - 1]);
    assert_eq!(back.get("lat_v").unwrap().data.shape(), &[mp - 1, lp]);
    assert!(back
        .get("mask_rho")
        .unwrap()
        .data
        .iter()
        .all(|&v| v == 1.0));

    assert_eq!(back.attrs["title"], "test_grid");
    assert_eq!(back.attrs["type"], "CROCO grid file");
    assert!(back.attrs["resolution"].starts_with("1/"));
}
