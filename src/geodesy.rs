//! Geodesy primitives for C-grid geometry.
//!
//! Great-circle distances feed the `pm`/`pn` metric fields, the
//! ellipsoidal azimuth yields the local grid rotation `angle`, and the
//! meridional recurrence `lat' = lat + dl·cos(lat)` spaces latitude rows
//! so that grid cells keep a near-uniform physical size towards the
//! poles. `get_prev_lat` inverts that recurrence with Newton-Raphson so
//! ghost rows south of the domain follow the same convention.

use std::f64::consts::PI;

use ndarray::Array2;

/// Mean Earth radius used for great-circle distances (m).
pub const EARTH_RADIUS: f64 = 6_367_442.76;

/// WGS 1984 semi-major axis (m).
pub const WGS84_SEMI_MAJOR: f64 = 6_378_137.0;

/// WGS 1984 first eccentricity.
pub const WGS84_ECCENTRICITY: f64 = 0.081_819_191;

/// Great-circle distance between two points on a sphere of radius
/// [`EARTH_RADIUS`], with the longitude difference wrapped to [-π, π].
///
/// Inputs are in degrees, the result in meters.
pub fn spheric_dist(lat1: f64, lat2: f64, lon1: f64, lon2: f64) -> f64 {
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();
    let lon1 = lon1.to_radians();
    let lon2 = lon2.to_radians();

    let mut l = (lon2 - lon1).abs();
    if l >= PI {
        l = 2.0 * PI - l;
    }

    let a = l.sin() * lat2.cos();
    let b = lat2.sin() * lat1.cos() - lat1.sin() * lat2.cos() * l.cos();
    EARTH_RADIUS * (a * a + b * b).sqrt().asin()
}

/// Step a latitude northward by one grid row under the fixed angular
/// spacing `dl` (degrees): `lat' = lat + dl·cos(lat)`.
pub fn get_next_lat(lat: f64, dl: f64) -> f64 {
    lat + dl * lat.to_radians().cos()
}

/// Invert [`get_next_lat`]: find the latitude whose northward step lands
/// on `lat`.
///
/// Newton-Raphson on `f(p) = p + dl·cos(p) - lat`, tolerance 1e-6, at
/// most 100 iterations. If the iteration cap is reached the last
/// iterate is returned and a warning is emitted.
pub fn get_prev_lat(lat: f64, dl: f64) -> f64 {
    const TOLERANCE: f64 = 1e-6;
    const MAX_ITERATIONS: usize = 100;

    let mut prev = lat;
    for _ in 0..MAX_ITERATIONS {
        let f = prev + dl * prev.to_radians().cos() - lat;
        let f_prime = 1.0 - dl * prev.to_radians().sin() * (PI / 180.0);
        let next = prev - f / f_prime;
        if (next - prev).abs() < TOLERANCE {
            return next;
        }
        prev = next;
    }

    tracing::warn!(lat, dl, "latitude solve hit the iteration cap; using last iterate");
    prev
}

/// Three-valued sign: -1, 0, or +1.
fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Azimuth of the geodesic from (`phi1`, `lam1`) to (`phi2`, `lam2`) on
/// the WGS84 ellipsoid, quadrant-corrected to (-π, π]. All in radians.
fn azimuth(phi1: f64, lam1: f64, phi2: f64, lam2: f64) -> f64 {
    let a = WGS84_SEMI_MAJOR;
    let e = WGS84_ECCENTRICITY;

    // Wiggle degenerate segments so the azimuth stays defined.
    let mut phi1 = phi1;
    let mut phi2 = phi2;
    let mut lam2 = lam2;
    if phi1 == 0.0 {
        phi1 = f64::EPSILON;
    }
    if phi2 == 0.0 {
        phi2 = f64::EPSILON;
    }
    if phi1 == phi2 {
        phi2 += 1e-14;
    }
    if lam1 == lam2 {
        lam2 += 1e-14;
    }

    // Radii of curvature in the prime vertical.
    let xnu1 = a / (1.0 - (e * phi1.sin()).powi(2)).sqrt();
    let xnu2 = a / (1.0 - (e * phi2.sin()).powi(2)).sqrt();

    let tpsi2 =
        (1.0 - e * e) * phi2.tan() + e * e * xnu1 * phi1.sin() / (xnu2 * phi2.cos());

    let dlam = lam2 - lam1;
    let cta12 = (phi1.cos() * tpsi2 - phi1.sin() * dlam.cos()) / dlam.sin();
    let mut azim = (1.0 / cta12).atan();

    let dlam2 = if dlam.abs() < PI {
        dlam
    } else if dlam >= PI {
        -2.0 * PI + dlam
    } else {
        2.0 * PI + dlam
    };

    if azim < -PI {
        azim += 2.0 * PI;
    }
    if azim >= PI {
        azim -= 2.0 * PI;
    }
    if sign(azim) != sign(dlam2) {
        azim += PI * sign(-azim);
    }

    azim
}

/// Local grid rotation relative to true east, from consecutive u-points
/// along each row.
///
/// `latu`/`lonu` are the u-point coordinates in degrees, shape `(Mp, L)`.
/// The result has shape `(Mp, L + 1)` (rho-point columns); the first and
/// last columns are copied from their nearest interior neighbor.
pub fn get_angle(latu: &Array2<f64>, lonu: &Array2<f64>) -> Array2<f64> {
    let (rows, cols) = latu.dim();
    assert!(cols >= 2, "u-grid must have at least two columns, got {}", cols);
    let mut angle = Array2::<f64>::zeros((rows, cols + 1));

    for i in 0..rows {
        for j in 0..cols - 1 {
            let azim = azimuth(
                latu[[i, j]].to_radians(),
                lonu[[i, j]].to_radians(),
                latu[[i, j + 1]].to_radians(),
                lonu[[i, j + 1]].to_radians(),
            );
            angle[[i, j + 1]] = PI / 2.0 - azim;
        }
        angle[[i, 0]] = angle[[i, 1]];
        angle[[i, cols]] = angle[[i, cols - 1]];
    }

    angle
}
