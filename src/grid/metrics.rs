//! Grid-spacing metrics from staggered latitude/longitude arrays.

use ndarray::Array2;

use crate::geodesy::spheric_dist;

/// Compute the metric fields `(pm, pn, dndx, dmde)` at rho points.
///
/// `pm`/`pn` are the reciprocal great-circle distances between adjacent
/// u-points (zonal) and v-points (meridional), with the edge rows and
/// columns replicated outward once. `dndx`/`dmde` are centered
/// differences of `1/pn` and `1/pm` scaled by 0.5, zero on the
/// outermost ring where no neighbor exists.
///
/// `latu`/`lonu` have shape `(Mp, L)` and `latv`/`lonv` shape
/// `(M, Lp)` with `L = Lp - 1`, `M = Mp - 1`; the results are
/// rho-shaped `(Mp, Lp)`.
pub fn get_metrics(
    latu: &Array2<f64>,
    lonu: &Array2<f64>,
    latv: &Array2<f64>,
    lonv: &Array2<f64>,
) -> (Array2<f64>, Array2<f64>, Array2<f64>, Array2<f64>) {
    let (mp, l) = latu.dim();
    let (m, lp) = latv.dim();
    let lm = l - 1;
    let mm = m - 1;

    let mut dx = Array2::<f64>::zeros((mp, lp));
    let mut dy = Array2::<f64>::zeros((mp, lp));

    // Zonal spacing between u-points.
    for i in 0..mp {
        for j in 1..l {
            dx[[i, j]] = spheric_dist(
                latu[[i, j - 1]],
                latu[[i, j]],
                lonu[[i, j - 1]],
                lonu[[i, j]],
            );
        }
        dx[[i, 0]] = dx[[i, 1]];
        dx[[i, lp - 1]] = dx[[i, lm]];
    }

    // Meridional spacing between v-points.
    for j in 0..lp {
        for i in 1..m {
            dy[[i, j]] = spheric_dist(
                latv[[i - 1, j]],
                latv[[i, j]],
                lonv[[i - 1, j]],
                lonv[[i, j]],
            );
        }
        dy[[0, j]] = dy[[1, j]];
        dy[[mp - 1, j]] = dy[[mm, j]];
    }

    let pm = dx.mapv(|d| 1.0 / d);
    let pn = dy.mapv(|d| 1.0 / d);

    let mut dndx = Array2::<f64>::zeros((mp, lp));
    let mut dmde = Array2::<f64>::zeros((mp, lp));

    // Centered gradients; the outer ring keeps its zero initialization.
    for i in 1..m {
        for j in 1..l {
            dndx[[i, j]] = 0.5 * (1.0 / pn[[i, j + 1]] - 1.0 / pn[[i, j - 1]]);
            dmde[[i, j]] = 0.5 * (1.0 / pm[[i + 1, j]] - 1.0 / pm[[i - 1, j]]);
        }
    }

    (pm, pn, dndx, dmde)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stagger::rho2uvp;

    fn uniform_grid() -> (Array2<f64>, Array2<f64>) {
        let lat = Array2::from_shape_fn((6, 8), |(i, _)| 45.0 + 0.1 * i as f64);
        let lon = Array2::from_shape_fn((6, 8), |(_, j)| -70.0 + 0.1 * j as f64);
        (lat, lon)
    }

    #[test]
    fn test_metrics_shapes_and_positivity() {
        let (lat, lon) = uniform_grid();
        let (latu, latv, _) = rho2uvp(&lat);
        let (lonu, lonv, _) = rho2uvp(&lon);
        let (pm, pn, dndx, dmde) = get_metrics(&latu, &lonu, &latv, &lonv);

        assert_eq!(pm.dim(), (6, 8));
        assert_eq!(pn.dim(), (6, 8));
        for &v in pm.iter().chain(pn.iter()) {
            assert!(v > 0.0 && v.is_finite());
        }
        assert_eq!(dndx.dim(), (6, 8));
        assert_eq!(dmde.dim(), (6, 8));
    }

    #[test]
    fn test_gradient_ring_is_zero() {
        let (lat, lon) = uniform_grid();
        let (latu, latv, _) = rho2uvp(&lat);
        let (lonu, lonv, _) = rho2uvp(&lon);
        let (_, _, dndx, dmde) = get_metrics(&latu, &lonu, &latv, &lonv);

        let (mp, lp) = dndx.dim();
        for j in 0..lp {
            assert_eq!(dndx[[0, j]], 0.0);
            assert_eq!(dndx[[mp - 1, j]], 0.0);
            assert_eq!(dmde[[0, j]], 0.0);
            assert_eq!(dmde[[mp - 1, j]], 0.0);
        }
        for i in 0..mp {
            assert_eq!(dndx[[i, 0]], 0.0);
            assert_eq!(dndx[[i, lp - 1]], 0.0);
            assert_eq!(dmde[[i, 0]], 0.0);
            assert_eq!(dmde[[i, lp - 1]], 0.0);
        }
    }

    #[test]
    fn test_uniform_longitude_spacing_gives_uniform_pm() {
        let (lat, lon) = uniform_grid();
        let (latu, latv, _) = rho2uvp(&lat);
        let (lonu, lonv, _) = rho2uvp(&lon);
        let (pm, _, _, _) = get_metrics(&latu, &lonu, &latv, &lonv);

        // Along one row the zonal spacing is constant, so pm is too.
        for j in 1..7 {
            assert!((pm[[2, j]] - pm[[2, 1]]).abs() / pm[[2, 1]] < 1e-9);
        }
    }
}
