//! Staggered-grid locations and conversions.
//!
//! An Arakawa C-grid carries quantities at four locations per cell:
//! center (rho), east-west face (u), north-south face (v), and corner
//! (psi). Fields are classified by the dimension-name pair they carry,
//! and cell-center values are averaged onto the derived locations.

use ndarray::{s, Array2, ArrayBase, Data, Ix2};

/// The four staggered locations on an Arakawa C-grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stagger {
    /// Cell center.
    Rho,
    /// East-west face.
    U,
    /// North-south face.
    V,
    /// Cell corner.
    Psi,
}

impl Stagger {
    /// Classify a `(eta, xi)` dimension-name pair.
    ///
    /// The v-check runs first, then u, then rho, matching the naming of
    /// the model's own datasets: any `eta_v` variable is a v-field even
    /// when its xi dimension is not `xi_v`, and likewise `xi_u` marks a
    /// u-field. Pairs that match none of the rules are unclassified and
    /// the caller skips them.
    pub fn classify(eta: &str, xi: &str) -> Option<Stagger> {
        if eta == "eta_v" {
            Some(Stagger::V)
        } else if xi == "xi_u" {
            Some(Stagger::U)
        } else if eta == "eta_rho" && xi == "xi_rho" {
            Some(Stagger::Rho)
        } else {
            None
        }
    }
}

/// Average a cell-center field onto the u, v, and psi locations.
///
/// `u[i,j] = 0.5*(rho[i,j] + rho[i,j+1])` (one fewer column),
/// `v[i,j] = 0.5*(rho[i,j] + rho[i+1,j])` (one fewer row),
/// `psi` averages u along eta (one fewer row than u). No boundary
/// handling; the caller supplies already-padded input when edge values
/// are needed.
pub fn rho2uvp<S: Data<Elem = f64>>(
    rho: &ArrayBase<S, Ix2>,
) -> (Array2<f64>, Array2<f64>, Array2<f64>) {
    let u = 0.5 * (&rho.slice(s![.., 1..]) + &rho.slice(s![.., ..-1]));
    let v = 0.5 * (&rho.slice(s![1.., ..]) + &rho.slice(s![..-1, ..]));
    let p = 0.5 * (&u.slice(s![1.., ..]) + &u.slice(s![..-1, ..]));
    (u, v, p)
}

/// Propagate a wet/dry cell-center mask to the u, v, and psi locations.
///
/// A face or corner is wet only when every adjacent cell center is wet.
pub fn uvp_mask(rfield: &Array2<bool>) -> (Array2<bool>, Array2<bool>, Array2<bool>) {
    let ufield = &rfield.slice(s![.., ..-1]) & &rfield.slice(s![.., 1..]);
    let vfield = &rfield.slice(s![..-1, ..]) & &rfield.slice(s![1.., ..]);
    let pfield = &ufield.slice(s![..-1, ..]) & &ufield.slice(s![1.., ..]);
    (ufield, vfield, pfield)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_classify_priority() {
        assert_eq!(Stagger::classify("eta_rho", "xi_rho"), Some(Stagger::Rho));
        assert_eq!(Stagger::classify("eta_rho", "xi_u"), Some(Stagger::U));
        assert_eq!(Stagger::classify("eta_v", "xi_rho"), Some(Stagger::V));
        // v wins over u when both markers are present.
        assert_eq!(Stagger::classify("eta_v", "xi_u"), Some(Stagger::V));
        assert_eq!(Stagger::classify("eta_u", "xi_v"), None);
    }

    #[test]
    fn test_rho2uvp_shapes_and_values() {
        let rho = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
        let (u, v, p) = rho2uvp(&rho);
        assert_eq!(u.dim(), (3, 2));
        assert_eq!(v.dim(), (2, 3));
        assert_eq!(p.dim(), (2, 2));
        assert_eq!(u[[0, 0]], 1.5);
        assert_eq!(v[[0, 0]], 2.5);
        // psi averages u along eta: 0.5*(1.5 + 4.5).
        assert_eq!(p[[0, 0]], 3.0);
    }

    #[test]
    fn test_uvp_mask_and_rule() {
        let rfield = array![[true, true, false], [true, true, true], [false, true, true]];
        let (u, v, p) = uvp_mask(&rfield);
        for i in 0..3 {
            for j in 0..2 {
                assert_eq!(u[[i, j]], rfield[[i, j]] && rfield[[i, j + 1]]);
            }
        }
        for i in 0..2 {
            for j in 0..3 {
                assert_eq!(v[[i, j]], rfield[[i, j]] && rfield[[i + 1, j]]);
            }
        }
        for i in 0..2 {
            for j in 0..2 {
                assert_eq!(p[[i, j]], u[[i, j]] && u[[i + 1, j]]);
            }
        }
    }
}
