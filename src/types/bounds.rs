//! Geographic domain bounds.

use std::fmt;

/// Rectangular latitude/longitude extent of a model domain.
///
/// # Example
///
/// ```
/// use croco_prep::types::GeoBounds;
///
/// // Northwest Atlantic shelf domain (approximate)
/// let bounds = GeoBounds::new(45.0, 50.0, -70.0, -60.0);
/// assert_eq!(bounds.lat_span(), 5.0);
/// assert_eq!(bounds.lon_span(), 10.0);
/// assert_eq!(bounds.center(), (47.5, -65.0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoBounds {
    /// Southern boundary (degrees north).
    pub lat_min: f64,
    /// Northern boundary (degrees north).
    pub lat_max: f64,
    /// Western boundary (degrees east).
    pub lon_min: f64,
    /// Eastern boundary (degrees east).
    pub lon_max: f64,
}

impl GeoBounds {
    /// Create new domain bounds.
    ///
    /// # Panics
    ///
    /// Panics if `lat_max <= lat_min` or `lon_max <= lon_min`.
    pub fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Self {
        assert!(
            lat_max > lat_min,
            "lat_max ({}) must be greater than lat_min ({})",
            lat_max,
            lat_min
        );
        assert!(
            lon_max > lon_min,
            "lon_max ({}) must be greater than lon_min ({})",
            lon_max,
            lon_min
        );

        Self {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
        }
    }

    /// Meridional extent in degrees.
    #[inline]
    pub fn lat_span(&self) -> f64 {
        self.lat_max - self.lat_min
    }

    /// Zonal extent in degrees.
    #[inline]
    pub fn lon_span(&self) -> f64 {
        self.lon_max - self.lon_min
    }

    /// Center of the domain as `(lat, lon)`.
    #[inline]
    pub fn center(&self) -> (f64, f64) {
        (
            0.5 * (self.lat_min + self.lat_max),
            0.5 * (self.lon_min + self.lon_max),
        )
    }

    /// Whether a point lies inside the bounds (edges included).
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.lat_min && lat <= self.lat_max && lon >= self.lon_min && lon <= self.lon_max
    }
}

impl fmt::Display for GeoBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}] N x [{}, {}] E",
            self.lat_min, self.lat_max, self.lon_min, self.lon_max
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_creation() {
        let b = GeoBounds::new(45.0, 50.0, -70.0, -60.0);
        assert_eq!(b.lat_span(), 5.0);
        assert_eq!(b.lon_span(), 10.0);
    }

    #[test]
    fn test_contains() {
        let b = GeoBounds::new(45.0, 50.0, -70.0, -60.0);
        assert!(b.contains(47.0, -65.0));
        assert!(b.contains(45.0, -70.0));
        assert!(!b.contains(44.9, -65.0));
        assert!(!b.contains(47.0, -59.9));
    }

    #[test]
    #[should_panic(expected = "lat_max")]
    fn test_inverted_latitudes() {
        GeoBounds::new(50.0, 45.0, -70.0, -60.0);
    }

    #[test]
    #[should_panic(expected = "lon_max")]
    fn test_inverted_longitudes() {
        GeoBounds::new(45.0, 50.0, -60.0, -70.0);
    }
}
