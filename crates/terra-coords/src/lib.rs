//! Geographic coordinates and their placement on a sphere.
//!
//! [`geo_to_cartesian`] maps latitude/longitude in degrees onto a sphere of a
//! given radius using the same axis convention as the globe's UV mapping:
//! +Y is the north pole and the prime meridian crosses the equator on +X.

mod locations;

pub use locations::DEFAULT_LOCATIONS;

use glam::DVec3;

/// A named site on the globe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub name: &'static str,
    /// Latitude in degrees, in `[-90, 90]`.
    pub lat: f64,
    /// Longitude in degrees, in `[-180, 180]`.
    pub lon: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lon: f64) -> Self {
        Self { name, lat, lon }
    }

    /// Position of this location on a sphere of `radius`.
    pub fn position(&self, radius: f64) -> DVec3 {
        geo_to_cartesian(self.lat, self.lon, radius)
    }
}

/// Convert latitude/longitude in degrees to a point on a sphere of `radius`.
///
/// Inputs are not validated. For any input the result has length `radius`.
pub fn geo_to_cartesian(lat_deg: f64, lon_deg: f64, radius: f64) -> DVec3 {
    let phi = (90.0 - lat_deg).to_radians();
    let theta = (lon_deg + 180.0).to_radians();

    DVec3::new(
        -radius * phi.sin() * theta.cos(),
        radius * phi.cos(),
        radius * phi.sin() * theta.sin(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_magnitude_equals_radius_over_grid() {
        for radius in [0.5, 1.0, 10.2, 6371.0] {
            let mut lat = -90.0;
            while lat <= 90.0 {
                let mut lon = -180.0;
                while lon <= 180.0 {
                    let v = geo_to_cartesian(lat, lon, radius);
                    assert!(
                        (v.length() - radius).abs() < EPS * radius,
                        "lat={lat} lon={lon} r={radius} len={}",
                        v.length()
                    );
                    lon += 7.5;
                }
                lat += 5.0;
            }
        }
    }

    #[test]
    fn test_poles_ignore_longitude() {
        let r = 10.0;
        for lon in [-180.0, -73.2, 0.0, 45.0, 180.0] {
            let north = geo_to_cartesian(90.0, lon, r);
            let south = geo_to_cartesian(-90.0, lon, r);
            assert!((north - DVec3::new(0.0, r, 0.0)).length() < EPS);
            assert!((south - DVec3::new(0.0, -r, 0.0)).length() < EPS);
        }
    }

    #[test]
    fn test_equator_reference_meridians() {
        let r = 2.0;
        // lon 0 lands on +X, lon 90 on -Z, lon -90 on +Z.
        assert!((geo_to_cartesian(0.0, 0.0, r) - DVec3::new(r, 0.0, 0.0)).length() < EPS);
        assert!((geo_to_cartesian(0.0, 90.0, r) - DVec3::new(0.0, 0.0, -r)).length() < EPS);
        assert!((geo_to_cartesian(0.0, -90.0, r) - DVec3::new(0.0, 0.0, r)).length() < EPS);
    }

    #[test]
    fn test_antimeridian_is_continuous() {
        let east = geo_to_cartesian(12.0, 180.0, 5.0);
        let west = geo_to_cartesian(12.0, -180.0, 5.0);
        assert!((east - west).length() < EPS);
    }

    #[test]
    fn test_location_position_delegates() {
        let loc = Location::new("Test", 41.5, 2.25);
        assert_eq!(loc.position(10.2), geo_to_cartesian(41.5, 2.25, 10.2));
    }
}
