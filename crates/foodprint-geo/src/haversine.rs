//! Great-circle distance.

use foodprint_core::Coordinates;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points in kilometres.
///
/// `d = 2R·asin(√(sin²(Δlat/2) + cos(lat1)·cos(lat2)·sin²(Δlng/2)))`
#[must_use]
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    // Rounding can push h a hair above 1.0 for antipodal points.
    2.0 * EARTH_RADIUS_KM * h.clamp(0.0, 1.0).sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(lat: f64, lng: f64) -> Coordinates {
        Coordinates { lat, lng }
    }

    #[test]
    fn same_point_is_zero() {
        let p = c(52.37, 4.90);
        assert!(haversine_km(p, p).abs() < 1e-9);
    }

    #[test]
    fn symmetric() {
        let pairs = [
            (c(52.37, 4.90), c(40.4168, -3.7038)),
            (c(-33.87, 151.21), c(51.51, -0.13)),
            (c(0.0, 179.9), c(0.0, -179.9)),
            (c(89.9, 0.0), c(-89.9, 0.0)),
        ];
        for (a, b) in pairs {
            assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-9);
        }
    }

    #[test]
    fn amsterdam_to_madrid_is_about_1480_km() {
        let d = haversine_km(c(52.37, 4.90), c(40.4168, -3.7038));
        assert!((1400.0..1550.0).contains(&d), "got {d}");
    }

    #[test]
    fn berlin_to_paris_is_about_878_km() {
        let d = haversine_km(c(52.5200, 13.4050), c(48.8566, 2.3522));
        assert!((d - 878.0).abs() < 10.0, "got {d}");
    }

    #[test]
    fn antipodes_do_not_produce_nan() {
        let d = haversine_km(c(0.0, 0.0), c(0.0, 180.0));
        assert!(d.is_finite());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1.0);
    }
}
