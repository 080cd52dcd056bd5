//! Great-circle distances over a fixed-radius spherical earth model,
//! computed with the haversine formula.

const EARTH_RADIUS_MILES: f64 = 3956.0;
const EARTH_RADIUS_KILOMETERS: f64 = 6367.0;

/// Orthodromic distance in miles between two points given in decimal
/// degrees.
pub fn distance_in_miles(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    distance(lat1, lng1, lat2, lng2, EARTH_RADIUS_MILES)
}

/// Orthodromic distance in kilometers between two points given in decimal
/// degrees.
pub fn distance_in_kilometers(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    distance(lat1, lng1, lat2, lng2, EARTH_RADIUS_KILOMETERS)
}

/// Haversine formula, <http://en.wikipedia.org/wiki/Haversine_formula>.
fn distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64, radius: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let sin_lat = (0.5 * d_lat).sin();
    let sin_lng = (0.5 * d_lng).sin();
    let a = sin_lat * sin_lat + lat1.to_radians().cos() * lat2.to_radians().cos() * sin_lng * sin_lng;
    // The clamp keeps floating point overshoot near antipodal points out of
    // asin's domain.
    radius * 2.0 * a.sqrt().min(1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_points_are_zero_distance() {
        assert_eq!(distance_in_miles(36.12, -86.67, 36.12, -86.67), 0.0);
        assert_eq!(distance_in_kilometers(-45.0, 170.0, -45.0, 170.0), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let ab = distance_in_miles(36.12, -86.67, 33.94, -118.40);
        let ba = distance_in_miles(33.94, -118.40, 36.12, -86.67);
        assert_eq!(ab, ba);
    }

    #[test]
    fn nashville_to_los_angeles_golden_value() {
        let d = distance_in_miles(36.12, -86.67, 33.94, -118.40);
        assert!((d - 1792.3).abs() < 1.0, "got {}", d);
    }

    #[test]
    fn kilometers_use_the_larger_radius() {
        let mi = distance_in_miles(36.12, -86.67, 33.94, -118.40);
        let km = distance_in_kilometers(36.12, -86.67, 33.94, -118.40);
        assert!((km / mi - 6367.0 / 3956.0).abs() < 1e-9);
    }

    #[test]
    fn antipodal_points_stay_in_asin_domain() {
        let d = distance_in_miles(90.0, 0.0, -90.0, 0.0);
        assert!(d.is_finite());
        // Half the circumference of the sphere.
        assert!((d - 3956.0 * ::std::f64::consts::PI).abs() < 1e-6);
    }
}
