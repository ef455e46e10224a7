/// Earth's radius in meters (for Haversine formula)
const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// A point is usable for distance comparisons only when both coordinates
    /// are finite and within the valid WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && self.lat.abs() <= 90.0
            && self.lon.abs() <= 180.0
    }
}

/// Haversine great-circle distance between two points, in meters.
///
/// Returns `f64::INFINITY` when either point is malformed, so an unlocatable
/// candidate can never win a "closest" comparison.
pub fn distance_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    if !a.is_valid() || !b.is_valid() {
        return f64::INFINITY;
    }

    let lat1_rad = a.lat.to_radians();
    let lat2_rad = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lon = (b.lon - a.lon).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().asin();

    EARTH_RADIUS_METERS * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_known_pair() {
        // Delhi to Agra, approx 180km great-circle
        let delhi = GeoPoint::new(28.6139, 77.2090);
        let agra = GeoPoint::new(27.1767, 78.0081);

        let distance = distance_meters(delhi, agra);

        assert!(distance > 170_000.0 && distance < 190_000.0);
    }

    #[test]
    fn test_distance_same_point() {
        let p = GeoPoint::new(28.46, 77.50);

        assert!(distance_meters(p, p) < 1.0);
    }

    #[test]
    fn test_invalid_point_is_infinitely_far() {
        let good = GeoPoint::new(28.46, 77.50);
        let nan = GeoPoint::new(f64::NAN, 77.50);
        let out_of_range = GeoPoint::new(120.0, 77.50);

        assert_eq!(distance_meters(good, nan), f64::INFINITY);
        assert_eq!(distance_meters(nan, good), f64::INFINITY);
        assert_eq!(distance_meters(good, out_of_range), f64::INFINITY);
    }

    #[test]
    fn test_short_distance_accuracy() {
        // ~0.01 degrees of longitude at lat 28.46 is roughly 978m
        let a = GeoPoint::new(28.46, 77.50);
        let b = GeoPoint::new(28.46, 77.51);

        let distance = distance_meters(a, b);

        assert!(distance > 900.0 && distance < 1_050.0);
    }
}
