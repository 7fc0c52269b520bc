//! Geodesy helpers: spherical Mercator projection and great-circle distance

use geo::Coord;

/// Spherical earth radius used by the Mercator projection, in meters
/// (the WGS84 equatorial radius).
pub const MERCATOR_RADIUS_M: f64 = 6_378_137.0;

/// Mean earth radius used for great-circle distances, in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Convert WGS84 (lat, lon) degrees to spherical Mercator (x, y) meters.
///
/// `x = R·lon_rad`, `y = R·ln(tan(π/4 + lat_rad/2))`. Canvas layouts were
/// calibrated against this exact forward projection, so it must not change.
/// Latitude is not clamped: ride recordings never approach the poles.
#[inline]
pub fn wgs84_to_mercator(lat: f64, lon: f64) -> Coord<f64> {
    let x = MERCATOR_RADIUS_M * lon.to_radians();
    let y = MERCATOR_RADIUS_M * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    Coord { x, y }
}

/// Great-circle distance between two (lat, lon) pairs in meters.
///
/// Haversine formula on a sphere of radius [`EARTH_RADIUS_M`]; plenty for
/// the meter-scale displacement checks it backs.
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a =
        (delta_lat / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mercator_origin() {
        let point = wgs84_to_mercator(0.0, 0.0);
        assert!(point.x.abs() < 0.01);
        assert!(point.y.abs() < 0.01);
    }

    #[test]
    fn test_mercator_axes_orientation() {
        // East is +x, north is +y.
        let east = wgs84_to_mercator(0.0, 10.0);
        assert!(east.x > 0.0);

        let north = wgs84_to_mercator(10.0, 0.0);
        assert!(north.y > 0.0);

        let south_west = wgs84_to_mercator(-10.0, -10.0);
        assert!(south_west.x < 0.0);
        assert!(south_west.y < 0.0);
    }

    #[test]
    fn test_mercator_x_is_linear_in_longitude() {
        let a = wgs84_to_mercator(31.23, 121.47);
        let b = wgs84_to_mercator(31.23, 122.47);
        let expected = MERCATOR_RADIUS_M * 1.0_f64.to_radians();
        assert!((b.x - a.x - expected).abs() < 1e-6);
        assert!((b.y - a.y).abs() < 1e-9);
    }

    #[test]
    fn test_haversine_one_degree_longitude_at_equator() {
        // One degree of longitude on the equator is ~111.19 km.
        let d = haversine_distance(0.0, 0.0, 0.0, 1.0);
        assert!((d - 111_194.93).abs() < 1.0);
    }

    #[test]
    fn test_haversine_zero_for_identical_points() {
        let d = haversine_distance(31.23, 121.47, 31.23, 121.47);
        assert!(d.abs() < f64::EPSILON);
    }

    #[test]
    fn test_haversine_is_symmetric() {
        let a = haversine_distance(31.23, 121.47, 31.24, 121.48);
        let b = haversine_distance(31.24, 121.48, 31.23, 121.47);
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn test_haversine_small_displacement() {
        // ~5 meters of latitude: the displacement threshold scale the live
        // filter operates at.
        let d = haversine_distance(31.23, 121.47, 31.230045, 121.47);
        assert!(d > 4.5 && d < 5.5);
    }
}
