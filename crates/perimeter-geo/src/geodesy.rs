//! Spherical-earth distance, bearing and offset math.
//!
//! All functions are pure. Angles are degrees, distances meters.

use perimeter_core::constants::EARTH_RADIUS_M;
use perimeter_core::types::{normalize_heading, normalize_longitude, GeoPoint};

/// Great-circle distance between two points (haversine formula).
pub fn haversine_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// Initial bearing from `a` toward `b`, in [0, 360).
pub fn bearing_between(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
    normalize_heading(y.atan2(x).to_degrees())
}

/// Point reached by travelling `distance_m` from `origin` on initial bearing
/// `bearing_deg` along a great circle.
pub fn destination_point(origin: GeoPoint, distance_m: f64, bearing_deg: f64) -> GeoPoint {
    if distance_m == 0.0 {
        return origin;
    }

    let angular = distance_m / EARTH_RADIUS_M;
    let bearing = bearing_deg.to_radians();
    let lat1 = origin.lat.to_radians();
    let lon1 = origin.lon.to_radians();

    let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
    let lon2 = lon1
        + (bearing.sin() * angular.sin() * lat1.cos())
            .atan2(angular.cos() - lat1.sin() * lat2.sin());

    GeoPoint {
        lat: lat2.to_degrees(),
        lon: normalize_longitude(lon2.to_degrees()),
    }
}

/// 8-point compass text for a heading: N, NE, E, SE, S, SW, W, NW.
pub fn heading_to_text(heading_deg: f64) -> &'static str {
    const POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    let index = (normalize_heading(heading_deg) / 45.0).round() as usize % POINTS.len();
    POINTS[index]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn base() -> GeoPoint {
        GeoPoint::new(14.2059, 101.2134)
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        assert_eq!(haversine_distance(base(), base()), 0.0);
    }

    #[test]
    fn test_known_fixture_distance() {
        // Base to the alpha seed position, just under a kilometer.
        let d = haversine_distance(base(), GeoPoint::new(14.2132, 101.2188));
        assert!((d - 998.86).abs() < 0.5, "fixture distance was {d}");
    }

    #[test]
    fn test_distance_symmetric() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..500 {
            let a = GeoPoint::new(rng.gen_range(-70.0..70.0), rng.gen_range(-179.0..179.0));
            let b = GeoPoint::new(rng.gen_range(-70.0..70.0), rng.gen_range(-179.0..179.0));
            let ab = haversine_distance(a, b);
            let ba = haversine_distance(b, a);
            assert!((ab - ba).abs() < 1e-6, "{ab} vs {ba}");
            assert!(ab >= 0.0);
        }
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        let o = GeoPoint::new(0.0, 0.0);
        assert!(bearing_between(o, GeoPoint::new(1.0, 0.0)).abs() < 1e-9);
        assert!((bearing_between(o, GeoPoint::new(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((bearing_between(o, GeoPoint::new(-1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((bearing_between(o, GeoPoint::new(0.0, -1.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_bearing_always_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..1000 {
            let a = GeoPoint::new(rng.gen_range(-80.0..80.0), rng.gen_range(-180.0..180.0));
            let b = GeoPoint::new(rng.gen_range(-80.0..80.0), rng.gen_range(-180.0..180.0));
            let brg = bearing_between(a, b);
            assert!((0.0..360.0).contains(&brg), "bearing {brg}");
        }
        // Identical points still yield a value in range.
        assert!((0.0..360.0).contains(&bearing_between(base(), base())));
    }

    #[test]
    fn test_destination_distance_consistency() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..2000 {
            let origin = GeoPoint::new(rng.gen_range(-75.0..75.0), rng.gen_range(-180.0..180.0));
            let d = rng.gen_range(0.0..5_000.0);
            let b = rng.gen_range(0.0..360.0);
            let dest = destination_point(origin, d, b);
            let back = haversine_distance(origin, dest);
            assert!((back - d).abs() < 1e-3, "d={d} back={back} b={b}");
        }
    }

    #[test]
    fn test_destination_follows_bearing() {
        let dest = destination_point(base(), 1_000.0, 90.0);
        let brg = bearing_between(base(), dest);
        assert!((brg - 90.0).abs() < 0.01, "bearing {brg}");
        assert!(dest.lon > base().lon);
    }

    #[test]
    fn test_destination_wraps_longitude() {
        let near_dateline = GeoPoint::new(0.0, 179.999);
        let dest = destination_point(near_dateline, 1_000.0, 90.0);
        assert!(dest.lon < -179.0 && dest.lon > -180.0, "{}", dest.lon);
    }

    #[test]
    fn test_heading_text() {
        assert_eq!(heading_to_text(0.0), "N");
        assert_eq!(heading_to_text(35.0), "NE");
        assert_eq!(heading_to_text(90.0), "E");
        assert_eq!(heading_to_text(200.0), "S");
        assert_eq!(heading_to_text(350.0), "N");
        assert_eq!(heading_to_text(-45.0), "NW");
    }
}
