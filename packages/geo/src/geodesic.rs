//! Direct geodesic problem on a sphere.

use fuel_map_geo_models::GeoPoint;

use crate::EARTH_RADIUS_KM;

/// Returns the point reached by travelling `distance_km` from `origin` along
/// the great circle leaving it at `bearing_deg` (clockwise from north).
///
/// A zero distance yields the origin for any bearing. Inputs are not
/// validated; out-of-range degrees produce out-of-range output rather than
/// an error.
#[must_use]
pub fn project(origin: GeoPoint, distance_km: f64, bearing_deg: f64) -> GeoPoint {
    let bearing = bearing_deg.to_radians();
    let lat = origin.latitude.to_radians();
    let lng = origin.longitude.to_radians();
    let angular = distance_km / EARTH_RADIUS_KM;

    // Rounding can push the argument a hair past 1 near the poles.
    let sin_dest_lat = (lat.sin() * angular.cos() + lat.cos() * angular.sin() * bearing.cos())
        .clamp(-1.0, 1.0);
    let dest_lat = sin_dest_lat.asin();
    let dest_lng = lng
        + (bearing.sin() * angular.sin() * lat.cos())
            .atan2(angular.cos() - lat.sin() * sin_dest_lat);

    GeoPoint::new(dest_lat.to_degrees(), dest_lng.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    /// Kilometers per degree of arc on the model sphere.
    fn km_per_degree() -> f64 {
        std::f64::consts::PI * EARTH_RADIUS_KM / 180.0
    }

    fn great_circle_km(a: GeoPoint, b: GeoPoint) -> f64 {
        let (lat1, lat2) = (a.latitude.to_radians(), b.latitude.to_radians());
        let dlat = lat2 - lat1;
        let dlng = (b.longitude - a.longitude).to_radians();
        let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
    }

    #[test]
    fn zero_distance_returns_origin() {
        let origins = [
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(53.551, 9.993),
            GeoPoint::new(-33.86, 151.21),
            GeoPoint::new(89.9, -179.5),
            GeoPoint::new(-89.9, 179.5),
        ];
        for origin in origins {
            for bearing in [0.0, 45.0, 90.0, 135.0, 180.0, 270.0, 359.9, -90.0] {
                let dest = project(origin, 0.0, bearing);
                assert!(
                    (dest.latitude - origin.latitude).abs() < TOLERANCE,
                    "lat drift for {origin:?} at {bearing}: {dest:?}"
                );
                assert!(
                    (dest.longitude - origin.longitude).abs() < TOLERANCE,
                    "lng drift for {origin:?} at {bearing}: {dest:?}"
                );
            }
        }
    }

    #[test]
    fn due_north_moves_latitude_only() {
        let origin = GeoPoint::new(10.0, 20.0);
        let dest = project(origin, km_per_degree(), 0.0);
        assert!((dest.latitude - 11.0).abs() < 1e-6);
        assert!((dest.longitude - 20.0).abs() < 1e-9);
    }

    #[test]
    fn due_east_on_equator_moves_longitude_only() {
        let dest = project(GeoPoint::new(0.0, 0.0), km_per_degree(), 90.0);
        assert!(dest.latitude.abs() < 1e-9);
        assert!((dest.longitude - 1.0).abs() < 1e-6);
    }

    #[test]
    fn south_and_west_are_negative_moves() {
        let origin = GeoPoint::new(0.0, 0.0);
        let south = project(origin, km_per_degree(), 180.0);
        let west = project(origin, km_per_degree(), 270.0);
        assert!((south.latitude + 1.0).abs() < 1e-6);
        assert!((west.longitude + 1.0).abs() < 1e-6);
    }

    #[test]
    fn destination_lies_at_requested_distance() {
        let origin = GeoPoint::new(53.551, 9.993);
        for bearing in [0.0, 33.0, 90.0, 200.0, 315.0] {
            for distance in [0.5, 20.0, 250.0] {
                let dest = project(origin, distance, bearing);
                let measured = great_circle_km(origin, dest);
                assert!(
                    (measured - distance).abs() < 1e-6,
                    "bearing {bearing} distance {distance}: measured {measured}"
                );
            }
        }
    }

    #[test]
    fn polar_origin_never_produces_nan() {
        for lat in [90.0, -90.0, 89.999_999_999, -89.999_999_999] {
            for bearing in [0.0, 90.0, 180.0, 270.0] {
                for distance in [0.0, 1e-9, 1.0, 100.0] {
                    let dest = project(GeoPoint::new(lat, 10.0), distance, bearing);
                    assert!(dest.is_finite(), "{lat} {bearing} {distance}: {dest:?}");
                    assert!(dest.latitude.abs() <= 90.0);
                }
            }
        }
    }
}
