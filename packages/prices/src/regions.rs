//! Circle centers covering the fetch area.

use fuel_map_geo_models::GeoPoint;

/// Search radius around each center. Neighbouring circles overlap.
pub const REGION_RADIUS_KM: f64 = 25.0;

/// Sixteen centers covering Hamburg and Schleswig-Holstein, north-west to
/// south-east.
pub const HAMBURG_AND_SCHLESWIG_HOLSTEIN: [GeoPoint; 16] = [
    GeoPoint::new(54.824_158, 8.346_131),
    GeoPoint::new(54.715_297, 8.775_641),
    GeoPoint::new(54.661_861, 9.180_214),
    GeoPoint::new(54.677_340, 9.743_868),
    GeoPoint::new(54.298_884, 8.743_990),
    GeoPoint::new(54.308_298, 9.317_139),
    GeoPoint::new(54.306_721, 9.792_173),
    GeoPoint::new(54.280_894, 10.247_840),
    GeoPoint::new(54.333_907, 10.987_011),
    GeoPoint::new(54.019_711, 10.643_870),
    GeoPoint::new(53.889_138, 10.020_025),
    GeoPoint::new(53.913_517, 9.572_239),
    GeoPoint::new(53.928_135, 9.042_212),
    GeoPoint::new(53.648_308, 10.580_193),
    GeoPoint::new(53.473_590, 10.277_897),
    GeoPoint::new(53.522_599, 9.800_100),
];
