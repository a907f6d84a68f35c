//! Shoelace area and centroid of postcode boundaries.
//!
//! Coordinates are treated as planar with longitude as `x` and latitude as
//! `y`. Every ring contributes to the same sums regardless of orientation,
//! so a hole drawn in the same direction as its exterior adds area instead
//! of removing it. Rings are not closed automatically: only consecutive
//! vertex pairs are summed, so the last vertex pairs with the first only if
//! the input repeats it.
//!
//! A polygon whose signed area is zero (a single repeated point, a line, or
//! rings that cancel out) has no centroid; [`centroid`] then returns NaN or
//! infinite coordinates, which callers detect with
//! [`GeoPoint::is_finite`].

use fuel_map_geo_models::{GeoPoint, Polygon};

/// Signed shoelace area in square degrees. Counter-clockwise rings are
/// positive.
#[must_use]
pub fn signed_area(polygon: &Polygon) -> f64 {
    edges(polygon).map(|(a, b)| cross(a, b)).sum::<f64>() / 2.0
}

/// Area-weighted centroid of all rings combined.
#[must_use]
pub fn centroid(polygon: &Polygon) -> GeoPoint {
    let area = signed_area(polygon);

    let (sum_x, sum_y) = edges(polygon).fold((0.0, 0.0), |(sum_x, sum_y), (a, b)| {
        let cross = cross(a, b);
        (
            sum_x + (a.longitude + b.longitude) * cross,
            sum_y + (a.latitude + b.latitude) * cross,
        )
    });

    GeoPoint::new(sum_y / (6.0 * area), sum_x / (6.0 * area))
}

/// Consecutive vertex pairs of every ring, in order.
fn edges(polygon: &Polygon) -> impl Iterator<Item = (&GeoPoint, &GeoPoint)> {
    polygon
        .rings
        .iter()
        .flat_map(|ring| ring.windows(2).map(|pair| (&pair[0], &pair[1])))
}

/// `x_i * y_{i+1} - x_{i+1} * y_i`
fn cross(a: &GeoPoint, b: &GeoPoint) -> f64 {
    a.longitude * b.latitude - b.longitude * a.latitude
}
