#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Coordinate, rectangle, and polygon types shared by the search and import
//! pipelines.
//!
//! Coordinates are plain degrees on a spherical earth. Longitude maps to the
//! `x` axis and latitude to the `y` axis whenever a type is converted into
//! its [`geo`] counterpart.

use serde::{Deserialize, Serialize};

/// A position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    /// Latitude in degrees, `[-90, 90]`.
    pub latitude: f64,
    /// Longitude in degrees, `[-180, 180]`.
    pub longitude: f64,
}

impl GeoPoint {
    /// Creates a point from latitude and longitude in degrees.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns `true` if both coordinates are finite numbers.
    ///
    /// Centroids of zero-area polygons come out as NaN or infinity, so
    /// anything that displays or searches by a stored point should check
    /// this first.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

impl From<GeoPoint> for geo::Point<f64> {
    fn from(point: GeoPoint) -> Self {
        Self::new(point.longitude, point.latitude)
    }
}

impl From<geo::Point<f64>> for GeoPoint {
    fn from(point: geo::Point<f64>) -> Self {
        Self::new(point.y(), point.x())
    }
}

/// An axis-aligned latitude/longitude rectangle.
///
/// Built fresh for each search and handed to storage as a range predicate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    /// Southern edge.
    pub min_lat: f64,
    /// Northern edge.
    pub max_lat: f64,
    /// Western edge.
    pub min_lng: f64,
    /// Eastern edge.
    pub max_lng: f64,
}

impl BoundingBox {
    /// Returns `true` if the point lies inside the rectangle or on its edge.
    #[must_use]
    pub fn contains(&self, point: &GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.latitude)
            && (self.min_lng..=self.max_lng).contains(&point.longitude)
    }

    /// Height of the rectangle in degrees of latitude.
    #[must_use]
    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Width of the rectangle in degrees of longitude.
    #[must_use]
    pub fn lng_span(&self) -> f64 {
        self.max_lng - self.min_lng
    }
}

impl From<BoundingBox> for geo::Rect<f64> {
    fn from(bbox: BoundingBox) -> Self {
        Self::new(
            geo::coord! { x: bbox.min_lng, y: bbox.min_lat },
            geo::coord! { x: bbox.max_lng, y: bbox.max_lat },
        )
    }
}

/// A closed loop of points. The first point is expected to be repeated as
/// the last one; nothing here enforces it.
pub type Ring = Vec<GeoPoint>;

/// A polygon as an ordered list of rings.
///
/// Rings carry no exterior/hole role: every ring contributes to area and
/// centroid sums the same way.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    /// Rings in source order.
    pub rings: Vec<Ring>,
}

impl Polygon {
    /// Creates a polygon from its rings.
    #[must_use]
    pub const fn new(rings: Vec<Ring>) -> Self {
        Self { rings }
    }

    /// Builds a polygon from `[longitude, latitude]` positions, the
    /// `GeoJSON` coordinate order.
    ///
    /// Positions with fewer than two components are dropped.
    #[must_use]
    pub fn from_lng_lat_rings(rings: &[Vec<Vec<f64>>]) -> Self {
        Self {
            rings: rings
                .iter()
                .map(|ring| {
                    ring.iter()
                        .filter_map(|position| match position.as_slice() {
                            [lng, lat, ..] => Some(GeoPoint::new(*lat, *lng)),
                            _ => None,
                        })
                        .collect()
                })
                .collect(),
        }
    }

    /// Total number of vertices across all rings.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.rings.iter().map(Vec::len).sum()
    }

    /// Returns `true` if the polygon has no vertices at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rings.iter().all(Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_converts_to_geo_with_lng_as_x() {
        let point: geo::Point<f64> = GeoPoint::new(53.55, 9.99).into();
        assert!((point.x() - 9.99).abs() < f64::EPSILON);
        assert!((point.y() - 53.55).abs() < f64::EPSILON);
        assert_eq!(GeoPoint::from(point), GeoPoint::new(53.55, 9.99));
    }

    #[test]
    fn nan_point_is_not_finite() {
        assert!(GeoPoint::new(1.0, 2.0).is_finite());
        assert!(!GeoPoint::new(f64::NAN, 2.0).is_finite());
        assert!(!GeoPoint::new(1.0, f64::INFINITY).is_finite());
    }

    #[test]
    fn bbox_contains_edges() {
        let bbox = BoundingBox {
            min_lat: 50.0,
            max_lat: 51.0,
            min_lng: 8.0,
            max_lng: 9.0,
        };
        assert!(bbox.contains(&GeoPoint::new(50.5, 8.5)));
        assert!(bbox.contains(&GeoPoint::new(50.0, 9.0)));
        assert!(!bbox.contains(&GeoPoint::new(51.1, 8.5)));
        assert!(!bbox.contains(&GeoPoint::new(50.5, 7.9)));
        assert!((bbox.lat_span() - 1.0).abs() < f64::EPSILON);
        assert!((bbox.lng_span() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bbox_converts_to_rect() {
        let rect: geo::Rect<f64> = BoundingBox {
            min_lat: -1.0,
            max_lat: 2.0,
            min_lng: -3.0,
            max_lng: 4.0,
        }
        .into();
        assert_eq!(rect.min(), geo::coord! { x: -3.0, y: -1.0 });
        assert_eq!(rect.max(), geo::coord! { x: 4.0, y: 2.0 });
    }

    #[test]
    fn lng_lat_rings_swap_axis_order() {
        let polygon = Polygon::from_lng_lat_rings(&[vec![
            vec![9.0, 53.0],
            vec![10.0, 54.0, 12.5],
            vec![11.0],
        ]]);
        assert_eq!(polygon.rings.len(), 1);
        assert_eq!(
            polygon.rings[0],
            vec![GeoPoint::new(53.0, 9.0), GeoPoint::new(54.0, 10.0)]
        );
        assert_eq!(polygon.vertex_count(), 2);
        assert!(!polygon.is_empty());
        assert!(Polygon::default().is_empty());
    }

    #[test]
    fn point_serializes_camel_case() {
        let json = serde_json::to_value(GeoPoint::new(1.5, 2.5)).unwrap();
        assert_eq!(json["latitude"], 1.5);
        assert_eq!(json["longitude"], 2.5);
    }
}
