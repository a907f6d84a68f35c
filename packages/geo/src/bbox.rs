//! Search rectangles around a point and radius.
//!
//! The rectangle spans the four cardinal projections of the origin. It is a
//! cheap pre-filter for a storage range query: it always contains the
//! origin, but it does not exactly bound the circle of `radius_km`, and the
//! corners lie farther away than the radius. No exact distance check runs
//! after the range query.
//!
//! A radius that reaches over a pole makes the poleward projection come
//! back down on the far side, so the rectangle is clamped to that pole and
//! widened to every longitude instead.

use std::f64::consts::FRAC_PI_2;

use fuel_map_geo_models::{BoundingBox, GeoPoint};

use crate::EARTH_RADIUS_KM;
use crate::geodesic::project;

/// Bearings of the four cardinal projections: north, east, south, west.
pub const CARDINAL_BEARINGS: [f64; 4] = [0.0, 90.0, 180.0, 270.0];

/// Builds the search rectangle for `radius_km` around `origin`.
#[must_use]
pub fn compute_bounding_box(origin: GeoPoint, radius_km: f64) -> BoundingBox {
    let mut bounds = CARDINAL_BEARINGS
        .iter()
        .map(|&bearing| project(origin, radius_km, bearing))
        .fold(MinMax::EMPTY, MinMax::include);

    let lat = origin.latitude.to_radians();
    let angular = radius_km / EARTH_RADIUS_KM;
    let over_north = lat + angular > FRAC_PI_2;
    let over_south = lat - angular < -FRAC_PI_2;

    if over_north {
        bounds.max_lat = 90.0;
    }
    if over_south {
        bounds.min_lat = -90.0;
    }
    if over_north || over_south {
        bounds.min_lng = -180.0;
        bounds.max_lng = 180.0;
    }

    bounds.into_bounding_box()
}

/// Running min/max accumulator, seeded so the first point always wins.
#[derive(Debug, Clone, Copy)]
struct MinMax {
    min_lat: f64,
    max_lat: f64,
    min_lng: f64,
    max_lng: f64,
}

impl MinMax {
    const EMPTY: Self = Self {
        min_lat: f64::INFINITY,
        max_lat: f64::NEG_INFINITY,
        min_lng: f64::INFINITY,
        max_lng: f64::NEG_INFINITY,
    };

    fn include(self, point: GeoPoint) -> Self {
        Self {
            min_lat: self.min_lat.min(point.latitude),
            max_lat: self.max_lat.max(point.latitude),
            min_lng: self.min_lng.min(point.longitude),
            max_lng: self.max_lng.max(point.longitude),
        }
    }

    const fn into_bounding_box(self) -> BoundingBox {
        BoundingBox {
            min_lat: self.min_lat,
            max_lat: self.max_lat,
            min_lng: self.min_lng,
            max_lng: self.max_lng,
        }
    }
}
