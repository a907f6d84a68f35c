#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Spherical geometry for station search and postcode import.
//!
//! Everything here is a pure function over [`fuel_map_geo_models`] types:
//! [`geodesic::project`] solves the direct geodesic problem,
//! [`bbox::compute_bounding_box`] turns a point and radius into a search
//! rectangle, and [`centroid::centroid`] computes shoelace areas and
//! centroids of postcode boundaries. None of it holds state, so it is safe
//! to call from any number of tasks at once.

pub mod bbox;
pub mod centroid;
pub mod geodesic;

pub use bbox::compute_bounding_box;
pub use centroid::{centroid, signed_area};
pub use geodesic::project;

/// Mean earth radius in kilometers used by every spherical calculation.
pub const EARTH_RADIUS_KM: f64 = 6371.0;
