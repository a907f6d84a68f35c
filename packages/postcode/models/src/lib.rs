#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Postcode record and import summary types.

use fuel_map_geo_models::GeoPoint;
use serde::{Deserialize, Serialize};

/// A postcode area as stored by the location lookup.
///
/// Identity is the numeric [`postcode`](Self::postcode); re-importing a
/// postcode overwrites every other field in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostcodeRecord {
    /// Display label, usually "<postcode> <town>".
    pub label: String,
    /// Numeric postcode, unique per record.
    pub postcode: i32,
    /// Resident count.
    pub population: i32,
    /// Area in square kilometers as published by the source.
    pub area_sq_km: f32,
    /// Shoelace centroid of the boundary. Non-finite when the boundary had
    /// zero area.
    pub centroid: GeoPoint,
}

impl PostcodeRecord {
    /// Returns `true` if the centroid is usable for display or search.
    #[must_use]
    pub const fn has_centroid(&self) -> bool {
        self.centroid.is_finite()
    }

    /// Copies every non-key field from `other`, keeping this record's
    /// postcode.
    pub fn overwrite_from(&mut self, other: &Self) {
        self.label.clone_from(&other.label);
        self.population = other.population;
        self.area_sq_km = other.area_sq_km;
        self.centroid = other.centroid;
    }
}

/// Outcome of one postcode file import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    /// Features decoded into records.
    pub decoded: u64,
    /// Features skipped because they could not be decoded.
    pub skipped: u64,
    /// Records written by the reconciliation batch. Zero if the batch was
    /// rolled back.
    pub written: u64,
    /// Decoded records whose boundary produced no finite centroid.
    pub without_centroid: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(postcode: i32, label: &str) -> PostcodeRecord {
        PostcodeRecord {
            label: label.to_string(),
            postcode,
            population: 100,
            area_sq_km: 1.5,
            centroid: GeoPoint::new(53.5, 10.0),
        }
    }

    #[test]
    fn overwrite_keeps_postcode() {
        let mut existing = record(20095, "20095 Hamburg");
        let mut incoming = record(20099, "20095 Hamburg Altstadt");
        incoming.population = 3_000;
        incoming.centroid = GeoPoint::new(53.55, 10.0);

        existing.overwrite_from(&incoming);

        assert_eq!(existing.postcode, 20095);
        assert_eq!(existing.label, "20095 Hamburg Altstadt");
        assert_eq!(existing.population, 3_000);
        assert_eq!(existing.centroid, GeoPoint::new(53.55, 10.0));
    }

    #[test]
    fn nan_centroid_is_unavailable() {
        let mut rec = record(1067, "01067 Dresden");
        assert!(rec.has_centroid());
        rec.centroid = GeoPoint::new(f64::NAN, f64::NAN);
        assert!(!rec.has_centroid());
    }
}
