//! Streaming decoder for the postcode boundary feed.
//!
//! The feed is one gzip-compressed JSON array of `GeoJSON`-like features:
//!
//! ```json
//! [{"type": "Feature",
//!   "properties": {"plz": "20095", "note": "20095 Hamburg", "einwohner": 3079, "qkm": 1.86},
//!   "geometry": {"type": "Polygon", "coordinates": [[[9.99, 53.55], ...]]}}, ...]
//! ```
//!
//! Elements are pulled off the array one at a time, so the whole document
//! never has to sit in memory. An element that does not match the shape
//! above is logged and skipped. A broken JSON stream or gzip body ends
//! decoding at the break; everything decoded before it is kept.

use std::fmt;
use std::io::Read;

use flate2::read::GzDecoder;
use fuel_map_geo::centroid;
use fuel_map_geo_models::Polygon;
use fuel_map_postcode_models::PostcodeRecord;
use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::PostcodeError;
use crate::progress::ProgressCallback;

/// One element of the feed array.
#[derive(Debug, Clone, Deserialize)]
pub struct PostcodeFeature {
    /// Tabular attributes.
    pub properties: PostcodeProperties,
    /// Boundary geometry, `Polygon` or `MultiPolygon`.
    pub geometry: geojson::Geometry,
}

/// Attributes attached to each boundary.
#[derive(Debug, Clone, Deserialize)]
pub struct PostcodeProperties {
    /// Postcode, published as a numeric string.
    #[serde(rename = "plz", deserialize_with = "postcode_from_string_or_number")]
    pub postcode: i32,
    /// Display label.
    #[serde(rename = "note", default)]
    pub label: String,
    /// Resident count.
    #[serde(rename = "einwohner", default)]
    pub population: i32,
    /// Area in square kilometers.
    #[serde(rename = "qkm", default)]
    pub area_sq_km: f32,
}

impl PostcodeFeature {
    /// Flattens the geometry into a ring list.
    ///
    /// Every ring of a `MultiPolygon` ends up in the same list, matching how
    /// the centroid sums treat rings.
    ///
    /// # Errors
    ///
    /// Returns [`PostcodeError::Conversion`] for any other geometry type.
    pub fn polygon(&self) -> Result<Polygon, PostcodeError> {
        match &self.geometry.value {
            geojson::Value::Polygon(rings) => Ok(Polygon::from_lng_lat_rings(rings)),
            geojson::Value::MultiPolygon(polygons) => Ok(Polygon::new(
                polygons
                    .iter()
                    .flat_map(|rings| Polygon::from_lng_lat_rings(rings).rings)
                    .collect(),
            )),
            other => Err(PostcodeError::Conversion {
                message: format!(
                    "postcode {}: unsupported geometry type {}",
                    self.properties.postcode,
                    geometry_type(other)
                ),
            }),
        }
    }
}

/// Builds the stored record, computing the centroid from the boundary.
///
/// # Errors
///
/// Returns [`PostcodeError::Conversion`] if the geometry is not a polygon.
/// A zero-area boundary is not an error; the record simply has a
/// non-finite centroid.
pub fn record_from_feature(feature: PostcodeFeature) -> Result<PostcodeRecord, PostcodeError> {
    let polygon = feature.polygon()?;
    Ok(PostcodeRecord {
        label: feature.properties.label,
        postcode: feature.properties.postcode,
        population: feature.properties.population,
        area_sq_km: feature.properties.area_sq_km,
        centroid: centroid(&polygon),
    })
}

/// Counts from one decoding pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Elements turned into records.
    pub decoded: u64,
    /// Elements skipped as malformed.
    pub skipped: u64,
    /// `true` if the stream broke before the closing bracket.
    pub truncated: bool,
}

/// Decodes a gzip-compressed feed, handing each record to `on_record`.
pub fn decode_features<R: Read>(
    reader: R,
    progress: &dyn ProgressCallback,
    on_record: impl FnMut(PostcodeRecord),
) -> DecodeStats {
    decode(GzDecoder::new(reader), progress, on_record)
}

/// Decodes an uncompressed feed, handing each record to `on_record`.
pub fn decode<R: Read>(
    reader: R,
    progress: &dyn ProgressCallback,
    on_record: impl FnMut(PostcodeRecord),
) -> DecodeStats {
    let mut stats = DecodeStats::default();
    let visitor = FeatureVisitor {
        stats: &mut stats,
        progress,
        on_record,
    };

    let mut deserializer = serde_json::Deserializer::from_reader(reader);
    if let Err(e) = deserializer.deserialize_seq(visitor) {
        log::error!(
            "Postcode feed ended early after {} features: {e}",
            stats.decoded + stats.skipped
        );
        stats.truncated = true;
    }

    stats
}

/// Walks the top-level array, converting one element at a time.
struct FeatureVisitor<'a, F> {
    stats: &'a mut DecodeStats,
    progress: &'a dyn ProgressCallback,
    on_record: F,
}

impl<'de, F: FnMut(PostcodeRecord)> Visitor<'de> for FeatureVisitor<'_, F> {
    type Value = ();

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("an array of postcode features")
    }

    fn visit_seq<A: SeqAccess<'de>>(mut self, mut seq: A) -> Result<(), A::Error> {
        while let Some(value) = seq.next_element::<serde_json::Value>()? {
            let index = self.stats.decoded + self.stats.skipped;
            match feature_from_value(value) {
                Ok(record) => {
                    self.stats.decoded += 1;
                    (self.on_record)(record);
                }
                Err(e) => {
                    self.stats.skipped += 1;
                    log::warn!("Skipping postcode feature #{index}: {e}");
                }
            }
            self.progress.inc(1);
        }
        Ok(())
    }
}

const fn geometry_type(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn feature_from_value(value: serde_json::Value) -> Result<PostcodeRecord, PostcodeError> {
    record_from_feature(serde_json::from_value(value)?)
}

/// Accepts `"20095"` as well as `20095`.
fn postcode_from_string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<i32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPostcode {
        Number(i64),
        Text(String),
    }

    let raw = match RawPostcode::deserialize(deserializer)? {
        RawPostcode::Number(n) => n,
        RawPostcode::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|e| de::Error::custom(format!("invalid postcode {s:?}: {e}")))?,
    };
    i32::try_from(raw).map_err(|_| de::Error::custom(format!("postcode {raw} out of range")))
}
