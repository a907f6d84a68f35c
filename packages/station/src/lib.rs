#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Gas stations and the "stations near me" search.
//!
//! A location search turns an origin and radius into a latitude/longitude
//! rectangle (see [`fuel_map_geo::compute_bounding_box`]) and asks the
//! [`StationStore`] for stations inside it. The rectangle is the whole
//! filter: stations in its corners, farther away than the radius, are
//! returned too.

use std::sync::Arc;

use async_trait::async_trait;
use fuel_map_geo::compute_bounding_box;
use fuel_map_geo_models::{BoundingBox, GeoPoint};
use geo::Intersects;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Radius used by the location search, in kilometers.
pub const SEARCH_RADIUS_KM: f64 = 20.0;

/// Maximum number of stations a location search returns.
pub const SEARCH_LIMIT: usize = 200;

/// Errors from station storage.
#[derive(Debug, thiserror::Error)]
pub enum StationError {
    /// The storage backend rejected an operation.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of what went wrong.
        message: String,
    },
}

/// A fuel station with its position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasStation {
    /// Identifier assigned by the price provider.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Brand, empty for independents.
    pub brand: String,
    /// Street and house number.
    pub street: String,
    /// Postcode as printed on the address.
    pub post_code: String,
    /// Town.
    pub place: String,
    /// Position of the forecourt.
    pub location: GeoPoint,
}

/// Read and write access to stored stations.
#[async_trait]
pub trait StationStore: Send + Sync {
    /// Returns up to `limit` stations inside `bbox`, edges included.
    ///
    /// # Errors
    ///
    /// Returns [`StationError::Storage`] if the backend query fails.
    async fn find_in_bounding_box(
        &self,
        bbox: &BoundingBox,
        limit: usize,
    ) -> Result<Vec<GasStation>, StationError>;

    /// Inserts or replaces stations by id.
    ///
    /// # Errors
    ///
    /// Returns [`StationError::Storage`] if the write fails.
    async fn save_all(&self, stations: &[GasStation]) -> Result<(), StationError>;
}

/// Stations within [`SEARCH_RADIUS_KM`] of `origin`, approximated by the
/// bounding rectangle, capped at [`SEARCH_LIMIT`].
///
/// # Errors
///
/// Returns [`StationError::Storage`] if the store query fails.
pub async fn search_by_location(
    store: &dyn StationStore,
    origin: GeoPoint,
) -> Result<Vec<GasStation>, StationError> {
    search_within(store, origin, SEARCH_RADIUS_KM).await
}

/// Like [`search_by_location`] with an explicit radius.
///
/// # Errors
///
/// Returns [`StationError::Storage`] if the store query fails.
pub async fn search_within(
    store: &dyn StationStore,
    origin: GeoPoint,
    radius_km: f64,
) -> Result<Vec<GasStation>, StationError> {
    let bbox = compute_bounding_box(origin, radius_km);
    log::debug!("Station search around {origin:?} ({radius_km} km): {bbox:?}");
    store.find_in_bounding_box(&bbox, SEARCH_LIMIT).await
}

/// Station table held in process memory. Clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct MemoryStationStore {
    stations: Arc<RwLock<Vec<GasStation>>>,
}

impl MemoryStationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StationStore for MemoryStationStore {
    async fn find_in_bounding_box(
        &self,
        bbox: &BoundingBox,
        limit: usize,
    ) -> Result<Vec<GasStation>, StationError> {
        let rect = geo::Rect::from(*bbox);
        Ok(self
            .stations
            .read()
            .await
            .iter()
            .filter(|s| rect.intersects(&geo::Point::from(s.location)))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn save_all(&self, stations: &[GasStation]) -> Result<(), StationError> {
        let mut table = self.stations.write().await;
        for station in stations {
            match table.iter_mut().find(|s| s.id == station.id) {
                Some(existing) => existing.clone_from(station),
                None => table.push(station.clone()),
            }
        }
        drop(table);
        Ok(())
    }
}
