//! `stations` table.

use async_trait::async_trait;
use duckdb::Connection;
use fuel_map_geo_models::{BoundingBox, GeoPoint};
use fuel_map_station::{GasStation, StationError, StationStore};

use crate::{DbError, SharedConnection};

/// [`StationStore`] backed by the `stations` table.
#[derive(Clone)]
pub struct DuckDbStationStore {
    conn: SharedConnection,
}

impl DuckDbStationStore {
    /// Wraps an open database.
    #[must_use]
    pub const fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl StationStore for DuckDbStationStore {
    async fn find_in_bounding_box(
        &self,
        bbox: &BoundingBox,
        limit: usize,
    ) -> Result<Vec<GasStation>, StationError> {
        let conn = self.conn.lock().await;
        Ok(select_in_box(&conn, bbox, limit)?)
    }

    async fn save_all(&self, stations: &[GasStation]) -> Result<(), StationError> {
        let mut conn = self.conn.lock().await;
        Ok(insert_stations(&mut conn, stations)?)
    }
}

fn select_in_box(
    conn: &Connection,
    bbox: &BoundingBox,
    limit: usize,
) -> Result<Vec<GasStation>, DbError> {
    let limit = i64::try_from(limit).map_err(|e| DbError::Conversion {
        message: format!("station limit {limit}: {e}"),
    })?;

    let mut stmt = conn.prepare(
        "SELECT id, name, brand, street, post_code, place, lat, lng
         FROM stations
         WHERE lat >= ? AND lat <= ? AND lng >= ? AND lng <= ?
         ORDER BY id
         LIMIT ?",
    )?;
    let mut rows = stmt.query(duckdb::params![
        bbox.min_lat,
        bbox.max_lat,
        bbox.min_lng,
        bbox.max_lng,
        limit,
    ])?;

    let mut stations = Vec::new();
    while let Some(row) = rows.next()? {
        stations.push(GasStation {
            id: row.get(0)?,
            name: row.get(1)?,
            brand: row.get(2)?,
            street: row.get(3)?,
            post_code: row.get(4)?,
            place: row.get(5)?,
            location: GeoPoint::new(row.get(6)?, row.get(7)?),
        });
    }

    Ok(stations)
}

fn insert_stations(conn: &mut Connection, stations: &[GasStation]) -> Result<(), DbError> {
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO stations (id, name, brand, street, post_code, place, lat, lng)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                brand = EXCLUDED.brand,
                street = EXCLUDED.street,
                post_code = EXCLUDED.post_code,
                place = EXCLUDED.place,
                lat = EXCLUDED.lat,
                lng = EXCLUDED.lng",
        )?;

        for station in stations {
            stmt.execute(duckdb::params![
                station.id,
                station.name,
                station.brand,
                station.street,
                station.post_code,
                station.place,
                station.location.latitude,
                station.location.longitude,
            ])?;
        }
    }
    tx.commit()?;

    log::debug!("Saved {} stations", stations.len());
    Ok(())
}
