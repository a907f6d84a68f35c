//! `postcodes` table.
//!
//! Non-finite centroids are stored as `NULL` and read back as NaN, so a
//! zero-area boundary survives a round trip without pretending to have a
//! position.

use std::sync::Arc;

use async_trait::async_trait;
use duckdb::{Connection, Row};
use fuel_map_geo_models::GeoPoint;
use fuel_map_postcode::PostcodeError;
use fuel_map_postcode::store::{PostcodeStore, PostcodeTransaction};
use fuel_map_postcode_models::PostcodeRecord;
use tokio::sync::OwnedMutexGuard;

use crate::{DbError, SharedConnection};

const SELECT_COLUMNS: &str =
    "SELECT label, postcode, population, area_sq_km, centroid_lat, centroid_lng FROM postcodes";

/// [`PostcodeStore`] backed by the `postcodes` table.
#[derive(Clone)]
pub struct DuckDbPostcodeStore {
    conn: SharedConnection,
}

impl DuckDbPostcodeStore {
    /// Wraps an open database.
    #[must_use]
    pub const fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl PostcodeStore for DuckDbPostcodeStore {
    async fn find_all(&self) -> Result<Vec<PostcodeRecord>, PostcodeError> {
        let conn = self.conn.lock().await;
        Ok(query_records(
            &conn,
            &format!("{SELECT_COLUMNS} ORDER BY postcode"),
            &[],
        )?)
    }

    async fn find_by_label(&self, fragment: &str) -> Result<Vec<PostcodeRecord>, PostcodeError> {
        let needle = fragment.to_lowercase();
        let conn = self.conn.lock().await;
        Ok(query_records(
            &conn,
            &format!("{SELECT_COLUMNS} WHERE contains(lower(label), ?) ORDER BY postcode"),
            &[&needle],
        )?)
    }

    async fn begin(&self) -> Result<Box<dyn PostcodeTransaction>, PostcodeError> {
        let guard = Arc::clone(&self.conn).lock_owned().await;
        guard
            .execute_batch("BEGIN TRANSACTION")
            .map_err(DbError::from)?;
        Ok(Box::new(DuckDbPostcodeTransaction {
            conn: guard,
            open: true,
        }))
    }
}

/// Holds the connection lock for the lifetime of one `DuckDB` transaction.
struct DuckDbPostcodeTransaction {
    conn: OwnedMutexGuard<Connection>,
    open: bool,
}

impl DuckDbPostcodeTransaction {
    fn finish(&mut self, statement: &str) -> Result<(), DbError> {
        let result = self.conn.execute_batch(statement);
        self.open = result.is_err();
        Ok(result?)
    }
}

#[async_trait]
impl PostcodeTransaction for DuckDbPostcodeTransaction {
    async fn find(&mut self, postcode: i32) -> Result<Option<PostcodeRecord>, PostcodeError> {
        let mut found = query_records(
            &self.conn,
            &format!("{SELECT_COLUMNS} WHERE postcode = ?"),
            &[&postcode],
        )?;
        Ok(found.pop())
    }

    async fn save(&mut self, record: &PostcodeRecord) -> Result<(), PostcodeError> {
        Ok(upsert(&self.conn, record)?)
    }

    async fn commit(self: Box<Self>) -> Result<(), PostcodeError> {
        let mut txn = self;
        Ok(txn.finish("COMMIT")?)
    }

    async fn rollback(self: Box<Self>) -> Result<(), PostcodeError> {
        let mut txn = self;
        Ok(txn.finish("ROLLBACK")?)
    }
}

impl Drop for DuckDbPostcodeTransaction {
    fn drop(&mut self) {
        if self.open
            && let Err(e) = self.conn.execute_batch("ROLLBACK")
        {
            log::warn!("Failed to roll back abandoned postcode transaction: {e}");
        }
    }
}

fn upsert(conn: &Connection, record: &PostcodeRecord) -> Result<(), DbError> {
    let (lat, lng) = if record.has_centroid() {
        (
            Some(record.centroid.latitude),
            Some(record.centroid.longitude),
        )
    } else {
        (None, None)
    };

    let updated = conn.execute(
        "UPDATE postcodes SET
            label = ?,
            population = ?,
            area_sq_km = ?,
            centroid_lat = ?,
            centroid_lng = ?
         WHERE postcode = ?",
        duckdb::params![
            record.label,
            record.population,
            record.area_sq_km,
            lat,
            lng,
            record.postcode,
        ],
    )?;

    if updated == 0 {
        conn.execute(
            "INSERT INTO postcodes
                (postcode, label, population, area_sq_km, centroid_lat, centroid_lng)
             VALUES (?, ?, ?, ?, ?, ?)",
            duckdb::params![
                record.postcode,
                record.label,
                record.population,
                record.area_sq_km,
                lat,
                lng,
            ],
        )?;
    }

    Ok(())
}

fn query_records(
    conn: &Connection,
    sql: &str,
    params: &[&dyn duckdb::ToSql],
) -> Result<Vec<PostcodeRecord>, DbError> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut records = Vec::new();

    while let Some(row) = rows.next()? {
        records.push(record_from_row(row)?);
    }

    Ok(records)
}

fn record_from_row(row: &Row<'_>) -> Result<PostcodeRecord, DbError> {
    let lat: Option<f64> = row.get(4)?;
    let lng: Option<f64> = row.get(5)?;

    Ok(PostcodeRecord {
        label: row.get(0)?,
        postcode: row.get(1)?,
        population: row.get(2)?,
        area_sq_km: row.get(3)?,
        centroid: GeoPoint::new(lat.unwrap_or(f64::NAN), lng.unwrap_or(f64::NAN)),
    })
}
