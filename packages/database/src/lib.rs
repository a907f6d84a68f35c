#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `DuckDB` storage for the fuel map.
//!
//! One database file holds the `postcodes` and `stations` tables. Each store
//! wraps the shared [`Connection`] in an async mutex; postcode transactions
//! hold that mutex from `BEGIN TRANSACTION` until `COMMIT` or `ROLLBACK`, so
//! at most one write batch is in flight per database.

pub mod paths;
pub mod postcodes;
pub mod stations;

use std::path::Path;
use std::sync::Arc;

use duckdb::Connection;
use fuel_map_postcode::PostcodeError;
use fuel_map_station::StationError;
use tokio::sync::Mutex;

pub use postcodes::DuckDbPostcodeStore;
pub use stations::DuckDbStationStore;

/// A connection shared by every store opened on the same database.
pub type SharedConnection = Arc<Mutex<Connection>>;

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// `DuckDB` error.
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    /// I/O error (creating the data directory).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

impl From<DbError> for PostcodeError {
    fn from(e: DbError) -> Self {
        Self::Storage {
            message: e.to_string(),
        }
    }
}

impl From<DbError> for StationError {
    fn from(e: DbError) -> Self {
        Self::Storage {
            message: e.to_string(),
        }
    }
}

/// Opens (or creates) the database file and ensures the schema exists.
///
/// # Errors
///
/// Returns [`DbError`] if the directory, connection, or schema creation
/// fails.
pub fn open(path: &Path) -> Result<SharedConnection, DbError> {
    if let Some(parent) = path.parent() {
        paths::ensure_dir(parent)?;
    }

    log::debug!("Opening {}", path.display());
    let conn = Connection::open(path)?;
    create_schema(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// Opens the database at [`paths::database_path`].
///
/// # Errors
///
/// Returns [`DbError`] if the directory, connection, or schema creation
/// fails.
pub fn open_default() -> Result<SharedConnection, DbError> {
    open(&paths::database_path())
}

/// Opens a throwaway in-memory database with the schema applied.
///
/// # Errors
///
/// Returns [`DbError`] if the connection or schema creation fails.
pub fn open_in_memory() -> Result<SharedConnection, DbError> {
    let conn = Connection::open_in_memory()?;
    create_schema(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

fn create_schema(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS postcodes (
            postcode INTEGER NOT NULL PRIMARY KEY,
            label TEXT NOT NULL,
            population INTEGER NOT NULL,
            area_sq_km REAL NOT NULL,
            centroid_lat DOUBLE,
            centroid_lng DOUBLE
        );

        CREATE TABLE IF NOT EXISTS stations (
            id TEXT NOT NULL PRIMARY KEY,
            name TEXT NOT NULL,
            brand TEXT NOT NULL,
            street TEXT NOT NULL,
            post_code TEXT NOT NULL,
            place TEXT NOT NULL,
            lat DOUBLE NOT NULL,
            lng DOUBLE NOT NULL
        );",
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn schema_creation_is_repeatable() {
        let conn = open_in_memory().unwrap();
        let guard = conn.lock().await;
        create_schema(&guard).unwrap();

        let tables: i64 = guard
            .prepare(
                "SELECT COUNT(*) FROM information_schema.tables \
                 WHERE table_name IN ('postcodes', 'stations')",
            )
            .unwrap()
            .query_row([], |row| row.get(0))
            .unwrap();
        assert_eq!(tables, 2);
    }

    #[test]
    fn storage_errors_keep_their_message() {
        let e = DbError::Conversion {
            message: "bad row".to_string(),
        };
        let PostcodeError::Storage { message } = PostcodeError::from(e) else {
            panic!("expected a storage error");
        };
        assert!(message.contains("bad row"));
    }
}
