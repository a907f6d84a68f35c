//! Location of the `DuckDB` data file.

use std::path::{Path, PathBuf};

/// Environment variable overriding the database file location.
pub const DATABASE_PATH_VAR: &str = "FUEL_MAP_DB";

/// Path used when [`DATABASE_PATH_VAR`] is unset.
pub const DEFAULT_DATABASE_PATH: &str = "data/fuel_map.duckdb";

/// Returns the database file path, relative to the working directory unless
/// `FUEL_MAP_DB` says otherwise.
#[must_use]
pub fn database_path() -> PathBuf {
    std::env::var(DATABASE_PATH_VAR)
        .map_or_else(|_| PathBuf::from(DEFAULT_DATABASE_PATH), PathBuf::from)
}

/// Ensures a directory exists, creating it if necessary.
///
/// An empty path (a bare file name's parent) is treated as the current
/// directory.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.as_os_str().is_empty() && !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
