#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the fuel map backend.
//!
//! Imports the postcode boundary feed into `DuckDB`, answers location and
//! station-near-me lookups against it, and runs the scheduled price jobs
//! until interrupted.

mod commands;
mod progress;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Fuel map backend tools.
#[derive(Parser)]
#[command(name = "fuel_map")]
#[command(about = "Postcode import, location search, and price scheduling")]
struct Cli {
    /// `DuckDB` file (default: `$FUEL_MAP_DB` or `data/fuel_map.duckdb`).
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Import a gzip-compressed postcode boundary feed.
    ImportPostcodes {
        /// File name, resolved against `$PLZ_IMPORT_PATH`.
        file: String,
    },

    /// Find postcode areas by label.
    Locations {
        /// Case-insensitive label fragment.
        fragment: String,
    },

    /// Print the search rectangle around a point.
    Bbox {
        #[command(flatten)]
        area: SearchArea,
    },

    /// List stored stations inside the search rectangle around a point.
    StationsNear {
        #[command(flatten)]
        area: SearchArea,
    },

    /// Run the price and sample-message jobs until Ctrl-C.
    Schedule,
}

/// Origin and radius of a rectangle search.
#[derive(clap::Args)]
struct SearchArea {
    /// Latitude in degrees.
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,

    /// Longitude in degrees.
    #[arg(long, allow_hyphen_values = true)]
    lng: f64,

    /// Radius in kilometers.
    #[arg(long, default_value_t = fuel_map_station::SEARCH_RADIUS_KM)]
    radius: f64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = progress::init_logger();
    let cli = Cli::parse();

    match cli.command {
        Commands::ImportPostcodes { file } => {
            commands::import_postcodes(&multi, cli.db_path, &file).await?;
        }
        Commands::Locations { fragment } => commands::locations(cli.db_path, &fragment).await?,
        Commands::Bbox { area } => commands::bbox(&area)?,
        Commands::StationsNear { area } => commands::stations_near(cli.db_path, &area).await?,
        Commands::Schedule => commands::schedule().await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_negative_coordinates_and_default_radius() {
        let cli = Cli::parse_from(["fuel_map", "bbox", "--lat", "-33.86", "--lng", "151.21"]);
        let Commands::Bbox { area } = cli.command else {
            panic!("expected bbox");
        };
        assert!((area.lat + 33.86).abs() < 1e-12);
        assert!((area.radius - 20.0).abs() < 1e-12);
    }

    #[test]
    fn subcommands_are_kebab_case() {
        let cli = Cli::parse_from(["fuel_map", "import-postcodes", "plz.geojson.gz"]);
        assert!(
            matches!(cli.command, Commands::ImportPostcodes { file } if file == "plz.geojson.gz")
        );

        let cli = Cli::parse_from([
            "fuel_map",
            "--db-path",
            "/tmp/x.duckdb",
            "stations-near",
            "--lat",
            "53.5",
            "--lng",
            "10",
        ]);
        assert_eq!(cli.db_path, Some(PathBuf::from("/tmp/x.duckdb")));
        assert!(matches!(cli.command, Commands::StationsNear { .. }));
    }
}
