//! Subcommand implementations.

use std::path::PathBuf;
use std::sync::Arc;

use fuel_map_database::{DuckDbPostcodeStore, DuckDbStationStore, SharedConnection};
use fuel_map_geo::compute_bounding_box;
use fuel_map_geo_models::GeoPoint;
use fuel_map_postcode::import::import_postcode_file;
use fuel_map_postcode::locations::find_locations;
use fuel_map_prices::config::PricesConfig;
use fuel_map_prices::credentials::CredentialPool;
use fuel_map_prices::fetch::HttpPriceFetcher;
use fuel_map_prices::job::{PriceRegionJob, ReplayMessagesJob, ScheduledJob};
use fuel_map_prices::publish::{LogPublisher, Publisher};
use fuel_map_prices::schedule::{Schedule, spawn_job};
use indicatif::MultiProgress;

use crate::SearchArea;

fn open_db(db_path: Option<PathBuf>) -> Result<SharedConnection, fuel_map_database::DbError> {
    db_path.map_or_else(fuel_map_database::open_default, |path| {
        fuel_map_database::open(&path)
    })
}

pub async fn import_postcodes(
    multi: &MultiProgress,
    db_path: Option<PathBuf>,
    file: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(DuckDbPostcodeStore::new(open_db(db_path)?));
    let progress = crate::progress::IndicatifProgress::features_spinner(multi, "Importing postcodes");

    let summary = import_postcode_file(store, file, progress).await?;

    println!(
        "Decoded {} postcodes ({} skipped, {} without centroid), wrote {}",
        summary.decoded, summary.skipped, summary.without_centroid, summary.written
    );
    Ok(())
}

pub async fn locations(
    db_path: Option<PathBuf>,
    fragment: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = DuckDbPostcodeStore::new(open_db(db_path)?);
    let found = find_locations(&store, fragment).await?;

    for record in &found {
        println!(
            "{:05}  {:<40} {:>9.5} {:>9.5}",
            record.postcode, record.label, record.centroid.latitude, record.centroid.longitude
        );
    }
    log::info!("{} locations match {fragment:?}", found.len());
    Ok(())
}

pub fn bbox(area: &SearchArea) -> Result<(), Box<dyn std::error::Error>> {
    let bbox = compute_bounding_box(GeoPoint::new(area.lat, area.lng), area.radius);
    println!("{}", serde_json::to_string_pretty(&bbox)?);
    Ok(())
}

pub async fn stations_near(
    db_path: Option<PathBuf>,
    area: &SearchArea,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = DuckDbStationStore::new(open_db(db_path)?);
    let stations =
        fuel_map_station::search_within(&store, GeoPoint::new(area.lat, area.lng), area.radius)
            .await?;

    println!("{}", serde_json::to_string_pretty(&stations)?);
    Ok(())
}

pub async fn schedule() -> Result<(), Box<dyn std::error::Error>> {
    let config = PricesConfig::from_env()?;
    let publisher: Arc<dyn Publisher> = Arc::new(LogPublisher);
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let mut handles = Vec::new();

    if config.api_keys.is_empty() {
        log::warn!("No APIKEY1..APIKEY3 set; price job disabled");
    } else {
        let pool = Arc::new(CredentialPool::new(
            config.api_keys.clone(),
            config.rotation_threshold,
        )?);
        let job: Arc<dyn ScheduledJob> = Arc::new(PriceRegionJob::new(
            Arc::new(HttpPriceFetcher::new(config.api_url.clone())),
            Arc::clone(&publisher),
            pool,
            &config,
        ));
        handles.push(spawn_job(
            job,
            Schedule::Every(config.interval),
            shutdown_rx.clone(),
        ));
    }

    if config.messages.is_empty() {
        log::info!("MSG_MESSAGES empty; sample replay disabled");
    } else {
        let job: Arc<dyn ScheduledJob> =
            Arc::new(ReplayMessagesJob::new(Arc::clone(&publisher), &config));
        handles.push(spawn_job(
            job,
            Schedule::Every(config.replay_interval),
            shutdown_rx.clone(),
        ));
    }

    if handles.is_empty() {
        log::warn!("Nothing to schedule");
        return Ok(());
    }

    tokio::signal::ctrl_c().await?;
    log::info!("Shutting down scheduled jobs");
    shutdown_tx.send(true)?;

    for handle in handles {
        handle.await?;
    }
    Ok(())
}
