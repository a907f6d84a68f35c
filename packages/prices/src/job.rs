//! Jobs driven by the scheduler.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fuel_map_geo_models::GeoPoint;
use tokio::sync::watch;

use crate::PricesError;
use crate::config::PricesConfig;
use crate::credentials::CredentialPool;
use crate::fetch::PriceFetcher;
use crate::publish::Publisher;
use crate::regions::{HAMBURG_AND_SCHLESWIG_HOLSTEIN, REGION_RADIUS_KM};
use crate::schedule::shutdown_signalled;

/// A unit of work run on every scheduler tick.
///
/// Ticks may overlap if a run takes longer than the interval, so
/// implementations must tolerate concurrent calls.
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &str;

    /// Runs the job once. Failures are handled and logged inside.
    ///
    /// `shutdown` turns `true` when the scheduler stops; the run should
    /// return at its next await point after that.
    async fn run(&self, shutdown: watch::Receiver<bool>);
}

/// Outcome of one pass over all regions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionRunSummary {
    /// Requests sent.
    pub attempted: u64,
    /// Payloads handed to the publisher.
    pub published: u64,
    /// Requests that failed or timed out.
    pub failed: u64,
}

/// Fetches prices around every region center, one request at a time.
pub struct PriceRegionJob {
    fetcher: Arc<dyn PriceFetcher>,
    publisher: Arc<dyn Publisher>,
    pool: Arc<CredentialPool>,
    regions: Vec<GeoPoint>,
    radius_km: f64,
    request_delay: Duration,
    fetch_timeout: Duration,
}

impl PriceRegionJob {
    /// Creates a job over the Hamburg and Schleswig-Holstein centers.
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn PriceFetcher>,
        publisher: Arc<dyn Publisher>,
        pool: Arc<CredentialPool>,
        config: &PricesConfig,
    ) -> Self {
        Self {
            fetcher,
            publisher,
            pool,
            regions: HAMBURG_AND_SCHLESWIG_HOLSTEIN.to_vec(),
            radius_km: REGION_RADIUS_KM,
            request_delay: config.request_delay,
            fetch_timeout: config.fetch_timeout,
        }
    }

    /// Replaces the region centers.
    #[must_use]
    pub fn with_regions(mut self, regions: Vec<GeoPoint>) -> Self {
        self.regions = regions;
        self
    }

    /// Runs one pass over all regions.
    ///
    /// Each region waits for the request delay, then fetches with the
    /// current key under the fetch timeout. Every attempt is counted
    /// against the key pool, successful or not. A failed region is logged
    /// and the pass continues with the next one.
    ///
    /// Shutdown ends the pass during the delay or the fetch. A fetch cut
    /// short that way still counts as an attempt but neither as published
    /// nor as failed.
    pub async fn run_regions(&self, mut shutdown: watch::Receiver<bool>) -> RegionRunSummary {
        let mut summary = RegionRunSummary::default();

        for (index, center) in self.regions.iter().enumerate() {
            tokio::select! {
                () = tokio::time::sleep(self.request_delay) => {}
                () = shutdown_signalled(&mut shutdown) => {
                    log::info!("Price run stopped before region #{index}");
                    break;
                }
            }

            let api_key = self.pool.current_credential();
            let outcome = tokio::select! {
                result = self.fetch_one(*center, &api_key) => Some(result),
                () = shutdown_signalled(&mut shutdown) => None,
            };

            summary.attempted += 1;
            let requests = self.pool.record_request();
            log::debug!(
                "Request {requests}, API key index {}",
                self.pool.current_index()
            );

            match outcome {
                Some(Ok(payload)) => {
                    self.publisher.publish(payload);
                    summary.published += 1;
                }
                Some(Err(e)) => {
                    log::warn!("Price fetch for region #{index} at {center:?} failed: {e}");
                    summary.failed += 1;
                }
                None => {
                    log::info!("Price fetch for region #{index} cancelled by shutdown");
                    break;
                }
            }
        }

        summary
    }

    async fn fetch_one(&self, center: GeoPoint, api_key: &str) -> Result<String, PricesError> {
        tokio::time::timeout(
            self.fetch_timeout,
            self.fetcher.fetch(center, self.radius_km, api_key),
        )
        .await
        .map_err(|_| PricesError::Timeout(self.fetch_timeout))?
    }
}

#[async_trait]
impl ScheduledJob for PriceRegionJob {
    fn name(&self) -> &str {
        "prices"
    }

    async fn run(&self, shutdown: watch::Receiver<bool>) {
        let summary = self.run_regions(shutdown).await;
        log::info!(
            "Price run finished: {} published, {} failed",
            summary.published,
            summary.failed
        );
    }
}

/// Publishes sample price messages from disk, one per delay.
pub struct ReplayMessagesJob {
    publisher: Arc<dyn Publisher>,
    dir: PathBuf,
    files: Vec<String>,
    delay: Duration,
}

impl ReplayMessagesJob {
    /// Creates a job replaying `config.messages` from `config.messages_dir`.
    #[must_use]
    pub fn new(publisher: Arc<dyn Publisher>, config: &PricesConfig) -> Self {
        Self {
            publisher,
            dir: config.messages_dir.clone(),
            files: config.messages.clone(),
            delay: config.replay_delay,
        }
    }

    /// Publishes every readable message file and returns how many were
    /// sent. Unreadable files are logged and skipped. Shutdown ends the
    /// replay at the next delay.
    pub async fn replay(&self, mut shutdown: watch::Receiver<bool>) -> usize {
        let mut sent = 0;
        for file in &self.files {
            let path = self.dir.join(file);
            match read_message(&path).await {
                Ok(payload) => {
                    self.publisher.publish(payload);
                    sent += 1;
                }
                Err(e) => log::error!("Sample message {}: {e}", path.display()),
            }

            tokio::select! {
                () = tokio::time::sleep(self.delay) => {}
                () = shutdown_signalled(&mut shutdown) => break,
            }
        }
        sent
    }
}

#[async_trait]
impl ScheduledJob for ReplayMessagesJob {
    fn name(&self) -> &str {
        "replay"
    }

    async fn run(&self, shutdown: watch::Receiver<bool>) {
        let sent = self.replay(shutdown).await;
        log::debug!("Replayed {sent} of {} sample messages", self.files.len());
    }
}

async fn read_message(path: &Path) -> Result<String, PricesError> {
    Ok(tokio::fs::read_to_string(path).await?)
}
