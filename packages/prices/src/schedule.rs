//! Tick timing and the job driver loop.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};

use crate::job::ScheduledJob;

/// When a job runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Immediately, then after every interval.
    Every(Duration),
    /// Once a day at the given UTC wall clock time.
    DailyAt(NaiveTime),
}

impl Schedule {
    /// Time from `now` until the next tick.
    #[must_use]
    pub fn next_delay(&self, now: DateTime<Utc>) -> Duration {
        match self {
            Self::Every(interval) => *interval,
            Self::DailyAt(time) => {
                let today = now.date_naive().and_time(*time).and_utc();
                let next = if today > now {
                    today
                } else {
                    today + TimeDelta::days(1)
                };
                (next - now).to_std().unwrap_or(Duration::ZERO)
            }
        }
    }

    /// Whether the first tick fires as soon as the job is spawned.
    #[must_use]
    pub const fn runs_at_start(&self) -> bool {
        matches!(self, Self::Every(_))
    }
}

/// Runs `job` on `schedule` until `shutdown` turns `true` or its sender is
/// dropped.
///
/// Each tick runs in its own task, so a slow run does not delay the next
/// tick. Every run gets a copy of `shutdown` and is expected to stop at its
/// next await point once it fires; the returned handle resolves after all
/// runs have ended.
pub fn spawn_job(
    job: Arc<dyn ScheduledJob>,
    schedule: Schedule,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        log::info!("Scheduling job {} ({schedule:?})", job.name());
        let mut runs = JoinSet::new();

        if schedule.runs_at_start() {
            tick(&mut runs, &job, &shutdown);
        }

        loop {
            let delay = schedule.next_delay(Utc::now());
            tokio::select! {
                () = tokio::time::sleep(delay) => tick(&mut runs, &job, &shutdown),
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        if !runs.is_empty() {
            log::info!("Waiting for {} run(s) of job {}", runs.len(), job.name());
        }
        while let Some(result) = runs.join_next().await {
            if let Err(e) = result {
                log::error!("Run of job {} failed: {e}", job.name());
            }
        }

        log::info!("Job {} stopped", job.name());
    })
}

/// Resolves once `shutdown` turns `true` or its sender is dropped.
pub async fn shutdown_signalled(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|&stop| stop).await;
}

fn tick(runs: &mut JoinSet<()>, job: &Arc<dyn ScheduledJob>, shutdown: &watch::Receiver<bool>) {
    while runs.try_join_next().is_some() {}

    let job = Arc::clone(job);
    let shutdown = shutdown.clone();
    runs.spawn(async move {
        log::debug!("Running job {}", job.name());
        job.run(shutdown).await;
    });
}
