//! Postcode file import: decode, derive centroids, reconcile.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fuel_map_postcode_models::{ImportSummary, PostcodeRecord};

use crate::PostcodeError;
use crate::feed::{self, DecodeStats};
use crate::progress::ProgressCallback;
use crate::reconcile::PostcodeReconciler;
use crate::store::PostcodeStore;

/// Environment variable holding the prefix prepended to import file names.
pub const IMPORT_PATH_VAR: &str = "PLZ_IMPORT_PATH";

/// Resolves an import file name against `PLZ_IMPORT_PATH`.
///
/// The prefix is prepended as-is, so it needs its own trailing separator.
/// An unset variable means the name is used unchanged.
#[must_use]
pub fn import_path(file_name: &str) -> PathBuf {
    let prefix = std::env::var(IMPORT_PATH_VAR).unwrap_or_default();
    import_path_with_prefix(&prefix, file_name)
}

/// Joins `prefix` and the trimmed `file_name` by plain concatenation.
#[must_use]
pub fn import_path_with_prefix(prefix: &str, file_name: &str) -> PathBuf {
    PathBuf::from(format!("{prefix}{}", file_name.trim()))
}

/// Imports the gzip-compressed postcode feed named `file_name`.
///
/// # Errors
///
/// See [`import_postcode_path`].
pub async fn import_postcode_file(
    store: Arc<dyn PostcodeStore>,
    file_name: &str,
    progress: Arc<dyn ProgressCallback>,
) -> Result<ImportSummary, PostcodeError> {
    import_postcode_path(store, &import_path(file_name), progress).await
}

/// Imports the gzip-compressed postcode feed at `path`.
///
/// Malformed features are skipped and a stream that breaks part way keeps
/// what was decoded before the break. The surviving records are reconciled
/// in one transaction; a failed transaction shows up as `written == 0` in
/// the summary rather than as an error.
///
/// # Errors
///
/// * [`PostcodeError::Io`] if the file cannot be opened
/// * [`PostcodeError::Task`] if the decoding worker panics
pub async fn import_postcode_path(
    store: Arc<dyn PostcodeStore>,
    path: &Path,
    progress: Arc<dyn ProgressCallback>,
) -> Result<ImportSummary, PostcodeError> {
    log::info!("Importing postcodes from {}", path.display());
    let file = File::open(path)?;

    progress.set_message(format!("Decoding {}", path.display()));
    let decode_progress = Arc::clone(&progress);
    let (records, stats) = tokio::task::spawn_blocking(move || {
        let mut records = Vec::new();
        let stats = feed::decode_features(BufReader::new(file), decode_progress.as_ref(), |r| {
            records.push(r);
        });
        (records, stats)
    })
    .await?;

    let summary = reconcile_decoded(store, &records, stats, progress.as_ref()).await;
    progress.finish(format!(
        "Imported {} postcodes ({} skipped)",
        summary.written, summary.skipped
    ));
    Ok(summary)
}

async fn reconcile_decoded(
    store: Arc<dyn PostcodeStore>,
    records: &[PostcodeRecord],
    stats: DecodeStats,
    progress: &dyn ProgressCallback,
) -> ImportSummary {
    let without_centroid = records.iter().filter(|r| !r.has_centroid()).count() as u64;
    if without_centroid > 0 {
        log::warn!("{without_centroid} postcodes have a zero-area boundary and no centroid");
    }

    progress.set_message(format!("Reconciling {} postcodes", records.len()));
    let written = PostcodeReconciler::new(store).reconcile(records).await;

    ImportSummary {
        decoded: stats.decoded,
        skipped: stats.skipped,
        written,
        without_centroid,
    }
}
