//! Progress reporting for postcode imports.
//!
//! The decoder only knows how many features it has seen, never how many
//! remain, so the callback is limited to messages and increments.
//! Rendering (an `indicatif` spinner in the CLI, nothing in tests) is left
//! to the implementor.

use std::sync::Arc;

/// Receives progress updates from a running import.
///
/// Implementations must be `Send + Sync` because decoding runs on a
/// blocking worker thread.
pub trait ProgressCallback: Send + Sync {
    /// Replace the message shown next to the indicator.
    fn set_message(&self, msg: String);

    /// Count `delta` more features as processed.
    fn inc(&self, delta: u64);

    /// Mark the import as complete with a final message.
    fn finish(&self, msg: String);
}

/// Ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_message(&self, _msg: String) {}
    fn inc(&self, _delta: u64) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
