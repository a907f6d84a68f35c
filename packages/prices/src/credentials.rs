//! Round-robin rotation over the price provider's API keys.
//!
//! Every request is counted. Whenever the running count reaches a multiple
//! of the rotation threshold, the pool moves on to the next key, wrapping
//! back to the first after the last one. This spreads load across keys; it
//! does not enforce any rate.

use std::sync::{Mutex, PoisonError};

use crate::PricesError;

/// Requests served by one key before rotating, matching the provider's
/// per-key quota.
pub const DEFAULT_ROTATION_THRESHOLD: u64 = 45;

/// A fixed set of API keys with a shared rotation position.
///
/// All methods take `&self`; the index and counter sit behind one mutex so
/// overlapping jobs always observe a consistent pair.
#[derive(Debug)]
pub struct CredentialPool {
    keys: Vec<String>,
    threshold: u64,
    state: Mutex<Rotation>,
}

#[derive(Debug, Default)]
struct Rotation {
    index: usize,
    requests: u64,
}

impl CredentialPool {
    /// Creates a pool starting at the first key.
    ///
    /// # Errors
    ///
    /// Returns [`PricesError::Config`] if `keys` is empty or `threshold`
    /// is zero.
    pub fn new(keys: Vec<String>, threshold: u64) -> Result<Self, PricesError> {
        if keys.is_empty() {
            return Err(PricesError::Config {
                message: "credential pool needs at least one API key".to_string(),
            });
        }
        if threshold == 0 {
            return Err(PricesError::Config {
                message: "credential rotation threshold must be positive".to_string(),
            });
        }

        Ok(Self {
            keys,
            threshold,
            state: Mutex::new(Rotation::default()),
        })
    }

    /// The key to use for the next request.
    #[must_use]
    pub fn current_credential(&self) -> String {
        let index = self.lock().index;
        self.keys[index].clone()
    }

    /// Counts one request and rotates if the threshold was reached.
    ///
    /// Returns the running request count.
    pub fn record_request(&self) -> u64 {
        let mut state = self.lock();
        state.requests += 1;
        if state.requests % self.threshold == 0 {
            state.index = (state.index + 1) % self.keys.len();
            log::debug!(
                "Rotated to API key #{} after {} requests",
                state.index,
                state.requests
            );
        }
        state.requests
    }

    /// Position of the current key.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.lock().index
    }

    /// Requests recorded so far.
    #[must_use]
    pub fn request_count(&self) -> u64 {
        self.lock().requests
    }

    /// Number of keys in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Always `false`; construction rejects empty pools.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Rotation> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
