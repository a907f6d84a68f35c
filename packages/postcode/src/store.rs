//! Storage seam for postcode records.
//!
//! A [`PostcodeStore`] hands out at most one open [`PostcodeTransaction`] at
//! a time: [`PostcodeStore::begin`] waits until the previous transaction has
//! committed, rolled back, or been dropped. Reconciliation therefore looks
//! up existing records inside its own transaction and two imports can never
//! interleave their writes.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use fuel_map_postcode_models::PostcodeRecord;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::PostcodeError;

/// Read access and transactional writes for postcode records.
#[async_trait]
pub trait PostcodeStore: Send + Sync {
    /// Returns every stored record, ordered by postcode.
    ///
    /// # Errors
    ///
    /// Returns [`PostcodeError::Storage`] if the backend query fails.
    async fn find_all(&self) -> Result<Vec<PostcodeRecord>, PostcodeError>;

    /// Returns records whose label contains `fragment`, ignoring case,
    /// ordered by postcode.
    ///
    /// # Errors
    ///
    /// Returns [`PostcodeError::Storage`] if the backend query fails.
    async fn find_by_label(&self, fragment: &str) -> Result<Vec<PostcodeRecord>, PostcodeError>;

    /// Opens a write transaction, waiting for any open one to finish.
    ///
    /// # Errors
    ///
    /// Returns [`PostcodeError::Storage`] if the backend cannot start a
    /// transaction.
    async fn begin(&self) -> Result<Box<dyn PostcodeTransaction>, PostcodeError>;
}

/// An open write transaction. Dropping it without [`commit`] discards every
/// write made through it.
///
/// [`commit`]: PostcodeTransaction::commit
#[async_trait]
pub trait PostcodeTransaction: Send {
    /// Looks up a record by postcode, seeing this transaction's own writes.
    ///
    /// # Errors
    ///
    /// Returns [`PostcodeError::Storage`] if the lookup fails.
    async fn find(&mut self, postcode: i32) -> Result<Option<PostcodeRecord>, PostcodeError>;

    /// Inserts the record, or replaces the one with the same postcode.
    ///
    /// # Errors
    ///
    /// Returns [`PostcodeError::Storage`] if the write fails.
    async fn save(&mut self, record: &PostcodeRecord) -> Result<(), PostcodeError>;

    /// Makes every write of this transaction visible.
    ///
    /// # Errors
    ///
    /// Returns [`PostcodeError::Storage`] if the commit fails; nothing is
    /// written in that case.
    async fn commit(self: Box<Self>) -> Result<(), PostcodeError>;

    /// Discards every write of this transaction.
    ///
    /// # Errors
    ///
    /// Returns [`PostcodeError::Storage`] if the backend reports a failure
    /// while rolling back.
    async fn rollback(self: Box<Self>) -> Result<(), PostcodeError>;
}

/// Postcode table held in process memory.
///
/// Clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct MemoryPostcodeStore {
    records: Arc<Mutex<BTreeMap<i32, PostcodeRecord>>>,
}

impl MemoryPostcodeStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with `records`. Later duplicates of a
    /// postcode replace earlier ones.
    #[must_use]
    pub fn with_records(records: impl IntoIterator<Item = PostcodeRecord>) -> Self {
        let table = records.into_iter().map(|r| (r.postcode, r)).collect();
        Self {
            records: Arc::new(Mutex::new(table)),
        }
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    /// Returns `true` if no records are stored.
    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl PostcodeStore for MemoryPostcodeStore {
    async fn find_all(&self) -> Result<Vec<PostcodeRecord>, PostcodeError> {
        Ok(self.records.lock().await.values().cloned().collect())
    }

    async fn find_by_label(&self, fragment: &str) -> Result<Vec<PostcodeRecord>, PostcodeError> {
        let needle = fragment.to_lowercase();
        Ok(self
            .records
            .lock()
            .await
            .values()
            .filter(|r| r.label.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn begin(&self) -> Result<Box<dyn PostcodeTransaction>, PostcodeError> {
        let guard = Arc::clone(&self.records).lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryTransaction { guard, staged }))
    }
}

/// Stages writes on a copy of the table while holding the table lock.
struct MemoryTransaction {
    guard: OwnedMutexGuard<BTreeMap<i32, PostcodeRecord>>,
    staged: BTreeMap<i32, PostcodeRecord>,
}

#[async_trait]
impl PostcodeTransaction for MemoryTransaction {
    async fn find(&mut self, postcode: i32) -> Result<Option<PostcodeRecord>, PostcodeError> {
        Ok(self.staged.get(&postcode).cloned())
    }

    async fn save(&mut self, record: &PostcodeRecord) -> Result<(), PostcodeError> {
        self.staged.insert(record.postcode, record.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), PostcodeError> {
        let Self { mut guard, staged } = *self;
        *guard = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), PostcodeError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use fuel_map_geo_models::GeoPoint;

    use super::*;

    fn record(postcode: i32, label: &str) -> PostcodeRecord {
        PostcodeRecord {
            label: label.to_string(),
            postcode,
            population: 1_000,
            area_sq_km: 2.0,
            centroid: GeoPoint::new(53.5, 10.0),
        }
    }

    #[tokio::test]
    async fn uncommitted_writes_are_invisible() {
        let store = MemoryPostcodeStore::new();
        let mut txn = store.begin().await.unwrap();
        txn.save(&record(20095, "20095 Hamburg")).await.unwrap();
        assert!(txn.find(20095).await.unwrap().is_some());
        txn.rollback().await.unwrap();

        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn dropped_transaction_discards_writes() {
        let store = MemoryPostcodeStore::new();
        {
            let mut txn = store.begin().await.unwrap();
            txn.save(&record(20095, "20095 Hamburg")).await.unwrap();
        }
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn committed_writes_are_visible() {
        let store = MemoryPostcodeStore::new();
        let mut txn = store.begin().await.unwrap();
        txn.save(&record(20095, "20095 Hamburg")).await.unwrap();
        txn.save(&record(1067, "01067 Dresden")).await.unwrap();
        txn.commit().await.unwrap();

        let all = store.find_all().await.unwrap();
        assert_eq!(
            all.iter().map(|r| r.postcode).collect::<Vec<_>>(),
            vec![1067, 20095]
        );
    }

    #[tokio::test]
    async fn label_search_ignores_case() {
        let store = MemoryPostcodeStore::with_records([
            record(20095, "20095 Hamburg"),
            record(22761, "22761 Hamburg Bahrenfeld"),
            record(1067, "01067 Dresden"),
        ]);
        let found = store.find_by_label("hAMBURG").await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(store.find_by_label("berlin").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn second_transaction_waits_for_first() {
        let store = MemoryPostcodeStore::new();
        let first = store.begin().await.unwrap();

        let other = store.clone();
        let waiter = tokio::spawn(async move {
            let mut txn = other.begin().await.unwrap();
            let seen = txn.find(20095).await.unwrap();
            txn.commit().await.unwrap();
            seen
        });

        let mut first = first;
        first.save(&record(20095, "20095 Hamburg")).await.unwrap();
        tokio::task::yield_now().await;
        first.commit().await.unwrap();

        let seen = waiter.await.unwrap();
        assert_eq!(seen.map(|r| r.postcode), Some(20095));
    }
}
