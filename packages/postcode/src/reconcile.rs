//! Batch upsert of postcode records.

use std::sync::Arc;

use fuel_map_postcode_models::PostcodeRecord;

use crate::PostcodeError;
use crate::store::{PostcodeStore, PostcodeTransaction};

/// Counts from one successful reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Records that did not exist before.
    pub inserted: u64,
    /// Existing records overwritten in place.
    pub updated: u64,
}

impl ReconcileStats {
    /// Total records written.
    #[must_use]
    pub const fn written(&self) -> u64 {
        self.inserted + self.updated
    }
}

/// Writes incoming postcode records into a store as one atomic batch.
pub struct PostcodeReconciler {
    store: Arc<dyn PostcodeStore>,
}

impl PostcodeReconciler {
    /// Creates a reconciler writing into `store`.
    #[must_use]
    pub fn new(store: Arc<dyn PostcodeStore>) -> Self {
        Self { store }
    }

    /// Upserts `incoming` and returns how many records were written.
    ///
    /// Failures are logged and reported as `0`; nothing from the batch is
    /// kept in that case.
    pub async fn reconcile(&self, incoming: &[PostcodeRecord]) -> u64 {
        match self.try_reconcile(incoming).await {
            Ok(stats) => {
                log::info!(
                    "Reconciled {} postcodes ({} new, {} updated)",
                    stats.written(),
                    stats.inserted,
                    stats.updated
                );
                stats.written()
            }
            Err(e) => {
                log::error!("Postcode reconciliation rolled back: {e}");
                0
            }
        }
    }

    /// Upserts `incoming` inside a single transaction.
    ///
    /// Each record is looked up by postcode inside the transaction. An
    /// existing record gets label, population, area, and centroid replaced;
    /// a missing one is inserted. A postcode that appears twice in the batch
    /// ends up with the values of its last occurrence.
    ///
    /// # Errors
    ///
    /// Returns the first storage error. The transaction is rolled back
    /// before returning, so the store is left exactly as it was.
    pub async fn try_reconcile(
        &self,
        incoming: &[PostcodeRecord],
    ) -> Result<ReconcileStats, PostcodeError> {
        let mut txn = self.store.begin().await?;

        match upsert_all(txn.as_mut(), incoming).await {
            Ok(stats) => {
                txn.commit().await?;
                Ok(stats)
            }
            Err(e) => {
                if let Err(rollback) = txn.rollback().await {
                    log::warn!("Rollback after failed reconciliation also failed: {rollback}");
                }
                Err(e)
            }
        }
    }
}

async fn upsert_all(
    txn: &mut dyn PostcodeTransaction,
    incoming: &[PostcodeRecord],
) -> Result<ReconcileStats, PostcodeError> {
    let mut stats = ReconcileStats::default();

    for record in incoming {
        match txn.find(record.postcode).await? {
            Some(mut existing) => {
                existing.overwrite_from(record);
                txn.save(&existing).await?;
                stats.updated += 1;
            }
            None => {
                txn.save(record).await?;
                stats.inserted += 1;
            }
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use fuel_map_geo_models::GeoPoint;

    use super::*;
    use crate::store::MemoryPostcodeStore;

    fn record(postcode: i32, label: &str, population: i32) -> PostcodeRecord {
        PostcodeRecord {
            label: label.to_string(),
            postcode,
            population,
            area_sq_km: 1.5,
            centroid: GeoPoint::new(53.5, 10.0),
        }
    }

    /// Delegates to a memory store but fails every save of one postcode.
    struct FailingStore {
        inner: MemoryPostcodeStore,
        poisoned: i32,
    }

    struct FailingTransaction {
        inner: Box<dyn PostcodeTransaction>,
        poisoned: i32,
    }

    #[async_trait]
    impl PostcodeStore for FailingStore {
        async fn find_all(&self) -> Result<Vec<PostcodeRecord>, PostcodeError> {
            self.inner.find_all().await
        }

        async fn find_by_label(
            &self,
            fragment: &str,
        ) -> Result<Vec<PostcodeRecord>, PostcodeError> {
            self.inner.find_by_label(fragment).await
        }

        async fn begin(&self) -> Result<Box<dyn PostcodeTransaction>, PostcodeError> {
            Ok(Box::new(FailingTransaction {
                inner: self.inner.begin().await?,
                poisoned: self.poisoned,
            }))
        }
    }

    #[async_trait]
    impl PostcodeTransaction for FailingTransaction {
        async fn find(&mut self, postcode: i32) -> Result<Option<PostcodeRecord>, PostcodeError> {
            self.inner.find(postcode).await
        }

        async fn save(&mut self, record: &PostcodeRecord) -> Result<(), PostcodeError> {
            if record.postcode == self.poisoned {
                return Err(PostcodeError::Storage {
                    message: format!("constraint violated for {}", record.postcode),
                });
            }
            self.inner.save(record).await
        }

        async fn commit(self: Box<Self>) -> Result<(), PostcodeError> {
            self.inner.commit().await
        }

        async fn rollback(self: Box<Self>) -> Result<(), PostcodeError> {
            self.inner.rollback().await
        }
    }

    #[tokio::test]
    async fn inserts_into_empty_store() {
        let store = MemoryPostcodeStore::new();
        let reconciler = PostcodeReconciler::new(Arc::new(store.clone()));

        let written = reconciler
            .reconcile(&[record(20095, "20095 Hamburg", 3_000), record(1067, "01067 Dresden", 12_000)])
            .await;

        assert_eq!(written, 2);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn reconciling_twice_is_idempotent() {
        let store = MemoryPostcodeStore::new();
        let reconciler = PostcodeReconciler::new(Arc::new(store.clone()));
        let batch = [record(20095, "20095 Hamburg", 3_000), record(22761, "22761 Hamburg", 28_000)];

        let first = reconciler.try_reconcile(&batch).await.unwrap();
        let after_first = store.find_all().await.unwrap();
        let second = reconciler.try_reconcile(&batch).await.unwrap();
        let after_second = store.find_all().await.unwrap();

        assert_eq!(first, ReconcileStats { inserted: 2, updated: 0 });
        assert_eq!(second, ReconcileStats { inserted: 0, updated: 2 });
        assert_eq!(after_first, after_second);
    }

    #[tokio::test]
    async fn existing_record_is_overwritten_in_place() {
        let store = MemoryPostcodeStore::with_records([record(20095, "old label", 1)]);
        let reconciler = PostcodeReconciler::new(Arc::new(store.clone()));

        let mut fresh = record(20095, "20095 Hamburg Altstadt", 3_079);
        fresh.centroid = GeoPoint::new(53.55, 9.99);
        reconciler.try_reconcile(&[fresh.clone()]).await.unwrap();

        let all = store.find_all().await.unwrap();
        assert_eq!(all, vec![fresh]);
    }

    #[tokio::test]
    async fn duplicate_postcode_in_batch_keeps_last() {
        let store = MemoryPostcodeStore::new();
        let reconciler = PostcodeReconciler::new(Arc::new(store.clone()));

        let stats = reconciler
            .try_reconcile(&[record(20095, "first", 1), record(20095, "second", 2)])
            .await
            .unwrap();

        assert_eq!(stats, ReconcileStats { inserted: 1, updated: 1 });
        let all = store.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].label, "second");
        assert_eq!(all[0].population, 2);
    }

    #[tokio::test]
    async fn one_failure_rolls_back_whole_batch() {
        let inner = MemoryPostcodeStore::with_records([record(20095, "20095 Hamburg", 3_000)]);
        let before = inner.find_all().await.unwrap();
        let reconciler = PostcodeReconciler::new(Arc::new(FailingStore {
            inner: inner.clone(),
            poisoned: 24_103,
        }));

        let batch = [
            record(20095, "changed", 9),
            record(22761, "22761 Hamburg", 28_000),
            record(24_103, "24103 Kiel", 11_000),
            record(25_999, "25999 Kampen", 500),
        ];

        assert!(reconciler.try_reconcile(&batch).await.is_err());
        assert_eq!(reconciler.reconcile(&batch).await, 0);
        assert_eq!(inner.find_all().await.unwrap(), before);
    }

    #[tokio::test]
    async fn empty_batch_writes_nothing() {
        let store = MemoryPostcodeStore::new();
        let reconciler = PostcodeReconciler::new(Arc::new(store.clone()));
        assert_eq!(reconciler.reconcile(&[]).await, 0);
        assert!(store.is_empty().await);
    }
}
