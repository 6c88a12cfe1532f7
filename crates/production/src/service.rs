//! Record lifecycle: create, overwrite, soft-delete/restore, physical delete.
//!
//! Operations on a missing id complete with an empty result instead of an
//! error; callers cannot tell "doesn't exist" from "nothing to report".

use eggs_core::RecordId;

use crate::record::{EggProductionRecord, RecordStatus};
use crate::store::{EggProductionStore, StoreError};

pub struct EggProductionService<S> {
    store: S,
}

impl<S> EggProductionService<S>
where
    S: EggProductionStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All records, ascending id.
    pub async fn list_all(&self) -> Result<Vec<EggProductionRecord>, StoreError> {
        self.store.find_all().await
    }

    /// Active records only, ascending id.
    pub async fn list_active(&self) -> Result<Vec<EggProductionRecord>, StoreError> {
        self.store.find_by_status(RecordStatus::Active).await
    }

    pub async fn get_by_id(&self, id: RecordId) -> Result<Option<EggProductionRecord>, StoreError> {
        self.store.find_by_id(id).await
    }

    /// Persist a new record. A caller-supplied id is discarded; a missing
    /// status becomes Active.
    pub async fn create(
        &self,
        mut record: EggProductionRecord,
    ) -> Result<EggProductionRecord, StoreError> {
        record.id = None;
        if record.status.is_none() {
            record.status = Some(RecordStatus::Active);
        }

        let stored = self.store.insert(record).await?;
        tracing::debug!(id = ?stored.id, "egg production record created");
        Ok(stored)
    }

    /// Overwrite the whole record at `id` with `record` (omitted fields become
    /// null). Missing id: no write, `None`.
    pub async fn update(
        &self,
        id: RecordId,
        record: EggProductionRecord,
    ) -> Result<Option<EggProductionRecord>, StoreError> {
        if self.store.find_by_id(id).await?.is_none() {
            tracing::debug!(%id, "update skipped: record not found");
            return Ok(None);
        }

        let updated = self.store.update(id, record.with_id(id)).await?;
        tracing::debug!(%id, "egg production record updated");
        Ok(updated)
    }

    /// Physically remove the record. Missing id is a no-op.
    pub async fn delete(&self, id: RecordId) -> Result<(), StoreError> {
        if self.store.find_by_id(id).await?.is_none() {
            tracing::debug!(%id, "delete skipped: record not found");
            return Ok(());
        }

        self.store.delete(id).await?;
        tracing::debug!(%id, "egg production record deleted");
        Ok(())
    }

    pub async fn inactivate(&self, id: RecordId) -> Result<(), StoreError> {
        self.set_status(id, RecordStatus::Inactive).await
    }

    pub async fn activate(&self, id: RecordId) -> Result<(), StoreError> {
        self.set_status(id, RecordStatus::Active).await
    }

    async fn set_status(&self, id: RecordId, status: RecordStatus) -> Result<(), StoreError> {
        let Some(mut record) = self.store.find_by_id(id).await? else {
            tracing::debug!(%id, %status, "status change skipped: record not found");
            return Ok(());
        };

        record.status = Some(status);
        self.store.update(id, record).await?;
        tracing::debug!(%id, %status, "egg production record status changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    use crate::store::InMemoryEggProductionStore;

    /// Wraps the in-memory table and counts write calls.
    #[derive(Default)]
    struct CountingStore {
        inner: InMemoryEggProductionStore,
        writes: AtomicUsize,
    }

    impl CountingStore {
        fn writes(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EggProductionStore for CountingStore {
        async fn find_all(&self) -> Result<Vec<EggProductionRecord>, StoreError> {
            self.inner.find_all().await
        }

        async fn find_by_status(
            &self,
            status: RecordStatus,
        ) -> Result<Vec<EggProductionRecord>, StoreError> {
            self.inner.find_by_status(status).await
        }

        async fn find_by_id(
            &self,
            id: RecordId,
        ) -> Result<Option<EggProductionRecord>, StoreError> {
            self.inner.find_by_id(id).await
        }

        async fn insert(
            &self,
            record: EggProductionRecord,
        ) -> Result<EggProductionRecord, StoreError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.insert(record).await
        }

        async fn update(
            &self,
            id: RecordId,
            record: EggProductionRecord,
        ) -> Result<Option<EggProductionRecord>, StoreError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.update(id, record).await
        }

        async fn delete(&self, id: RecordId) -> Result<(), StoreError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.delete(id).await
        }
    }

    fn sample() -> EggProductionRecord {
        EggProductionRecord {
            id: None,
            quantity_eggs: Some(100),
            eggs_per_kilo: Some(20),
            price_kilo: Some(Decimal::new(350, 2)),
            registration_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            status: None,
        }
    }

    fn service() -> (EggProductionService<Arc<CountingStore>>, Arc<CountingStore>) {
        let store = Arc::new(CountingStore::default());
        (EggProductionService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn create_replaces_supplied_id_and_defaults_status() {
        let (svc, _) = service();
        svc.create(sample()).await.unwrap();

        let created = svc
            .create(sample().with_id(RecordId::new(999)))
            .await
            .unwrap();

        assert_eq!(created.id, Some(RecordId::new(2)));
        assert_eq!(created.status, Some(RecordStatus::Active));
        assert_eq!(created.price_kilo, Some(Decimal::new(350, 2)));
    }

    #[tokio::test]
    async fn create_keeps_explicit_inactive_status() {
        let (svc, _) = service();
        let mut input = sample();
        input.status = Some(RecordStatus::Inactive);

        let created = svc.create(input).await.unwrap();
        assert_eq!(created.status, Some(RecordStatus::Inactive));
    }

    #[tokio::test]
    async fn list_all_orders_by_id() {
        let (svc, _) = service();
        for _ in 0..3 {
            svc.create(sample()).await.unwrap();
        }

        let ids: Vec<i32> = svc
            .list_all()
            .await
            .unwrap()
            .iter()
            .map(|r| r.id.unwrap().get())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn list_active_excludes_inactivated_records() {
        let (svc, _) = service();
        let a = svc.create(sample()).await.unwrap();
        let b = svc.create(sample()).await.unwrap();
        svc.inactivate(a.id.unwrap()).await.unwrap();

        let active = svc.list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, b.id);
    }

    #[tokio::test]
    async fn activate_and_inactivate_flip_status_only() {
        let (svc, _) = service();
        let created = svc.create(sample()).await.unwrap();
        let id = created.id.unwrap();

        svc.inactivate(id).await.unwrap();
        let got = svc.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(got.status, Some(RecordStatus::Inactive));
        assert_eq!(got.quantity_eggs, created.quantity_eggs);
        assert_eq!(got.price_kilo, created.price_kilo);

        svc.activate(id).await.unwrap();
        let got = svc.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(got.status, Some(RecordStatus::Active));
    }

    #[tokio::test]
    async fn status_change_on_missing_id_writes_nothing() {
        let (svc, store) = service();
        svc.activate(RecordId::new(5)).await.unwrap();
        svc.inactivate(RecordId::new(5)).await.unwrap();

        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn update_overwrites_every_field() {
        let (svc, _) = service();
        let created = svc.create(sample()).await.unwrap();
        let id = created.id.unwrap();

        let patch = EggProductionRecord {
            id: Some(RecordId::new(77)),
            quantity_eggs: Some(5),
            ..Default::default()
        };
        let updated = svc.update(id, patch).await.unwrap().unwrap();

        assert_eq!(updated.id, Some(id));
        assert_eq!(updated.quantity_eggs, Some(5));
        assert_eq!(updated.eggs_per_kilo, None);
        assert_eq!(updated.price_kilo, None);
        assert_eq!(updated.status, None);
        assert!(svc.get_by_id(RecordId::new(77)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_of_missing_id_is_empty_and_writes_nothing() {
        let (svc, store) = service();
        let out = svc.update(RecordId::new(42), sample()).await.unwrap();

        assert!(out.is_none());
        assert_eq!(store.writes(), 0);
        assert!(svc.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_existing_record() {
        let (svc, _) = service();
        let created = svc.create(sample()).await.unwrap();
        let id = created.id.unwrap();

        svc.delete(id).await.unwrap();
        assert!(svc.get_by_id(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_of_missing_id_is_noop() {
        let (svc, store) = service();
        svc.delete(RecordId::new(1)).await.unwrap();

        assert_eq!(store.writes(), 0);
        assert!(svc.list_all().await.unwrap().is_empty());
    }

    fn status_strategy() -> impl Strategy<Value = Option<RecordStatus>> {
        prop_oneof![
            Just(None),
            Just(Some(RecordStatus::Active)),
            Just(Some(RecordStatus::Inactive)),
        ]
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
    }

    proptest! {
        #[test]
        fn created_id_never_echoes_input_id(
            supplied in proptest::option::of(1000i32..i32::MAX),
            quantity in proptest::option::of(any::<i32>()),
        ) {
            let (svc, _) = service();
            let input = EggProductionRecord {
                id: supplied.map(RecordId::new),
                quantity_eggs: quantity,
                ..Default::default()
            };

            let created = runtime().block_on(svc.create(input)).unwrap();
            prop_assert!(created.id.is_some());
            prop_assert_ne!(created.id, supplied.map(RecordId::new));
            prop_assert_eq!(created.quantity_eggs, quantity);
        }

        #[test]
        fn list_active_only_returns_active(
            statuses in proptest::collection::vec(status_strategy(), 0..20),
            flips in proptest::collection::vec((1i32..25, any::<bool>()), 0..10),
        ) {
            let (svc, _) = service();
            let rt = runtime();
            rt.block_on(async {
                for status in statuses {
                    let mut r = sample();
                    r.status = status;
                    svc.create(r).await.unwrap();
                }
                for (id, activate) in flips {
                    if activate {
                        svc.activate(RecordId::new(id)).await.unwrap();
                    } else {
                        svc.inactivate(RecordId::new(id)).await.unwrap();
                    }
                }
            });

            let active = rt.block_on(svc.list_active()).unwrap();
            prop_assert!(active.iter().all(EggProductionRecord::is_active));
            prop_assert!(active.windows(2).all(|w| w[0].id < w[1].id));
        }
    }
}
