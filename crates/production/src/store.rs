//! Record storage port and the in-memory implementation used in dev/tests.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use thiserror::Error;

use eggs_core::{DomainError, RecordId};

use crate::record::{EggProductionRecord, RecordStatus};

#[derive(Debug, Error)]
pub enum StoreError {
    /// Connectivity, constraint violations, type coercion failures.
    #[error("store backend failure: {0}")]
    Backend(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// Persistent table of egg-production records.
///
/// Listings are always ordered by ascending id. Each write touches exactly one
/// record.
#[async_trait]
pub trait EggProductionStore: Send + Sync {
    async fn find_all(&self) -> Result<Vec<EggProductionRecord>, StoreError>;

    async fn find_by_status(
        &self,
        status: RecordStatus,
    ) -> Result<Vec<EggProductionRecord>, StoreError>;

    async fn find_by_id(&self, id: RecordId) -> Result<Option<EggProductionRecord>, StoreError>;

    /// Persist a new record. Any id on `record` is ignored; the store assigns one.
    async fn insert(&self, record: EggProductionRecord) -> Result<EggProductionRecord, StoreError>;

    /// Overwrite every column of `id`. Returns `None` if the row no longer exists.
    async fn update(
        &self,
        id: RecordId,
        record: EggProductionRecord,
    ) -> Result<Option<EggProductionRecord>, StoreError>;

    async fn delete(&self, id: RecordId) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> EggProductionStore for Arc<S>
where
    S: EggProductionStore + ?Sized,
{
    async fn find_all(&self) -> Result<Vec<EggProductionRecord>, StoreError> {
        (**self).find_all().await
    }

    async fn find_by_status(
        &self,
        status: RecordStatus,
    ) -> Result<Vec<EggProductionRecord>, StoreError> {
        (**self).find_by_status(status).await
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<EggProductionRecord>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn insert(&self, record: EggProductionRecord) -> Result<EggProductionRecord, StoreError> {
        (**self).insert(record).await
    }

    async fn update(
        &self,
        id: RecordId,
        record: EggProductionRecord,
    ) -> Result<Option<EggProductionRecord>, StoreError> {
        (**self).update(id, record).await
    }

    async fn delete(&self, id: RecordId) -> Result<(), StoreError> {
        (**self).delete(id).await
    }
}

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<RecordId, EggProductionRecord>,
    last_id: i32,
}

/// In-memory record table for tests/dev.
///
/// Ids come from a monotonically increasing counter starting at 1, mirroring a
/// serial column; deleted ids are never reused.
#[derive(Debug, Default)]
pub struct InMemoryEggProductionStore {
    inner: RwLock<Table>,
}

impl InMemoryEggProductionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> StoreError {
        StoreError::backend("in-memory table lock poisoned")
    }
}

#[async_trait]
impl EggProductionStore for InMemoryEggProductionStore {
    async fn find_all(&self) -> Result<Vec<EggProductionRecord>, StoreError> {
        let table = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(table.rows.values().cloned().collect())
    }

    async fn find_by_status(
        &self,
        status: RecordStatus,
    ) -> Result<Vec<EggProductionRecord>, StoreError> {
        let table = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(table
            .rows
            .values()
            .filter(|r| r.status == Some(status))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<EggProductionRecord>, StoreError> {
        let table = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(table.rows.get(&id).cloned())
    }

    async fn insert(&self, record: EggProductionRecord) -> Result<EggProductionRecord, StoreError> {
        let mut table = self.inner.write().map_err(|_| Self::poisoned())?;
        table.last_id = table
            .last_id
            .checked_add(1)
            .ok_or_else(|| StoreError::backend("id sequence exhausted"))?;
        let id = RecordId::new(table.last_id);
        let stored = record.with_id(id);
        table.rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        id: RecordId,
        record: EggProductionRecord,
    ) -> Result<Option<EggProductionRecord>, StoreError> {
        let mut table = self.inner.write().map_err(|_| Self::poisoned())?;
        match table.rows.get_mut(&id) {
            Some(row) => {
                *row = record.with_id(id);
                Ok(Some(row.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: RecordId) -> Result<(), StoreError> {
        let mut table = self.inner.write().map_err(|_| Self::poisoned())?;
        table.rows.remove(&id);
        Ok(())
    }
}
