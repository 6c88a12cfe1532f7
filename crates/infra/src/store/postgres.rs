//! Postgres-backed record store.
//!
//! Maps [`EggProductionRecord`] onto the `egg_production` table:
//!
//! | Field | Column | SQL type |
//! |-------|--------|----------|
//! | `id` | `id` | `SERIAL` primary key |
//! | `quantity_eggs` | `quantity_eggs` | `INTEGER` |
//! | `eggs_per_kilo` | `eggs_kilo` | `INTEGER` |
//! | `price_kilo` | `price_kilo` | `NUMERIC` |
//! | `registration_date` | `registration_date` | `DATE` |
//! | `status` | `estado` | `VARCHAR(1)`, `'A'` / `'I'` |
//!
//! ## Error Mapping
//!
//! Every SQLx error surfaces as `StoreError::Backend` with the operation name
//! attached; a stored status code other than `A`/`I` surfaces as
//! `StoreError::Domain`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::instrument;

use eggs_core::RecordId;
use eggs_production::{EggProductionRecord, EggProductionStore, RecordStatus, StoreError};

const SCHEMA: &str = include_str!("../../migrations/0001_egg_production.sql");

const COLUMNS: &str = "id, quantity_eggs, eggs_kilo, price_kilo, registration_date, estado";

/// Postgres-backed record store.
///
/// `PostgresEggProductionStore` is `Send + Sync` and cheap to clone; all
/// operations go through the SQLx pool.
#[derive(Debug, Clone)]
pub struct PostgresEggProductionStore {
    pool: Arc<PgPool>,
}

impl PostgresEggProductionStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the `egg_production` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

#[async_trait]
impl EggProductionStore for PostgresEggProductionStore {
    #[instrument(skip(self), err)]
    async fn find_all(&self) -> Result<Vec<EggProductionRecord>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM egg_production ORDER BY id ASC"
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_all", e))?;

        rows.iter().map(row_to_record).collect()
    }

    #[instrument(skip(self), err)]
    async fn find_by_status(
        &self,
        status: RecordStatus,
    ) -> Result<Vec<EggProductionRecord>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM egg_production WHERE estado = $1 ORDER BY id ASC"
        ))
        .bind(status.code())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_status", e))?;

        rows.iter().map(row_to_record).collect()
    }

    #[instrument(skip(self), err)]
    async fn find_by_id(&self, id: RecordId) -> Result<Option<EggProductionRecord>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM egg_production WHERE id = $1"
        ))
        .bind(id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_id", e))?;

        row.as_ref().map(row_to_record).transpose()
    }

    #[instrument(skip(self, record), err)]
    async fn insert(&self, record: EggProductionRecord) -> Result<EggProductionRecord, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO egg_production (
                quantity_eggs,
                eggs_kilo,
                price_kilo,
                registration_date,
                estado
            )
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(record.quantity_eggs)
        .bind(record.eggs_per_kilo)
        .bind(record.price_kilo)
        .bind(record.registration_date)
        .bind(record.status.map(RecordStatus::code))
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert", e))?;

        row_to_record(&row)
    }

    #[instrument(skip(self, record), err)]
    async fn update(
        &self,
        id: RecordId,
        record: EggProductionRecord,
    ) -> Result<Option<EggProductionRecord>, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE egg_production SET
                quantity_eggs = $2,
                eggs_kilo = $3,
                price_kilo = $4,
                registration_date = $5,
                estado = $6
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id.get())
        .bind(record.quantity_eggs)
        .bind(record.eggs_per_kilo)
        .bind(record.price_kilo)
        .bind(record.registration_date)
        .bind(record.status.map(RecordStatus::code))
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update", e))?;

        row.as_ref().map(row_to_record).transpose()
    }

    #[instrument(skip(self), err)]
    async fn delete(&self, id: RecordId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM egg_production WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;
        Ok(())
    }
}

fn row_to_record(row: &PgRow) -> Result<EggProductionRecord, StoreError> {
    let decode = |e| map_sqlx_error("decode_row", e);

    let id: i32 = row.try_get("id").map_err(decode)?;
    let estado: Option<String> = row.try_get("estado").map_err(decode)?;
    let status = estado.as_deref().map(RecordStatus::from_code).transpose()?;

    Ok(EggProductionRecord {
        id: Some(RecordId::new(id)),
        quantity_eggs: row.try_get::<Option<i32>, _>("quantity_eggs").map_err(decode)?,
        eggs_per_kilo: row.try_get::<Option<i32>, _>("eggs_kilo").map_err(decode)?,
        price_kilo: row.try_get::<Option<Decimal>, _>("price_kilo").map_err(decode)?,
        registration_date: row
            .try_get::<Option<NaiveDate>, _>("registration_date")
            .map_err(decode)?,
        status,
    })
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code().map(|c| c.into_owned()).unwrap_or_default();
            StoreError::backend(format!(
                "database error in {operation} [{code}]: {}",
                db_err.message()
            ))
        }
        sqlx::Error::PoolClosed => {
            StoreError::backend(format!("connection pool closed in {operation}"))
        }
        _ => StoreError::backend(format!("sqlx error in {operation}: {err}")),
    }
}
