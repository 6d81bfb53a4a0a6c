//! Postgres-backed record store.
//!
//! All collections share the `records` table (see `migrations/`). Bodies are
//! JSONB; list filters are pushed down as `body @> $filter`, which matches the
//! in-memory store's equality semantics.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Duplicate` |
//! | anything else | – | `Database` |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use wms_core::{AuditTrail, ListQuery, Page, RecordId, UserId};

use super::{RecordStore, StoreError, StoreResult, StoredRecord};

const SCHEMA: &str = include_str!("../../migrations/0001_records.sql");

/// Postgres-backed record store.
///
/// `Send + Sync`; the SQLx pool handles connection sharing.
#[derive(Debug, Clone)]
pub struct PostgresRecordStore {
    pool: Arc<PgPool>,
}

impl PostgresRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect and make sure the schema exists.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.bootstrap().await?;
        Ok(store)
    }

    /// Apply the (idempotent) schema script.
    pub async fn bootstrap(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("bootstrap", e))?;
        tracing::info!("records schema ready");
        Ok(())
    }
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    #[instrument(skip(self, record), fields(collection = %record.collection, id = %record.id), err)]
    async fn insert(&self, record: StoredRecord) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO records (
                collection, id, body,
                created_at, created_by, updated_at, updated_by, deleted_at, deleted_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&record.collection)
        .bind(record.id.as_uuid())
        .bind(&record.body)
        .bind(record.audit.created_at)
        .bind(record.audit.created_by.map(Uuid::from))
        .bind(record.audit.updated_at)
        .bind(record.audit.updated_by.map(Uuid::from))
        .bind(record.audit.deleted_at)
        .bind(record.audit.deleted_by.map(Uuid::from))
        .execute(&*self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(StoreError::Duplicate {
                collection: record.collection,
                id: record.id,
            }),
            Err(e) => Err(map_sqlx_error("insert", e)),
        }
    }

    #[instrument(skip(self), err)]
    async fn fetch(&self, collection: &str, id: RecordId) -> StoreResult<Option<StoredRecord>> {
        let row = sqlx::query(
            r#"
            SELECT collection, id, body,
                   created_at, created_by, updated_at, updated_by, deleted_at, deleted_by
            FROM records
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("fetch", e))?;

        row.as_ref()
            .map(record_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("fetch", e))
    }

    #[instrument(skip(self, query), fields(limit = query.pagination.limit, offset = query.pagination.offset), err)]
    async fn list(&self, collection: &str, query: &ListQuery) -> StoreResult<Page<StoredRecord>> {
        let filter = Value::Object(query.filter.clone());

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM records
            WHERE collection = $1
              AND body @> $2
              AND ($3 OR deleted_at IS NULL)
            "#,
        )
        .bind(collection)
        .bind(&filter)
        .bind(query.include_deleted)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_count", e))?;

        let rows = sqlx::query(
            r#"
            SELECT collection, id, body,
                   created_at, created_by, updated_at, updated_by, deleted_at, deleted_by
            FROM records
            WHERE collection = $1
              AND body @> $2
              AND ($3 OR deleted_at IS NULL)
            ORDER BY id ASC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(collection)
        .bind(&filter)
        .bind(query.include_deleted)
        .bind(i64::from(query.pagination.limit))
        .bind(i64::from(query.pagination.offset))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list", e))?;

        let items = rows
            .iter()
            .map(record_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("list", e))?;

        Ok(Page {
            items,
            total: total.max(0) as u64,
            limit: query.pagination.limit,
            offset: query.pagination.offset,
        })
    }

    #[instrument(skip(self, record), fields(collection = %record.collection, id = %record.id), err)]
    async fn replace(&self, record: StoredRecord) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE records
            SET body = $3,
                updated_at = $4,
                updated_by = $5,
                deleted_at = $6,
                deleted_by = $7
            WHERE collection = $1 AND id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(&record.collection)
        .bind(record.id.as_uuid())
        .bind(&record.body)
        .bind(record.audit.updated_at)
        .bind(record.audit.updated_by.map(Uuid::from))
        .bind(record.audit.deleted_at)
        .bind(record.audit.deleted_by.map(Uuid::from))
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("replace", e))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    async fn remove(&self, collection: &str, id: RecordId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM records WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("remove", e))?;

        Ok(result.rows_affected() > 0)
    }
}

fn record_from_row(row: &PgRow) -> Result<StoredRecord, sqlx::Error> {
    let user = |col: &str| -> Result<Option<UserId>, sqlx::Error> {
        Ok(row.try_get::<Option<Uuid>, _>(col)?.map(UserId::from_uuid))
    };

    Ok(StoredRecord {
        collection: row.try_get("collection")?,
        id: RecordId::from_uuid(row.try_get("id")?),
        body: row.try_get("body")?,
        audit: AuditTrail {
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            created_by: user("created_by")?,
            updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
            updated_by: user("updated_by")?,
            deleted_at: row.try_get::<Option<DateTime<Utc>>, _>("deleted_at")?,
            deleted_by: user("deleted_by")?,
        },
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    let message = match &err {
        sqlx::Error::Database(db_err) => db_err.message().to_string(),
        sqlx::Error::PoolClosed => "connection pool closed".to_string(),
        other => other.to_string(),
    };
    StoreError::Database { operation, message }
}
