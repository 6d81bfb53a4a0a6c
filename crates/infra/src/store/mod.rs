//! Record storage abstraction.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use wms_core::{AuditTrail, ListQuery, Page, RecordId};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryRecordStore;
pub use postgres::PostgresRecordStore;

/// A record as the store sees it: body is opaque JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub collection: String,
    pub id: RecordId,
    pub body: Value,
    pub audit: AuditTrail,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record {collection}/{id} already exists")]
    Duplicate { collection: String, id: RecordId },

    #[error("database error in {operation}: {message}")]
    Database { operation: &'static str, message: String },

    #[error("store lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Collection-scoped record storage.
///
/// Reads return soft-deleted rows too (callers decide); `list` honours
/// [`ListQuery::include_deleted`]. Lists are ordered by ascending id.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert(&self, record: StoredRecord) -> StoreResult<()>;

    async fn fetch(&self, collection: &str, id: RecordId) -> StoreResult<Option<StoredRecord>>;

    async fn list(&self, collection: &str, query: &ListQuery) -> StoreResult<Page<StoredRecord>>;

    /// Overwrite body + audit of a live row. `false` if the row is absent or
    /// already soft-deleted, so a stale copy can never resurrect it.
    async fn replace(&self, record: StoredRecord) -> StoreResult<bool>;

    /// Remove a row. `false` if absent.
    async fn remove(&self, collection: &str, id: RecordId) -> StoreResult<bool>;
}

#[async_trait]
impl<S> RecordStore for Arc<S>
where
    S: RecordStore + ?Sized,
{
    async fn insert(&self, record: StoredRecord) -> StoreResult<()> {
        (**self).insert(record).await
    }

    async fn fetch(&self, collection: &str, id: RecordId) -> StoreResult<Option<StoredRecord>> {
        (**self).fetch(collection, id).await
    }

    async fn list(&self, collection: &str, query: &ListQuery) -> StoreResult<Page<StoredRecord>> {
        (**self).list(collection, query).await
    }

    async fn replace(&self, record: StoredRecord) -> StoreResult<bool> {
        (**self).replace(record).await
    }

    async fn remove(&self, collection: &str, id: RecordId) -> StoreResult<bool> {
        (**self).remove(collection, id).await
    }
}
