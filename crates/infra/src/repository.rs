//! Typed, audited access to one collection.
//!
//! Every write goes through here so that validation, reference checks and
//! the audit trail are applied identically for all resources.

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use wms_core::{AuditTrail, DomainError, ListQuery, Page, Pagination, RecordId, UserId, query};
use wms_warehouse::{DeleteMode, Reference, Resource};

use crate::store::{RecordStore, StoreError, StoredRecord};

/// A typed record: id, resource body and audit trail, flattened on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<R> {
    pub id: RecordId,
    #[serde(flatten)]
    pub body: R,
    #[serde(flatten)]
    pub audit: AuditTrail,
}

impl<R: Resource> Record<R> {
    fn from_stored(stored: StoredRecord) -> Result<Self, RepositoryError> {
        Ok(Self {
            id: stored.id,
            body: serde_json::from_value(stored.body)?,
            audit: stored.audit,
        })
    }

    fn to_stored(&self) -> Result<StoredRecord, RepositoryError> {
        Ok(StoredRecord {
            collection: R::COLLECTION.to_string(),
            id: self.id,
            body: serde_json::to_value(&self.body)?,
            audit: self.audit.clone(),
        })
    }
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("record codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Audited CRUD over the collection of `R`.
pub struct AuditedRepository<R> {
    store: Arc<dyn RecordStore>,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for AuditedRepository<R> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> AuditedRepository<R> {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            _resource: PhantomData,
        }
    }

    /// Live records matching `filter`, ordered by creation.
    pub async fn list(
        &self,
        filter: &R::Filter,
        pagination: Pagination,
    ) -> RepositoryResult<Page<Record<R>>> {
        let query = ListQuery::new(query::filter_map(filter)?, pagination);
        let page = self.store.list(R::COLLECTION, &query).await?;
        page.try_map(Record::from_stored)
    }

    /// A live record; soft-deleted rows are reported as missing.
    pub async fn get(&self, id: RecordId) -> RepositoryResult<Record<R>> {
        match self.store.fetch(R::COLLECTION, id).await? {
            Some(stored) if !stored.audit.is_deleted() => Record::from_stored(stored),
            _ => Err(DomainError::not_found().into()),
        }
    }

    pub async fn create(&self, body: R, actor: UserId) -> RepositoryResult<Record<R>> {
        body.validate()?;
        self.check_references(body.references()).await?;

        let record = Record {
            id: RecordId::new(),
            body,
            audit: AuditTrail::created(Some(actor), Utc::now()),
        };
        self.store.insert(record.to_stored()?).await?;

        tracing::info!(collection = R::COLLECTION, id = %record.id, actor = %actor, "record created");
        Ok(record)
    }

    pub async fn update(
        &self,
        id: RecordId,
        patch: R::Update,
        actor: UserId,
    ) -> RepositoryResult<Record<R>> {
        let mut record = self.get(id).await?;
        let before = record.body.references();
        record.body.apply_update(patch);
        record.body.validate()?;
        // Only links the patch introduced are checked again.
        let introduced = record
            .body
            .references()
            .into_iter()
            .filter(|r| !before.contains(r));
        self.check_references(introduced).await?;
        record.audit.touch(Some(actor), Utc::now());

        if !self.store.replace(record.to_stored()?).await? {
            return Err(DomainError::not_found().into());
        }

        tracing::info!(collection = R::COLLECTION, id = %id, actor = %actor, "record updated");
        Ok(record)
    }

    /// Delete per the collection's [`DeleteMode`]; returns the record as it
    /// was last seen (with `deleted_*` set for soft deletes).
    ///
    /// Refused with [`DomainError::Conflict`] while live records still point
    /// at it.
    pub async fn delete(&self, id: RecordId, actor: UserId) -> RepositoryResult<Record<R>> {
        let mut record = self.get(id).await?;
        self.ensure_unreferenced(id).await?;

        let found = match R::DELETE_MODE {
            DeleteMode::Hard => self.store.remove(R::COLLECTION, id).await?,
            DeleteMode::Soft => {
                record.audit.soft_delete(Some(actor), Utc::now());
                self.store.replace(record.to_stored()?).await?
            }
        };
        if !found {
            return Err(DomainError::not_found().into());
        }

        tracing::info!(
            collection = R::COLLECTION,
            id = %id,
            actor = %actor,
            mode = ?R::DELETE_MODE,
            "record deleted"
        );
        Ok(record)
    }

    async fn check_references(
        &self,
        references: impl IntoIterator<Item = Reference>,
    ) -> RepositoryResult<()> {
        for reference in references {
            let live = matches!(
                self.store.fetch(reference.collection, reference.id).await?,
                Some(stored) if !stored.audit.is_deleted()
            );
            if !live {
                return Err(DomainError::invalid_reference(format!(
                    "{}: no {} record with id {}",
                    reference.field, reference.collection, reference.id
                ))
                .into());
            }
        }
        Ok(())
    }

    async fn ensure_unreferenced(&self, id: RecordId) -> RepositoryResult<()> {
        for (collection, fk) in wms_warehouse::referrers(R::COLLECTION) {
            let target = Value::String(id.to_string());
            let value = if fk.many {
                Value::Array(vec![target])
            } else {
                target
            };
            let mut filter = Map::new();
            filter.insert(fk.field.to_string(), value);

            let query = ListQuery::new(filter, Pagination { limit: 1, offset: 0 });
            let referring = self.store.list(collection, &query).await?.total;
            if referring > 0 {
                return Err(DomainError::conflict(format!(
                    "{} {id} is still referenced by {referring} {collection} record(s) via {}",
                    R::COLLECTION,
                    fk.field
                ))
                .into());
            }
        }
        Ok(())
    }
}
