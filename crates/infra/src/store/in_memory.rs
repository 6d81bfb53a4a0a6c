use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;

use wms_core::{ListQuery, Page, RecordId, query::matches_filter};

use super::{RecordStore, StoreError, StoreResult, StoredRecord};

/// In-memory record store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    inner: RwLock<HashMap<String, BTreeMap<RecordId, StoredRecord>>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert(&self, record: StoredRecord) -> StoreResult<()> {
        let mut map = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let rows = map.entry(record.collection.clone()).or_default();
        if rows.contains_key(&record.id) {
            return Err(StoreError::Duplicate {
                collection: record.collection,
                id: record.id,
            });
        }
        rows.insert(record.id, record);
        Ok(())
    }

    async fn fetch(&self, collection: &str, id: RecordId) -> StoreResult<Option<StoredRecord>> {
        let map = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(map.get(collection).and_then(|rows| rows.get(&id)).cloned())
    }

    async fn list(&self, collection: &str, query: &ListQuery) -> StoreResult<Page<StoredRecord>> {
        let map = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        let Some(rows) = map.get(collection) else {
            return Ok(Page::empty(query.pagination));
        };

        let matching: Vec<&StoredRecord> = rows
            .values()
            .filter(|r| query.include_deleted || !r.audit.is_deleted())
            .filter(|r| matches_filter(&r.body, &query.filter))
            .collect();

        let window = query.pagination.window(matching.len());
        Ok(Page {
            total: matching.len() as u64,
            items: matching[window].iter().map(|r| (*r).clone()).collect(),
            limit: query.pagination.limit,
            offset: query.pagination.offset,
        })
    }

    async fn replace(&self, record: StoredRecord) -> StoreResult<bool> {
        let mut map = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        match map
            .get_mut(&record.collection)
            .and_then(|rows| rows.get_mut(&record.id))
        {
            Some(slot) if !slot.audit.is_deleted() => {
                *slot = record;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn remove(&self, collection: &str, id: RecordId) -> StoreResult<bool> {
        let mut map = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        Ok(map
            .get_mut(collection)
            .is_some_and(|rows| rows.remove(&id).is_some()))
    }
}
