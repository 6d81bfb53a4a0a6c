//! `wms-infra`: storage for WMS records.
//!
//! - [`store`]: the type-erased [`store::RecordStore`] seam with in-memory and
//!   Postgres implementations.
//! - [`repository`]: the typed, audited layer every handler goes through
//!   (validation, reference checks, `created_by`/`updated_by` stamping, soft
//!   delete).

pub mod repository;
pub mod store;

pub use repository::{AuditedRepository, Record, RepositoryError};
pub use store::{InMemoryRecordStore, PostgresRecordStore, RecordStore, StoreError, StoredRecord};
