//! `wms-core`: foundation building blocks shared by every WMS crate.
//!
//! This crate contains **pure** primitives (no infrastructure concerns):
//! identifiers, the domain error model, the audit trail stamped on every
//! record, and the list/pagination vocabulary.

pub mod audit;
pub mod error;
pub mod id;
pub mod query;

pub use audit::AuditTrail;
pub use error::{DomainError, DomainResult};
pub use id::{RecordId, UserId};
pub use query::{ListQuery, Page, Pagination};
