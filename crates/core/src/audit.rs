//! Audit trail carried by every stored record.
//!
//! Writes never touch these fields directly: the repository layer stamps them
//! from the acting principal and the wall clock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrail {
    pub created_at: DateTime<Utc>,
    pub created_by: Option<UserId>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<UserId>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<UserId>,
}

impl AuditTrail {
    /// Trail for a freshly created record (`updated_*` mirrors `created_*`).
    pub fn created(actor: Option<UserId>, now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            created_by: actor,
            updated_at: now,
            updated_by: actor,
            deleted_at: None,
            deleted_by: None,
        }
    }

    pub fn touch(&mut self, actor: Option<UserId>, now: DateTime<Utc>) {
        self.updated_at = now;
        self.updated_by = actor;
    }

    /// Mark as soft-deleted. Also counts as an update.
    pub fn soft_delete(&mut self, actor: Option<UserId>, now: DateTime<Utc>) {
        self.touch(actor, now);
        self.deleted_at = Some(now);
        self.deleted_by = actor;
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
