//! Users, roles and permissions as stored records.
//!
//! These are the administrable side of access control. Token-time checks
//! live in `wms-auth`.

use serde::{Deserialize, Serialize};

use wms_core::{DomainError, DomainResult, RecordId};

use crate::resource::{DeleteMode, ForeignKey, Reference, Resource, apply_patch, optional_text, require_text};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub role_id: Option<RecordId>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub role_id: Option<RecordId>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UserFilter {
    pub email: Option<String>,
    pub role_id: Option<RecordId>,
    pub is_active: Option<bool>,
}

impl Resource for User {
    const COLLECTION: &'static str = "users";
    const DELETE_MODE: DeleteMode = DeleteMode::Soft;
    const FOREIGN_KEYS: &'static [ForeignKey] = &[ForeignKey::one("role_id", RoleRecord::COLLECTION)];

    type Update = UserUpdate;
    type Filter = UserFilter;

    fn validate(&self) -> DomainResult<()> {
        require_text("email", &self.email)?;
        validate_email(&self.email)?;
        require_text("display_name", &self.display_name)
    }

    fn apply_update(&mut self, patch: UserUpdate) {
        apply_patch!(self, patch, [email, display_name, is_active], [role_id]);
    }

    fn references(&self) -> Vec<Reference> {
        self.role_id
            .map(|id| Reference::new("role_id", RoleRecord::COLLECTION, id))
            .into_iter()
            .collect()
    }
}

fn validate_email(email: &str) -> DomainResult<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(DomainError::validation("email is not a valid address"))
    }
}

/// A named bundle of permissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permission_ids: Vec<RecordId>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RoleUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub permission_ids: Option<Vec<RecordId>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RoleFilter {
    pub name: Option<String>,
}

impl Resource for RoleRecord {
    const COLLECTION: &'static str = "roles";
    const DELETE_MODE: DeleteMode = DeleteMode::Soft;
    const FOREIGN_KEYS: &'static [ForeignKey] = &[ForeignKey::many("permission_ids", PermissionRecord::COLLECTION)];

    type Update = RoleUpdate;
    type Filter = RoleFilter;

    fn validate(&self) -> DomainResult<()> {
        require_text("name", &self.name)?;
        optional_text("description", self.description.as_deref())?;
        let mut seen = std::collections::HashSet::new();
        if !self.permission_ids.iter().all(|id| seen.insert(*id)) {
            return Err(DomainError::validation("permission_ids must not repeat"));
        }
        Ok(())
    }

    fn apply_update(&mut self, patch: RoleUpdate) {
        apply_patch!(self, patch, [name, permission_ids], [description]);
    }

    fn references(&self) -> Vec<Reference> {
        self.permission_ids
            .iter()
            .map(|id| Reference::new("permission_ids", PermissionRecord::COLLECTION, *id))
            .collect()
    }
}

/// A grantable permission, named `<collection>.<action>`, `<collection>.*` or `*`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionRecord {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PermissionUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PermissionFilter {
    pub name: Option<String>,
}

impl Resource for PermissionRecord {
    const COLLECTION: &'static str = "permissions";
    const DELETE_MODE: DeleteMode = DeleteMode::Hard;

    type Update = PermissionUpdate;
    type Filter = PermissionFilter;

    fn validate(&self) -> DomainResult<()> {
        require_text("name", &self.name)?;
        if !is_permission_name(&self.name) {
            return Err(DomainError::validation(
                "name must be '*' or '<collection>.<action>'",
            ));
        }
        optional_text("description", self.description.as_deref())
    }

    fn apply_update(&mut self, patch: PermissionUpdate) {
        apply_patch!(self, patch, [name], [description]);
    }
}

fn is_permission_name(name: &str) -> bool {
    if name == "*" {
        return true;
    }
    let segment = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_lowercase() || c == '_');
    match name.split_once('.') {
        Some((collection, action)) => segment(collection) && (action == "*" || segment(action)),
        None => false,
    }
}
