//! API-side authorization: the built-in role policy and per-route checks.

use wms_auth::{Permission, Role, authorize};
use wms_warehouse::{ACCESS_COLLECTIONS, STOCK_COLLECTIONS, WAREHOUSE_COLLECTIONS};

use crate::app::errors::ApiError;
use crate::context::PrincipalContext;

/// CRUD action being attempted on a collection.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

/// Permissions granted by a built-in role; `None` for roles the policy does
/// not know (those are looked up among stored roles).
pub fn builtin_role_permissions(role: &str) -> Option<Vec<Permission>> {
    let reads = |collections: &[&str]| -> Vec<Permission> {
        collections.iter().map(|c| Permission::on(c, "read")).collect()
    };

    let perms = match role {
        Role::ADMIN => vec![Permission::new("*")],
        Role::MANAGER => WAREHOUSE_COLLECTIONS
            .iter()
            .map(|c| Permission::new(format!("{c}.*")))
            .chain(reads(&ACCESS_COLLECTIONS))
            .collect(),
        Role::OPERATOR => {
            let mut perms = reads(&WAREHOUSE_COLLECTIONS);
            for c in STOCK_COLLECTIONS {
                perms.push(Permission::on(c, "create"));
                perms.push(Permission::on(c, "update"));
            }
            perms
        }
        Role::VIEWER => reads(&WAREHOUSE_COLLECTIONS),
        _ => return None,
    };
    Some(perms)
}

/// Check that the principal may perform `action` on `collection`.
pub fn require(
    principal: &PrincipalContext,
    collection: &str,
    action: Action,
) -> Result<(), ApiError> {
    let required = Permission::on(collection, action.as_str());
    authorize(principal.principal(), &required).map_err(|e| {
        tracing::debug!(user = %principal.user_id(), %required, "authorization denied");
        ApiError::Forbidden(e.to_string())
    })
}
