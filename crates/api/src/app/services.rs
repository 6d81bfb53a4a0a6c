//! Infrastructure wiring: which record store backs the API.

use std::collections::BTreeSet;
use std::sync::Arc;

use wms_auth::{Permission, Role};
use wms_core::{Pagination, query::MAX_PAGE_LIMIT};
use wms_infra::{
    AuditedRepository, InMemoryRecordStore, PostgresRecordStore, RecordStore, RepositoryError,
};
use wms_warehouse::access::RoleFilter;
use wms_warehouse::{PermissionRecord, Resource, RoleRecord};

use crate::authz;
use crate::config::ApiConfig;

/// Shared application services handed to every handler.
pub struct AppServices {
    store: Arc<dyn RecordStore>,
    default_page_limit: u32,
}

impl AppServices {
    pub fn new(store: Arc<dyn RecordStore>, default_page_limit: u32) -> Self {
        Self {
            store,
            default_page_limit,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryRecordStore::new()), wms_core::query::DEFAULT_PAGE_LIMIT)
    }

    pub fn repository<R: Resource>(&self) -> AuditedRepository<R> {
        AuditedRepository::new(self.store.clone())
    }

    pub fn default_page_limit(&self) -> u32 {
        self.default_page_limit
    }

    /// Effective permissions for a token's roles.
    ///
    /// Built-in roles come from the static policy; any other role name is
    /// looked up among stored roles and contributes its permissions.
    pub async fn resolve_permissions(
        &self,
        roles: &[Role],
    ) -> Result<Vec<Permission>, RepositoryError> {
        let mut granted: BTreeSet<Permission> = BTreeSet::new();

        for role in roles {
            match authz::builtin_role_permissions(role.as_str()) {
                Some(perms) => granted.extend(perms),
                None => granted.extend(self.stored_role_permissions(role).await?),
            }
        }

        Ok(granted.into_iter().collect())
    }

    async fn stored_role_permissions(&self, role: &Role) -> Result<Vec<Permission>, RepositoryError> {
        let filter = RoleFilter {
            name: Some(role.as_str().to_string()),
        };
        let page = self
            .repository::<RoleRecord>()
            .list(&filter, Pagination { limit: 1, offset: 0 })
            .await?;
        let Some(stored) = page.items.into_iter().next() else {
            return Ok(Vec::new());
        };

        let permissions = self.repository::<PermissionRecord>();
        let mut out = Vec::with_capacity(stored.body.permission_ids.len());
        for id in stored.body.permission_ids.iter().take(MAX_PAGE_LIMIT as usize) {
            match permissions.get(*id).await {
                Ok(record) => out.push(Permission::new(record.body.name)),
                // Dangling id on the stored role; it grants nothing.
                Err(RepositoryError::Domain(wms_core::DomainError::NotFound)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(out)
    }
}

/// Build services from configuration: Postgres when `DATABASE_URL` is set.
pub async fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    let store: Arc<dyn RecordStore> = match &config.database_url {
        Some(url) => {
            tracing::info!("using postgres record store");
            Arc::new(PostgresRecordStore::connect(url, config.db_max_connections).await?)
        }
        None => {
            tracing::info!("using in-memory record store");
            Arc::new(InMemoryRecordStore::new())
        }
    };
    Ok(AppServices::new(store, config.default_page_limit))
}
