use std::collections::BTreeMap;

use tracing::debug;

use crate::database::models::{EffectivePermission, Role, ADMIN_ROLE_ID};
use crate::database::{DatabaseError, RoleRepository};
use crate::store::StoreHandle;

/// Effective view/edit/delete access per table for a set of roles.
///
/// Every route gate and the "my permissions" listing go through here, so
/// admin handling and OR-aggregation live in one place.
#[derive(Clone)]
pub struct PermissionAggregator {
    store: StoreHandle,
    roles: RoleRepository,
}

impl PermissionAggregator {
    pub fn new(store: StoreHandle) -> Self {
        Self {
            roles: RoleRepository::new(store.clone()),
            store,
        }
    }

    pub fn is_admin(role_ids: &[String]) -> bool {
        role_ids.iter().any(|r| r == ADMIN_ROLE_ID)
    }

    /// OR of every held role's grant on `table_name`.
    ///
    /// Holding the administrator role yields full access without looking up
    /// any role. Role ids that no longer resolve contribute nothing.
    pub async fn effective_permission(
        &self,
        role_ids: &[String],
        table_name: &str,
    ) -> Result<EffectivePermission, DatabaseError> {
        if Self::is_admin(role_ids) {
            return Ok(EffectivePermission::FULL);
        }

        let roles = self.load_roles(role_ids).await?;
        Ok(aggregate(&roles, table_name))
    }

    /// Effective permission for every table the store knows about
    pub async fn permission_map(
        &self,
        role_ids: &[String],
    ) -> Result<BTreeMap<String, EffectivePermission>, DatabaseError> {
        let tables = self.store.list_tables().await?;

        if Self::is_admin(role_ids) {
            return Ok(tables
                .into_iter()
                .map(|t| (t, EffectivePermission::FULL))
                .collect());
        }

        let roles = self.load_roles(role_ids).await?;
        Ok(tables
            .into_iter()
            .map(|t| {
                let permission = aggregate(&roles, &t);
                (t, permission)
            })
            .collect())
    }

    async fn load_roles(&self, role_ids: &[String]) -> Result<Vec<Role>, DatabaseError> {
        let mut roles = Vec::with_capacity(role_ids.len());
        for role_id in role_ids {
            match self.roles.find_by_id(role_id).await? {
                Some(role) => roles.push(role),
                None => debug!("Role {} referenced by a user no longer exists", role_id),
            }
        }
        Ok(roles)
    }
}

fn aggregate(roles: &[Role], table_name: &str) -> EffectivePermission {
    let mut effective = EffectivePermission::NONE;
    for role in roles {
        effective.merge(role.grant_on(table_name));
    }
    effective
}
