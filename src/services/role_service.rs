use serde::Deserialize;
use tracing::{info, warn};

use crate::database::models::{Role, TablePermission};
use crate::database::{DatabaseError, RoleRepository, UserRepository};
use crate::store::StoreHandle;

#[derive(Debug, thiserror::Error)]
pub enum RoleError {
    #[error("{0}")]
    InvalidName(String),
    #[error("{0}")]
    Validation(String),
    #[error("Role not found: {0}")]
    NotFound(String),
    #[error("Role name already exists: {0}")]
    DuplicateName(String),
    #[error("System roles cannot be modified or deleted")]
    SystemRole,
    #[error("Role {role_id} is still assigned to {users} user(s)")]
    InUse { role_id: String, users: usize },
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// One table grant as sent by clients. Both the console's field names and
/// the SQL-flavoured aliases are accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionInput {
    #[serde(alias = "table")]
    pub table_name: String,
    #[serde(default, alias = "select")]
    pub allowed_view: bool,
    #[serde(default, alias = "insert")]
    pub allowed_edit: bool,
    #[serde(default, alias = "delete")]
    pub allowed_delete: bool,
}

impl From<PermissionInput> for TablePermission {
    fn from(input: PermissionInput) -> Self {
        TablePermission::new(
            input.table_name,
            input.allowed_view,
            input.allowed_edit,
            input.allowed_delete,
        )
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateRoleRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<PermissionInput>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateRoleRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub permissions: Option<Vec<PermissionInput>>,
}

/// Keep only grants that allow something
fn normalize(permissions: Vec<PermissionInput>) -> Vec<TablePermission> {
    permissions
        .into_iter()
        .filter(|p| !p.table_name.trim().is_empty())
        .map(TablePermission::from)
        .filter(TablePermission::grants_anything)
        .collect()
}

/// Role mutation rules on top of the Roles table
#[derive(Clone)]
pub struct RoleService {
    roles: RoleRepository,
    users: UserRepository,
}

impl RoleService {
    pub fn new(store: StoreHandle) -> Self {
        Self {
            roles: RoleRepository::new(store.clone()),
            users: UserRepository::new(store),
        }
    }

    pub async fn list(&self) -> Result<Vec<Role>, RoleError> {
        let mut roles = self.roles.list_all().await?;
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }

    pub async fn get(&self, role_id: &str) -> Result<Role, RoleError> {
        self.roles
            .find_by_id(role_id)
            .await?
            .ok_or_else(|| RoleError::NotFound(role_id.to_string()))
    }

    pub async fn create(
        &self,
        request: CreateRoleRequest,
        created_by: Option<String>,
    ) -> Result<Role, RoleError> {
        let name = request.name.unwrap_or_default().trim().to_string();
        Role::validate_name(&name).map_err(RoleError::InvalidName)?;

        let description = request.description.unwrap_or_default().trim().to_string();
        if description.is_empty() {
            return Err(RoleError::Validation("Role description is required".to_string()));
        }

        if self.roles.find_by_name(&name).await?.is_some() {
            return Err(RoleError::DuplicateName(name));
        }

        let role = Role::custom(name, description, normalize(request.permissions), created_by);
        self.roles.create(&role).await?;
        info!("Created role {} ({})", role.name, role.role_id);
        Ok(role)
    }

    pub async fn update(&self, role_id: &str, request: UpdateRoleRequest) -> Result<Role, RoleError> {
        let mut role = self.get(role_id).await?;
        if !role.is_custom {
            warn!("Rejected update of system role {}", role_id);
            return Err(RoleError::SystemRole);
        }

        if let Some(name) = request.name {
            let name = name.trim().to_string();
            if name != role.name {
                Role::validate_name(&name).map_err(RoleError::InvalidName)?;
                if self.roles.find_by_name(&name).await?.is_some() {
                    return Err(RoleError::DuplicateName(name));
                }
                role.name = name;
            }
        }

        if let Some(description) = request.description {
            let description = description.trim().to_string();
            if description.is_empty() {
                return Err(RoleError::Validation("Role description is required".to_string()));
            }
            role.description = description;
        }

        if let Some(permissions) = request.permissions {
            role.set_permissions(normalize(permissions));
        }

        self.roles.update(&mut role).await?;
        Ok(role)
    }

    /// Delete a custom role that no user holds
    pub async fn delete(&self, role_id: &str) -> Result<(), RoleError> {
        let role = self.get(role_id).await?;
        if !role.is_custom {
            warn!("Rejected delete of system role {}", role_id);
            return Err(RoleError::SystemRole);
        }

        let holders = self.users.find_by_role(role_id).await?;
        if !holders.is_empty() {
            return Err(RoleError::InUse {
                role_id: role_id.to_string(),
                users: holders.len(),
            });
        }

        self.roles.delete(role_id).await?;
        info!("Deleted role {} ({})", role.name, role_id);
        Ok(())
    }
}
