use std::collections::BTreeSet;

use serde::Deserialize;
use tracing::{info, warn};

use crate::auth::{hash_password, PasswordError};
use crate::database::models::{User, ADMIN_USER_ID};
use crate::database::{DatabaseError, RoleRepository, TokenRepository, UserRepository};
use crate::store::StoreHandle;

pub const PASSWORD_MIN_LEN: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("{0}")]
    Validation(String),
    #[error("User not found: {0}")]
    NotFound(String),
    #[error("Role not found: {0}")]
    RoleNotFound(String),
    #[error("Username already exists: {0}")]
    UsernameTaken(String),
    #[error("{0}")]
    Protected(String),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub role_ids: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub name: Option<String>,
    pub role_ids: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub new_password: Option<String>,
}

fn required(value: Option<String>, field: &str) -> Result<String, UserError> {
    let value = value.unwrap_or_default().trim().to_string();
    if value.is_empty() {
        return Err(UserError::Validation(format!("{} is required", field)));
    }
    Ok(value)
}

fn check_password(password: &str) -> Result<(), UserError> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(UserError::Validation(format!(
            "Password must be at least {} characters",
            PASSWORD_MIN_LEN
        )));
    }
    Ok(())
}

/// User management rules on top of the Users table
#[derive(Clone)]
pub struct UserService {
    users: UserRepository,
    roles: RoleRepository,
    tokens: TokenRepository,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(store: StoreHandle, bcrypt_cost: u32) -> Self {
        Self {
            users: UserRepository::new(store.clone()),
            roles: RoleRepository::new(store.clone()),
            tokens: TokenRepository::new(store),
            bcrypt_cost,
        }
    }

    pub async fn list(&self) -> Result<Vec<User>, UserError> {
        let mut users = self.users.list_all().await?;
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    pub async fn get(&self, user_id: &str) -> Result<User, UserError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| UserError::NotFound(user_id.to_string()))
    }

    pub async fn create(&self, request: CreateUserRequest) -> Result<User, UserError> {
        let username = required(request.username, "Username")?;
        let name = required(request.name, "Name")?;
        let password = request.password.unwrap_or_default();
        check_password(&password)?;
        let role_ids = self.checked_roles(request.role_ids).await?;

        if self.users.find_by_username(&username).await?.is_some() {
            return Err(UserError::UsernameTaken(username));
        }

        let password_hash = hash_password(&password, self.bcrypt_cost).await?;
        let user = User::new(username, name, password_hash, role_ids);
        self.users.create(&user).await?;
        info!("Created user {} ({})", user.username, user.user_id);
        Ok(user)
    }

    pub async fn update(&self, user_id: &str, request: UpdateUserRequest) -> Result<User, UserError> {
        let mut user = self.get(user_id).await?;

        if let Some(username) = request.username {
            let username = required(Some(username), "Username")?;
            if username != user.username {
                if self.users.find_by_username(&username).await?.is_some() {
                    return Err(UserError::UsernameTaken(username));
                }
                user.username = username;
            }
        }

        if let Some(name) = request.name {
            user.name = required(Some(name), "Name")?;
        }

        if let Some(role_ids) = request.role_ids {
            let role_ids = self.checked_roles(role_ids).await?;
            let unchanged =
                role_ids.iter().collect::<BTreeSet<_>>() == user.role_ids.iter().collect::<BTreeSet<_>>();
            if user.user_id == ADMIN_USER_ID && !unchanged {
                warn!("Rejected role change on the administrator account");
                return Err(UserError::Protected(
                    "Administrator roles cannot be changed".to_string(),
                ));
            }
            user.role_ids = role_ids;
        }

        self.users.update(&mut user).await?;
        Ok(user)
    }

    pub async fn change_password(
        &self,
        user_id: &str,
        request: ChangePasswordRequest,
    ) -> Result<(), UserError> {
        let password = request.new_password.unwrap_or_default();
        check_password(&password)?;

        let mut user = self.get(user_id).await?;
        user.password_hash = hash_password(&password, self.bcrypt_cost).await?;
        self.users.update(&mut user).await?;
        info!("Password changed for user {}", user_id);
        Ok(())
    }

    /// Delete a user and revoke every token they hold
    pub async fn delete(&self, user_id: &str) -> Result<(), UserError> {
        if user_id == ADMIN_USER_ID {
            warn!("Rejected delete of the administrator account");
            return Err(UserError::Protected(
                "Administrator account cannot be deleted".to_string(),
            ));
        }

        let user = self.get(user_id).await?;
        let revoked = self.tokens.delete_all_for_user(user_id).await?;
        self.users.delete(user_id).await?;
        info!(
            "Deleted user {} ({}), revoked {} token(s)",
            user.username, user_id, revoked
        );
        Ok(())
    }

    /// Deduplicated role ids, at least one, all existing
    async fn checked_roles(&self, role_ids: Vec<String>) -> Result<Vec<String>, UserError> {
        let mut seen = BTreeSet::new();
        let role_ids: Vec<String> = role_ids
            .into_iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty() && seen.insert(r.clone()))
            .collect();

        if role_ids.is_empty() {
            return Err(UserError::Validation("At least one role is required".to_string()));
        }
        for role_id in &role_ids {
            if self.roles.find_by_id(role_id).await?.is_none() {
                return Err(UserError::RoleNotFound(role_id.clone()));
            }
        }
        Ok(role_ids)
    }
}
