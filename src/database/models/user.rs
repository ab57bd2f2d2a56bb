use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ADMIN_ROLE_ID;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    pub username: String,
    pub name: String,
    /// bcrypt hash, never the plain password
    #[serde(rename = "password")]
    pub password_hash: String,
    #[serde(default)]
    pub role_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User as returned by the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub user_id: String,
    pub username: String,
    pub name: String,
    pub role_ids: Vec<String>,
    pub user_type: &'static str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        username: impl Into<String>,
        name: impl Into<String>,
        password_hash: impl Into<String>,
        role_ids: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id: format!("user_{}", Uuid::new_v4().simple()),
            username: username.into(),
            name: name.into(),
            password_hash: password_hash.into(),
            role_ids,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn has_role(&self, role_id: &str) -> bool {
        self.role_ids.iter().any(|r| r == role_id)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE_ID)
    }

    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            user_id: self.user_id.clone(),
            username: self.username.clone(),
            name: self.name.clone(),
            role_ids: self.role_ids.clone(),
            user_type: if self.is_admin() { "admin" } else { "user" },
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
