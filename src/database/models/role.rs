use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ADMIN_ROLE_ID;

static ROLE_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9 _-]+$").expect("role name pattern compiles"));

pub const ROLE_NAME_MIN_LEN: usize = 3;
pub const ROLE_NAME_MAX_LEN: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoleType {
    Admin,
    Custom,
}

/// What a role allows on one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TablePermission {
    pub table_name: String,
    #[serde(default)]
    pub allowed_view: bool,
    #[serde(default)]
    pub allowed_edit: bool,
    #[serde(default)]
    pub allowed_delete: bool,
}

impl TablePermission {
    pub fn new(table_name: impl Into<String>, view: bool, edit: bool, delete: bool) -> Self {
        Self {
            table_name: table_name.into(),
            allowed_view: view,
            allowed_edit: edit,
            allowed_delete: delete,
        }
    }

    pub fn grants_anything(&self) -> bool {
        self.allowed_view || self.allowed_edit || self.allowed_delete
    }
}

/// Table-level actions gated by permissions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Edit,
    Delete,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::View => write!(f, "view"),
            Action::Edit => write!(f, "edit"),
            Action::Delete => write!(f, "delete"),
        }
    }
}

/// The view/edit/delete triple a user ends up with on one table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectivePermission {
    pub allowed_view: bool,
    pub allowed_edit: bool,
    pub allowed_delete: bool,
}

impl EffectivePermission {
    pub const NONE: Self = Self {
        allowed_view: false,
        allowed_edit: false,
        allowed_delete: false,
    };

    pub const FULL: Self = Self {
        allowed_view: true,
        allowed_edit: true,
        allowed_delete: true,
    };

    pub fn allows(&self, action: Action) -> bool {
        match action {
            Action::View => self.allowed_view,
            Action::Edit => self.allowed_edit,
            Action::Delete => self.allowed_delete,
        }
    }

    /// OR another role's grant into this one
    pub fn merge(&mut self, other: EffectivePermission) {
        self.allowed_view |= other.allowed_view;
        self.allowed_edit |= other.allowed_edit;
        self.allowed_delete |= other.allowed_delete;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub role_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub role_type: RoleType,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_is_custom")]
    pub is_custom: bool,
    #[serde(default)]
    pub permissions: Vec<TablePermission>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_is_custom() -> bool {
    true
}

impl Role {
    /// A custom role. Permissions are deduplicated per table, last one wins.
    pub fn custom(
        name: impl Into<String>,
        description: impl Into<String>,
        permissions: Vec<TablePermission>,
        created_by: Option<String>,
    ) -> Self {
        let now = Utc::now();
        let mut role = Self {
            role_id: format!("role_{}", Uuid::new_v4().simple()),
            name: name.into(),
            role_type: RoleType::Custom,
            description: description.into(),
            is_custom: true,
            permissions: Vec::new(),
            created_by,
            created_at: now,
            updated_at: now,
        };
        role.set_permissions(permissions);
        role
    }

    pub fn administrator() -> Self {
        let now = Utc::now();
        Self {
            role_id: ADMIN_ROLE_ID.to_string(),
            name: "Administrator".to_string(),
            role_type: RoleType::Admin,
            description: "Full system access".to_string(),
            is_custom: false,
            // Access is implicit; the list is never consulted
            permissions: Vec::new(),
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role_type == RoleType::Admin
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn permission_for(&self, table_name: &str) -> Option<&TablePermission> {
        self.permissions.iter().find(|p| p.table_name == table_name)
    }

    /// Add or replace the entry for `permission.table_name`
    pub fn add_permission(&mut self, permission: TablePermission) {
        self.permissions.retain(|p| p.table_name != permission.table_name);
        self.permissions.push(permission);
        self.touch();
    }

    /// Replace the whole permission list, keeping one entry per table
    pub fn set_permissions(&mut self, permissions: Vec<TablePermission>) {
        self.permissions.clear();
        for permission in permissions {
            self.add_permission(permission);
        }
        self.touch();
    }

    /// What this role alone grants on `table_name`
    pub fn grant_on(&self, table_name: &str) -> EffectivePermission {
        if self.is_admin() {
            return EffectivePermission::FULL;
        }
        self.permission_for(table_name)
            .map_or(EffectivePermission::NONE, |p| EffectivePermission {
                allowed_view: p.allowed_view,
                allowed_edit: p.allowed_edit,
                allowed_delete: p.allowed_delete,
            })
    }

    /// 3–50 characters of letters, digits, spaces, hyphens and underscores
    pub fn validate_name(name: &str) -> Result<(), String> {
        if name.trim().is_empty() {
            return Err("Role name cannot be empty".to_string());
        }
        let len = name.chars().count();
        if len < ROLE_NAME_MIN_LEN {
            return Err(format!("Role name must be at least {} characters", ROLE_NAME_MIN_LEN));
        }
        if len > ROLE_NAME_MAX_LEN {
            return Err(format!("Role name must be at most {} characters", ROLE_NAME_MAX_LEN));
        }
        if !ROLE_NAME_PATTERN.is_match(name) {
            return Err(
                "Role name can only contain letters, numbers, spaces, hyphens and underscores"
                    .to_string(),
            );
        }
        Ok(())
    }
}
