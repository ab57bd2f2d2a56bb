pub mod role;
pub mod token;
pub mod user;

pub use role::{Action, EffectivePermission, Role, RoleType, TablePermission};
pub use token::Token;
pub use user::{PublicUser, User};

use serde::{de::DeserializeOwned, Serialize};

use crate::store::{AttributeValue, Item};

/// System tables backing the console itself
pub const USERS_TABLE: &str = "Users";
pub const ROLES_TABLE: &str = "Roles";
pub const TOKENS_TABLE: &str = "Tokens";

/// Only reachable through their own services, never the generic item routes
pub const SYSTEM_TABLES: [&str; 3] = [USERS_TABLE, ROLES_TABLE, TOKENS_TABLE];

pub fn is_system_table(table_name: &str) -> bool {
    SYSTEM_TABLES.contains(&table_name)
}

/// The single administrator role; grants everything on every table
pub const ADMIN_ROLE_ID: &str = "admin";

/// The administrator account; its roles can't change and it can't be deleted
pub const ADMIN_USER_ID: &str = "user_admin_001";

/// Serialize an entity into a store item
pub fn to_item<T: Serialize>(entity: &T) -> Result<Item, serde_json::Error> {
    match AttributeValue::from(serde_json::to_value(entity)?) {
        AttributeValue::Map(map) => Ok(map),
        _ => Err(serde::ser::Error::custom("entity did not serialize to an object")),
    }
}

/// Deserialize a store item into an entity
pub fn from_item<T: DeserializeOwned>(item: Item) -> Result<T, serde_json::Error> {
    serde_json::from_value(serde_json::to_value(item)?)
}
