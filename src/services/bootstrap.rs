use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::auth::hash_password;
use crate::config::BootstrapConfig;
use crate::database::models::{
    Role, User, ADMIN_ROLE_ID, ADMIN_USER_ID, ROLES_TABLE, TOKENS_TABLE, USERS_TABLE,
};
use crate::database::{RoleRepository, UserRepository};
use crate::store::{Item, KeyAttribute, KeySchema, StoreError, StoreHandle};

/// Extra tables to load at startup
#[derive(Debug, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub tables: Vec<FixtureTable>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureTable {
    pub name: String,
    pub partition_key: KeyAttribute,
    pub sort_key: Option<KeyAttribute>,
    #[serde(default)]
    pub items: Vec<Item>,
}

fn system_tables() -> [(&'static str, KeySchema); 3] {
    [
        (USERS_TABLE, KeySchema::simple(KeyAttribute::string("userId"))),
        (ROLES_TABLE, KeySchema::simple(KeyAttribute::string("roleId"))),
        (
            TOKENS_TABLE,
            KeySchema::composite(KeyAttribute::string("userId"), KeyAttribute::string("token")),
        ),
    ]
}

async fn ensure_table(store: &StoreHandle, name: &str, schema: KeySchema) -> Result<bool> {
    match store.create_table(name, schema).await {
        Ok(()) => {
            info!("Created table {}", name);
            Ok(true)
        }
        Err(StoreError::TableExists(_)) => Ok(false),
        Err(e) => Err(e).with_context(|| format!("creating table {}", name)),
    }
}

/// Make sure the system tables, the administrator role and the administrator
/// account exist. Existing records are left untouched.
pub async fn ensure_system(store: &StoreHandle, config: &BootstrapConfig, bcrypt_cost: u32) -> Result<()> {
    for (name, schema) in system_tables() {
        ensure_table(store, name, schema).await?;
    }

    let roles = RoleRepository::new(store.clone());
    if roles.find_by_id(ADMIN_ROLE_ID).await?.is_none() {
        roles.create(&Role::administrator()).await?;
        info!("Seeded administrator role");
    }

    let users = UserRepository::new(store.clone());
    if users.find_by_id(ADMIN_USER_ID).await?.is_none() {
        let hash = hash_password(&config.admin_password, bcrypt_cost)
            .await
            .context("hashing administrator password")?;
        let mut admin = User::new(
            &config.admin_username,
            &config.admin_name,
            hash,
            vec![ADMIN_ROLE_ID.to_string()],
        );
        admin.user_id = ADMIN_USER_ID.to_string();
        users.create(&admin).await?;
        info!("Seeded administrator account {}", config.admin_username);
    }

    Ok(())
}

/// Create the fixture's tables (when missing) and upsert its items
pub async fn load_fixture(store: &StoreHandle, fixture: Fixture) -> Result<()> {
    for table in fixture.tables {
        let schema = match table.sort_key {
            Some(sort_key) => KeySchema::composite(table.partition_key, sort_key),
            None => KeySchema::simple(table.partition_key),
        };
        ensure_table(store, &table.name, schema).await?;

        let count = table.items.len();
        for item in table.items {
            store
                .put_item(&table.name, item)
                .await
                .with_context(|| format!("loading fixture item into {}", table.name))?;
        }
        info!("Loaded {} fixture item(s) into {}", count, table.name);
    }
    Ok(())
}

pub async fn load_fixture_file(store: &StoreHandle, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading fixture {}", path.display()))?;
    let fixture: Fixture = serde_json::from_str(&raw)
        .with_context(|| format!("parsing fixture {}", path.display()))?;
    load_fixture(store, fixture).await
}

/// Everything the server needs before it starts accepting requests
pub async fn run(store: &StoreHandle, config: &BootstrapConfig, bcrypt_cost: u32) -> Result<()> {
    ensure_system(store, config, bcrypt_cost).await?;
    if let Some(path) = &config.fixture_path {
        load_fixture_file(store, path).await?;
    }
    Ok(())
}
