use crate::database::models::{from_item, to_item, Role, ROLES_TABLE};
use crate::database::DatabaseError;
use crate::store::{AttributeValue, KeyMap, StoreHandle};

/// Role records in the Roles table, keyed by `roleId`
#[derive(Clone)]
pub struct RoleRepository {
    store: StoreHandle,
}

fn role_key(role_id: &str) -> KeyMap {
    KeyMap::from([("roleId".to_string(), AttributeValue::from(role_id))])
}

impl RoleRepository {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    pub async fn find_by_id(&self, role_id: &str) -> Result<Option<Role>, DatabaseError> {
        match self.store.get_item(ROLES_TABLE, &role_key(role_id)).await? {
            Some(item) => Ok(Some(from_item(item)?)),
            None => Ok(None),
        }
    }

    /// Scan for a role with exactly this name
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Role>, DatabaseError> {
        Ok(self.list_all().await?.into_iter().find(|r| r.name == name))
    }

    pub async fn list_all(&self) -> Result<Vec<Role>, DatabaseError> {
        self.store
            .scan(ROLES_TABLE)
            .await?
            .into_iter()
            .map(|item| from_item(item).map_err(DatabaseError::from))
            .collect()
    }

    pub async fn create(&self, role: &Role) -> Result<(), DatabaseError> {
        if self.find_by_id(&role.role_id).await?.is_some() {
            return Err(DatabaseError::AlreadyExists(role.role_id.clone()));
        }
        self.store.put_item(ROLES_TABLE, to_item(role)?).await?;
        Ok(())
    }

    pub async fn update(&self, role: &mut Role) -> Result<(), DatabaseError> {
        role.touch();
        self.store.put_item(ROLES_TABLE, to_item(role)?).await?;
        Ok(())
    }

    pub async fn delete(&self, role_id: &str) -> Result<(), DatabaseError> {
        self.store.delete_item(ROLES_TABLE, &role_key(role_id)).await?;
        Ok(())
    }
}
