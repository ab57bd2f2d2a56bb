use crate::database::models::{from_item, to_item, User, USERS_TABLE};
use crate::database::DatabaseError;
use crate::store::{AttributeValue, KeyMap, StoreHandle};

/// User records in the Users table, keyed by `userId`
#[derive(Clone)]
pub struct UserRepository {
    store: StoreHandle,
}

fn user_key(user_id: &str) -> KeyMap {
    KeyMap::from([("userId".to_string(), AttributeValue::from(user_id))])
}

impl UserRepository {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    pub async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, DatabaseError> {
        match self.store.get_item(USERS_TABLE, &user_key(user_id)).await? {
            Some(item) => Ok(Some(from_item(item)?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.list_all().await?.into_iter().find(|u| u.username == username))
    }

    /// Every user whose role list contains `role_id`
    pub async fn find_by_role(&self, role_id: &str) -> Result<Vec<User>, DatabaseError> {
        Ok(self
            .list_all()
            .await?
            .into_iter()
            .filter(|u| u.has_role(role_id))
            .collect())
    }

    pub async fn list_all(&self) -> Result<Vec<User>, DatabaseError> {
        self.store
            .scan(USERS_TABLE)
            .await?
            .into_iter()
            .map(|item| from_item(item).map_err(DatabaseError::from))
            .collect()
    }

    pub async fn create(&self, user: &User) -> Result<(), DatabaseError> {
        if self.find_by_id(&user.user_id).await?.is_some() {
            return Err(DatabaseError::AlreadyExists(user.user_id.clone()));
        }
        self.store.put_item(USERS_TABLE, to_item(user)?).await?;
        Ok(())
    }

    pub async fn update(&self, user: &mut User) -> Result<(), DatabaseError> {
        user.touch();
        self.store.put_item(USERS_TABLE, to_item(user)?).await?;
        Ok(())
    }

    pub async fn delete(&self, user_id: &str) -> Result<(), DatabaseError> {
        self.store.delete_item(USERS_TABLE, &user_key(user_id)).await?;
        Ok(())
    }
}
