use tracing::debug;

use crate::database::models::{from_item, to_item, Token, TOKENS_TABLE};
use crate::database::DatabaseError;
use crate::store::{AttributeValue, KeyMap, StoreHandle};

/// Token records in the Tokens table, keyed by `userId` + `token`
#[derive(Clone)]
pub struct TokenRepository {
    store: StoreHandle,
}

fn token_key(user_id: &str, token: &str) -> KeyMap {
    KeyMap::from([
        ("userId".to_string(), AttributeValue::from(user_id)),
        ("token".to_string(), AttributeValue::from(token)),
    ])
}

impl TokenRepository {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    pub async fn create(&self, token: &Token) -> Result<(), DatabaseError> {
        self.store.put_item(TOKENS_TABLE, to_item(token)?).await?;
        Ok(())
    }

    /// Live token record for this user, if any. Expired records count as absent.
    pub async fn find(&self, user_id: &str, token: &str) -> Result<Option<Token>, DatabaseError> {
        let Some(item) = self.store.get_item(TOKENS_TABLE, &token_key(user_id, token)).await? else {
            return Ok(None);
        };
        let record: Token = from_item(item)?;
        Ok((!record.is_expired()).then_some(record))
    }

    /// All records for a user, expired ones included
    pub async fn find_by_user(&self, user_id: &str) -> Result<Vec<Token>, DatabaseError> {
        let mut tokens = Vec::new();
        for item in self.store.scan(TOKENS_TABLE).await? {
            let record: Token = from_item(item)?;
            if record.user_id == user_id {
                tokens.push(record);
            }
        }
        Ok(tokens)
    }

    pub async fn delete(&self, user_id: &str, token: &str) -> Result<(), DatabaseError> {
        self.store.delete_item(TOKENS_TABLE, &token_key(user_id, token)).await?;
        Ok(())
    }

    pub async fn delete_all_for_user(&self, user_id: &str) -> Result<usize, DatabaseError> {
        let tokens = self.find_by_user(user_id).await?;
        for record in &tokens {
            self.delete(user_id, &record.token).await?;
        }
        Ok(tokens.len())
    }

    /// Remove this user's expired records; returns how many were removed
    pub async fn delete_expired_for_user(&self, user_id: &str) -> Result<usize, DatabaseError> {
        let mut removed = 0;
        for record in self.find_by_user(user_id).await? {
            if record.is_expired() {
                self.delete(user_id, &record.token).await?;
                removed += 1;
            }
        }
        if removed > 0 {
            debug!("Swept {} expired tokens for user {}", removed, user_id);
        }
        Ok(removed)
    }
}
