use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored session token. Presence in the Tokens table is what makes a
/// signed token usable; removing the record revokes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub user_id: String,
    pub token: String,
    pub id: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Token {
    pub fn new(user_id: impl Into<String>, token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            token: token.into(),
            id: format!("token_{}", Uuid::new_v4().simple()),
            expires_at,
            created_at: Utc::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn expiry() {
        assert!(!Token::new("u", "t", Utc::now() + Duration::hours(1)).is_expired());
        assert!(Token::new("u", "t", Utc::now() - Duration::seconds(1)).is_expired());
    }
}
