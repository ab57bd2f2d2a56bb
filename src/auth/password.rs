use bcrypt::{hash, verify};

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

/// Hash on the blocking pool; bcrypt is CPU-bound
pub async fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hash(password, cost).map_err(|e| PasswordError::Hashing(e.to_string())))
        .await
        .map_err(|e| PasswordError::Hashing(format!("Task join error: {}", e)))?
}

/// `Ok(false)` for a mismatch, `Err` only when the hash itself is unusable
pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, PasswordError> {
    let password = password.to_string();
    let password_hash = password_hash.to_string();
    tokio::task::spawn_blocking(move || {
        verify(password, &password_hash).map_err(|e| PasswordError::Hashing(e.to_string()))
    })
    .await
    .map_err(|e| PasswordError::Hashing(format!("Task join error: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_and_verify() {
        let hashed = hash_password("s3cret!", 4).await.unwrap();
        assert_ne!(hashed, "s3cret!");
        assert!(verify_password("s3cret!", &hashed).await.unwrap());
        assert!(!verify_password("wrong", &hashed).await.unwrap());
    }

    #[tokio::test]
    async fn garbage_hash_is_an_error() {
        assert!(verify_password("x", "not-a-bcrypt-hash").await.is_err());
    }
}
