use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::auth::{generate_jwt, validate_jwt, verify_password, Claims, JwtError, PasswordError};
use crate::database::models::{PublicUser, Token};
use crate::database::{DatabaseError, TokenRepository, UserRepository};
use crate::store::StoreHandle;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Username and password are required")]
    MissingCredentials,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Authorization token required")]
    MissingToken,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Token has been revoked")]
    TokenRevoked,
    #[error("User not found")]
    UserNotFound,
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: PublicUser,
}

/// Caller identity resolved from a bearer token
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub user_id: String,
    pub username: String,
    pub name: String,
    pub role_ids: Vec<String>,
    #[serde(skip)]
    pub token: String,
}

/// Issues, resolves and revokes session tokens.
///
/// A token is only usable while its record is in the Tokens table, so logout
/// takes effect before the JWT itself expires.
#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    tokens: TokenRepository,
    jwt_secret: String,
    expiry_hours: u64,
}

impl AuthService {
    pub fn new(store: StoreHandle, jwt_secret: impl Into<String>, expiry_hours: u64) -> Self {
        Self {
            users: UserRepository::new(store.clone()),
            tokens: TokenRepository::new(store),
            jwt_secret: jwt_secret.into(),
            expiry_hours,
        }
    }

    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AuthError> {
        let username = request.username.unwrap_or_default().trim().to_string();
        let password = request.password.unwrap_or_default();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let Some(user) = self.users.find_by_username(&username).await? else {
            warn!("Login failed for unknown user {}", username);
            return Err(AuthError::InvalidCredentials);
        };
        if !verify_password(&password, &user.password_hash).await? {
            warn!("Login failed for user {}: wrong password", username);
            return Err(AuthError::InvalidCredentials);
        }

        let claims = Claims::new(&user.user_id, &user.username, self.expiry_hours);
        let token = generate_jwt(&claims, &self.jwt_secret)?;
        let expires_at = claims.expires_at();

        self.tokens
            .create(&Token::new(&user.user_id, &token, expires_at))
            .await?;
        self.tokens.delete_expired_for_user(&user.user_id).await?;

        info!("User {} logged in", user.username);
        Ok(LoginResponse {
            token,
            expires_at,
            user: user.to_public(),
        })
    }

    /// Walk a bearer token through signature, revocation and user checks
    pub async fn authenticate(&self, token: &str) -> Result<AuthUser, AuthError> {
        let claims = validate_jwt(token, &self.jwt_secret).map_err(|e| match e {
            JwtError::InvalidToken(reason) => {
                debug!("Rejected token: {}", reason);
                AuthError::InvalidToken
            }
            other => AuthError::Jwt(other),
        })?;

        if self.tokens.find(&claims.user_id, token).await?.is_none() {
            return Err(AuthError::TokenRevoked);
        }

        let user = self
            .users
            .find_by_id(&claims.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(AuthUser {
            user_id: user.user_id,
            username: user.username,
            name: user.name,
            role_ids: user.role_ids,
            token: token.to_string(),
        })
    }

    /// Remove the caller's token record
    pub async fn logout(&self, user: &AuthUser) -> Result<(), AuthError> {
        self.tokens.delete(&user.user_id, &user.token).await?;
        info!("User {} logged out", user.username);
        Ok(())
    }
}
