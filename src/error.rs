// HTTP API Error Types
use axum::{extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::auth::{JwtError, PasswordError};
use crate::database::item_id::CodecError;
use crate::database::{DatabaseError, TableError};
use crate::services::{AuthError, RoleError, UserError};
use crate::store::StoreError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },
    InvalidJson(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationError { .. } => 400,
            ApiError::InvalidJson(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::InvalidJson(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "success": false,
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        });

        if let ApiError::ValidationError {
            field_errors: Some(field_errors),
            ..
        } = self
        {
            response["field_errors"] = json!(field_errors);
        }

        response
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(
        message: impl Into<String>,
        field_errors: Option<HashMap<String, String>>,
    ) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::TableNotFound(table) => {
                ApiError::not_found(format!("Table '{}' not found", table))
            }
            StoreError::TableExists(table) => {
                ApiError::conflict(format!("Table '{}' already exists", table))
            }
            StoreError::InvalidKey { .. } => ApiError::bad_request(err.to_string()),
            StoreError::Unavailable(msg) => {
                tracing::error!("Store unavailable: {}", msg);
                ApiError::service_unavailable("Store temporarily unavailable")
            }
            StoreError::Internal(msg) => {
                tracing::error!("Store error: {}", msg);
                ApiError::internal_server_error(msg)
            }
        }
    }
}

impl From<CodecError> for ApiError {
    fn from(err: CodecError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl From<TableError> for ApiError {
    fn from(err: TableError) -> Self {
        match err {
            TableError::EmptyPayload => ApiError::bad_request(err.to_string()),
            TableError::Codec(e) => e.into(),
            TableError::Store(e) => e.into(),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::AlreadyExists(id) => {
                ApiError::conflict(format!("Record already exists: {}", id))
            }
            DatabaseError::Malformed(e) => {
                tracing::error!("Malformed system record: {}", e);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            DatabaseError::Store(e) => e.into(),
        }
    }
}

impl From<RoleError> for ApiError {
    fn from(err: RoleError) -> Self {
        match err {
            RoleError::InvalidName(msg) => {
                let mut field_errors = HashMap::new();
                field_errors.insert("name".to_string(), msg.clone());
                ApiError::validation_error(msg, Some(field_errors))
            }
            RoleError::Validation(msg) => ApiError::validation_error(msg, None),
            RoleError::NotFound(_) => ApiError::not_found(err.to_string()),
            RoleError::DuplicateName(_) | RoleError::InUse { .. } => {
                ApiError::conflict(err.to_string())
            }
            RoleError::SystemRole => ApiError::forbidden(err.to_string()),
            RoleError::Database(e) => e.into(),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Validation(msg) => ApiError::validation_error(msg, None),
            UserError::NotFound(_) | UserError::RoleNotFound(_) => {
                ApiError::not_found(err.to_string())
            }
            UserError::UsernameTaken(_) => ApiError::conflict(err.to_string()),
            UserError::Protected(msg) => ApiError::forbidden(msg),
            UserError::Password(e) => e.into(),
            UserError::Database(e) => e.into(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => ApiError::bad_request(err.to_string()),
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::TokenRevoked
            | AuthError::UserNotFound => ApiError::unauthorized(err.to_string()),
            AuthError::Jwt(e) => e.into(),
            AuthError::Password(e) => e.into(),
            AuthError::Database(e) => e.into(),
        }
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::InvalidToken(_) => ApiError::unauthorized("Invalid or expired token"),
            JwtError::TokenGeneration(_) | JwtError::InvalidSecret => {
                tracing::error!("JWT error: {}", err);
                ApiError::internal_server_error("Failed to issue token")
            }
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        tracing::error!("Password hashing error: {}", err);
        ApiError::internal_server_error("An error occurred while processing your request")
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_json(rejection.body_text())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_faults_map_to_distinct_statuses() {
        assert_eq!(ApiError::from(StoreError::TableNotFound("t".into())).status_code(), 404);
        assert_eq!(
            ApiError::from(StoreError::InvalidKey {
                table: "t".into(),
                message: "missing".into()
            })
            .status_code(),
            400
        );
        let internal = ApiError::from(StoreError::Internal("disk on fire".into()));
        assert_eq!(internal.status_code(), 500);
        assert_eq!(internal.message(), "disk on fire");
        assert_eq!(ApiError::from(StoreError::Unavailable("x".into())).status_code(), 503);
    }

    #[test]
    fn auth_denials_are_unauthorized() {
        for err in [
            AuthError::MissingToken,
            AuthError::InvalidToken,
            AuthError::TokenRevoked,
            AuthError::UserNotFound,
        ] {
            assert_eq!(ApiError::from(err).status_code(), 401);
        }

        let credentials = ApiError::from(AuthError::InvalidCredentials);
        assert_eq!(credentials.message(), "Invalid username or password");
    }

    #[test]
    fn role_rules_map_to_conflict_and_forbidden() {
        assert_eq!(ApiError::from(RoleError::SystemRole).status_code(), 403);
        assert_eq!(
            ApiError::from(RoleError::InUse {
                role_id: "r".into(),
                users: 2
            })
            .status_code(),
            409
        );
        let invalid = ApiError::from(RoleError::InvalidName("too short".into()));
        assert_eq!(invalid.to_json()["field_errors"]["name"], "too short");
    }

    #[test]
    fn error_body_shape() {
        let body = ApiError::not_found("Item not found").to_json();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], true);
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["message"], "Item not found");
    }
}
