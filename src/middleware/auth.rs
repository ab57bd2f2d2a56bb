use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::AuthError;

pub use crate::services::AuthUser;

/// AuthGate: resolves the bearer token to a live user and injects
/// [`AuthUser`] into the request extensions for downstream handlers.
///
/// A well-signed token is not enough on its own; its record must still be in
/// the token store and its user must still exist.
pub async fn auth_gate(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // Extract JWT from Authorization header
    let token = extract_jwt_from_headers(&headers).map_err(|e| {
        debug!("Rejected {} {}: {}", request.method(), request.uri().path(), e);
        ApiError::from(e)
    })?;

    let auth_user = state.auth.authenticate(&token).await.map_err(|e| {
        if matches!(
            e,
            AuthError::InvalidToken | AuthError::TokenRevoked | AuthError::UserNotFound
        ) {
            warn!("Rejected {} {}: {}", request.method(), request.uri().path(), e);
        }
        ApiError::from(e)
    })?;

    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, AuthError> {
    let auth_header = headers
        .get("authorization")
        .ok_or(AuthError::MissingToken)?;

    let auth_str = auth_header.to_str().map_err(|_| AuthError::InvalidToken)?;

    match auth_str.strip_prefix("Bearer ").map(str::trim) {
        Some("") => Err(AuthError::MissingToken),
        Some(token) => Ok(token.to_string()),
        None => Err(AuthError::InvalidToken),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_extraction() {
        assert_eq!(extract_jwt_from_headers(&headers("Bearer abc")).unwrap(), "abc");
        assert!(matches!(
            extract_jwt_from_headers(&headers("Basic abc")),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            extract_jwt_from_headers(&headers("Bearer   ")),
            Err(AuthError::MissingToken)
        ));
        assert!(matches!(
            extract_jwt_from_headers(&HeaderMap::new()),
            Err(AuthError::MissingToken)
        ));
    }
}
