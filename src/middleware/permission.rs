use std::collections::HashMap;

use axum::{
    extract::{Path, Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::app::AppState;
use crate::database::models::{is_system_table, Action, ROLES_TABLE, USERS_TABLE};
use crate::error::ApiError;
use crate::middleware::AuthUser;

/// Path parameter naming the target table on item routes
pub const TABLE_PARAM: &str = "table_name";

/// Reads are views, writes are edits
pub fn action_for(method: &Method) -> Action {
    match *method {
        Method::DELETE => Action::Delete,
        Method::POST | Method::PUT | Method::PATCH => Action::Edit,
        _ => Action::View,
    }
}

async fn enforce(
    state: &AppState,
    table_name: &str,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("Authorization token required"))?;
    let action = action_for(request.method());

    let permission = state
        .permissions
        .effective_permission(&user.role_ids, table_name)
        .await?;

    if !permission.allows(action) {
        warn!(
            "Denied {} on {} for user {}",
            action, table_name, user.username
        );
        return Err(ApiError::forbidden(format!(
            "You do not have permission to {} on table '{}'",
            action, table_name
        )));
    }

    debug!("Allowed {} on {} for user {}", action, table_name, user.username);
    Ok(next.run(request).await)
}

/// Gate for `/table/:table_name/...` routes
pub async fn require_table_permission(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let table_name = params
        .get(TABLE_PARAM)
        .ok_or_else(|| ApiError::bad_request("Table name is required"))?;

    if is_system_table(table_name) {
        warn!(
            "Refused {} on system table {} through item routes",
            request.method(),
            table_name
        );
        return Err(ApiError::forbidden(format!(
            "Table '{}' is managed through its own endpoints",
            table_name
        )));
    }

    enforce(&state, table_name, request, next).await
}

/// Gate for user management, governed by the Users table grant
pub async fn require_users_permission(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    enforce(&state, USERS_TABLE, request, next).await
}

/// Gate for role management, governed by the Roles table grant
pub async fn require_roles_permission(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    enforce(&state, ROLES_TABLE, request, next).await
}
