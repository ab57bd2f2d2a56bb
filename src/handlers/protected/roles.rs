use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::models::Role;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{CreateRoleRequest, UpdateRoleRequest};

/// GET /role - All roles, by name
pub async fn roles_get(State(state): State<AppState>) -> ApiResult<Vec<Role>> {
    Ok(ApiResponse::success(state.roles.list().await?))
}

/// GET /role/:role_id
pub async fn role_get(
    State(state): State<AppState>,
    Path(role_id): Path<String>,
) -> ApiResult<Role> {
    Ok(ApiResponse::success(state.roles.get(&role_id).await?))
}

/// POST /role - Create a custom role
pub async fn role_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CreateRoleRequest>, JsonRejection>,
) -> ApiResult<Role> {
    let Json(request) = payload?;
    let role = state.roles.create(request, Some(user.user_id)).await?;
    Ok(ApiResponse::created(role))
}

/// PUT /role/:role_id - Update a custom role; system roles are read-only
pub async fn role_put(
    State(state): State<AppState>,
    Path(role_id): Path<String>,
    payload: Result<Json<UpdateRoleRequest>, JsonRejection>,
) -> ApiResult<Role> {
    let Json(request) = payload?;
    Ok(ApiResponse::success(state.roles.update(&role_id, request).await?))
}

/// DELETE /role/:role_id - Only custom roles nobody holds
pub async fn role_delete(
    State(state): State<AppState>,
    Path(role_id): Path<String>,
) -> ApiResult<Value> {
    state.roles.delete(&role_id).await?;
    Ok(ApiResponse::success(json!({ "id": role_id, "deleted": true })))
}
