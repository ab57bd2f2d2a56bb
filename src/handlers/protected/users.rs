use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::models::PublicUser;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{ChangePasswordRequest, CreateUserRequest, UpdateUserRequest};

/// GET /user - All users, by username
pub async fn users_get(State(state): State<AppState>) -> ApiResult<Vec<PublicUser>> {
    let users = state.users.list().await?;
    Ok(ApiResponse::success(users.iter().map(|u| u.to_public()).collect()))
}

/// GET /user/:user_id
pub async fn user_get(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<PublicUser> {
    Ok(ApiResponse::success(state.users.get(&user_id).await?.to_public()))
}

/// POST /user - Create a user holding at least one existing role
pub async fn user_post(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<PublicUser> {
    let Json(request) = payload?;
    let user = state.users.create(request).await?;
    Ok(ApiResponse::created(user.to_public()))
}

/// PUT /user/:user_id - Update username, name or roles
pub async fn user_put(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<PublicUser> {
    let Json(request) = payload?;
    let user = state.users.update(&user_id, request).await?;
    Ok(ApiResponse::success(user.to_public()))
}

/// PUT /user/:user_id/password
pub async fn user_password_put(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(request) = payload?;
    state.users.change_password(&user_id, request).await?;
    Ok(ApiResponse::success(json!({ "message": "Password updated" })))
}

/// DELETE /user/:user_id - Delete and revoke the user's tokens
pub async fn user_delete(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Value> {
    state.users.delete(&user_id).await?;
    Ok(ApiResponse::success(json!({ "id": user_id, "deleted": true })))
}
