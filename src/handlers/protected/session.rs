use std::collections::BTreeMap;

use axum::{extract::State, Extension};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::models::{EffectivePermission, PublicUser};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /me - The caller's account, without the password hash
pub async fn me_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<PublicUser> {
    let account = state.users.get(&user.user_id).await?;
    Ok(ApiResponse::success(account.to_public()))
}

/// POST /logout - Revoke the token used for this request
pub async fn logout_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Value> {
    state.auth.logout(&user).await?;
    Ok(ApiResponse::success(json!({ "message": "Logged out" })))
}

/// GET /user/permissions - Effective view/edit/delete per table for the caller
pub async fn permissions_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<BTreeMap<String, EffectivePermission>> {
    let map = state.permissions.permission_map(&user.role_ids).await?;
    Ok(ApiResponse::success(map))
}
