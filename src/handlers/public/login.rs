use axum::{extract::State, Json};
use axum::extract::rejection::JsonRejection;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{LoginRequest, LoginResponse};

/// POST /login - Exchange username and password for a bearer token
///
/// Unknown usernames and wrong passwords get the same 401 so the endpoint
/// can't be used to enumerate accounts.
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(request) = payload?;
    let session = state.auth.login(request).await?;
    Ok(ApiResponse::success(session))
}
