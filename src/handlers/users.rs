use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde_json::Value;

use crate::app::AppState;
use crate::database::models::UserResponse;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

use super::json_body;

/// POST /api/users - register a new account
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<UserResponse> {
    let input = json_body(body)?;
    let user = state.users.register(&input).await?;
    Ok(ApiResponse::success(user))
}

/// POST /api/users/login - exchange username and password for a session token
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<UserResponse> {
    let input = json_body(body)?;
    let user = state.auth.login(&input).await?;
    Ok(ApiResponse::success(user))
}

/// GET /api/users/current
pub async fn current(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> ApiResult<UserResponse> {
    Ok(ApiResponse::success(state.users.current(&user)))
}

/// PATCH /api/users/current - change name and/or password
pub async fn update(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<UserResponse> {
    let input = json_body(body)?;
    let updated = state.users.update(&user, &input).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/users/current - logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> ApiResult<bool> {
    state.auth.logout(&user).await?;
    Ok(ApiResponse::success(true))
}
