use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde_json::Value;

use crate::app::AppState;
use crate::database::models::AddressResponse;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

use super::json_body;

/// POST /api/contacts/:contact_id/addresses
pub async fn create(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(contact_id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<AddressResponse> {
    let input = json_body(body)?;
    let address = state.addresses.create(&user, &contact_id, input).await?;
    Ok(ApiResponse::success(address))
}

/// GET /api/contacts/:contact_id/addresses
pub async fn list(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(contact_id): Path<String>,
) -> ApiResult<Vec<AddressResponse>> {
    let addresses = state.addresses.list(&user, &contact_id).await?;
    Ok(ApiResponse::success(addresses))
}

/// GET /api/contacts/:contact_id/addresses/:address_id
pub async fn get(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path((contact_id, address_id)): Path<(String, String)>,
) -> ApiResult<AddressResponse> {
    let address = state.addresses.get(&user, &contact_id, &address_id).await?;
    Ok(ApiResponse::success(address))
}

/// PUT /api/contacts/:contact_id/addresses/:address_id
pub async fn update(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path((contact_id, address_id)): Path<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<AddressResponse> {
    let input = json_body(body)?;
    let address = state.addresses.update(&user, &contact_id, &address_id, input).await?;
    Ok(ApiResponse::success(address))
}

/// DELETE /api/contacts/:contact_id/addresses/:address_id
pub async fn delete(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path((contact_id, address_id)): Path<(String, String)>,
) -> ApiResult<bool> {
    let deleted = state.addresses.delete(&user, &contact_id, &address_id).await?;
    Ok(ApiResponse::success(deleted))
}
