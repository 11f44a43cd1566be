use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::app::AppState;
use crate::database::models::ContactResponse;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::paging::PageResult;

use super::{json_body, query_params};

/// POST /api/contacts
pub async fn create(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<ContactResponse> {
    let input = json_body(body)?;
    let contact = state.contacts.create(&user, &input).await?;
    Ok(ApiResponse::success(contact))
}

/// GET /api/contacts?name=&email=&phone=&page=&size=
pub async fn search(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> ApiResult<PageResult<ContactResponse>> {
    let params = query_params(query)?;
    let input: Map<String, Value> = params.into_iter().map(|(k, v)| (k, Value::String(v))).collect();
    let page = state.contacts.search(&user, &Value::Object(input)).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/contacts/:contact_id
pub async fn get(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(contact_id): Path<String>,
) -> ApiResult<ContactResponse> {
    let contact = state.contacts.get(&user, &contact_id).await?;
    Ok(ApiResponse::success(contact))
}

/// PUT /api/contacts/:contact_id
pub async fn update(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(contact_id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<ContactResponse> {
    let input = json_body(body)?;
    let contact = state.contacts.update(&user, &contact_id, input).await?;
    Ok(ApiResponse::success(contact))
}

/// DELETE /api/contacts/:contact_id
pub async fn delete(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(contact_id): Path<String>,
) -> ApiResult<bool> {
    let deleted = state.contacts.delete(&user, &contact_id).await?;
    Ok(ApiResponse::success(deleted))
}
