pub mod addresses;
pub mod contacts;
pub mod users;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Query;
use axum::Json;
use serde_json::Value;

use crate::error::ApiError;

/// Unwrap a JSON body, turning extractor rejections into the API error envelope
pub(crate) fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(ApiError::invalid_json(rejection.body_text())),
    }
}

/// Unwrap query parameters; a malformed query string gets the same error envelope as a bad body
pub(crate) fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    match query {
        Ok(Query(params)) => Ok(params),
        Err(rejection) => Err(ApiError::bad_request(rejection.body_text())),
    }
}
