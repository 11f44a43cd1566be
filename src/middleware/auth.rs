use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::database::models::User;
use crate::error::ApiError;
use crate::services::ServiceError;

/// Authenticated user resolved from the request's session token
#[derive(Clone, Debug)]
pub struct AuthUser(pub User);

/// Token authentication middleware that resolves the live session and injects the user
pub async fn token_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let credential = match request.headers().get(AUTHORIZATION) {
        Some(value) => Some(value.to_str().map_err(|_| ServiceError::InvalidCredential)?),
        None => None,
    };

    let user = state.auth.authenticate(credential).await?;
    tracing::debug!("Authenticated request for '{}'", user.username);

    request.extensions_mut().insert(AuthUser(user));
    Ok(next.run(request).await)
}
