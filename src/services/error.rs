use thiserror::Error;

use crate::auth::password::SecretError;
use crate::database::DatabaseError;
use crate::validation::ValidationError;

/// Failure kinds of the request core. All are terminal for the request.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Authorization header is required")]
    MissingCredential,

    /// Token does not match any live session
    #[error("Unauthorized")]
    InvalidCredential,

    /// Login failure; identical for unknown username and wrong password
    #[error("Username or password is wrong")]
    InvalidCredentials,

    /// Absent, or owned by another principal
    #[error("{0} is not found")]
    ResourceNotFound(&'static str),

    #[error("Username already exists")]
    DuplicateIdentity,

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Secret(#[from] SecretError),
}
