pub mod error;
pub mod rules;
pub mod schema;

pub use error::{FieldViolation, ValidationError};
pub use rules::{validate_id, AddressValidation, ContactValidation, UserValidation};
pub use schema::{FieldKind, FieldRule, Schema};
