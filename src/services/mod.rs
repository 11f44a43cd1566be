pub mod address_service;
pub mod contact_service;
pub mod error;
pub mod ownership;
pub mod user_service;

pub use address_service::AddressService;
pub use contact_service::ContactService;
pub use error::ServiceError;
pub use ownership::OwnershipGuard;
pub use user_service::UserService;

use serde_json::Value;

/// Merge path parameters into a request body so they are validated with it.
/// Path values win over anything the body supplies under the same name.
pub fn with_path_params(input: Value, params: &[(&str, &str)]) -> Value {
    let mut object = match input {
        Value::Object(map) => map,
        Value::Null => serde_json::Map::new(),
        other => return other,
    };
    for (name, value) in params {
        object.insert((*name).to_string(), Value::String((*value).to_string()));
    }
    Value::Object(object)
}
