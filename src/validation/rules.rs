use once_cell::sync::Lazy;
use serde_json::{json, Value};

use super::error::ValidationError;
use super::schema::{FieldRule, Schema};

pub struct UserValidation;

impl UserValidation {
    pub fn register() -> &'static Schema {
        static SCHEMA: Lazy<Schema> = Lazy::new(|| {
            Schema::new(vec![
                FieldRule::text("username", 1, 100),
                FieldRule::text("password", 1, 100),
                FieldRule::text("name", 1, 100),
            ])
        });
        &SCHEMA
    }

    pub fn login() -> &'static Schema {
        static SCHEMA: Lazy<Schema> = Lazy::new(|| {
            Schema::new(vec![
                FieldRule::text("username", 1, 100),
                FieldRule::text("password", 1, 100),
            ])
        });
        &SCHEMA
    }

    pub fn update() -> &'static Schema {
        static SCHEMA: Lazy<Schema> = Lazy::new(|| {
            Schema::new(vec![
                FieldRule::text("name", 1, 100).optional(),
                FieldRule::text("password", 1, 100).optional(),
            ])
        });
        &SCHEMA
    }
}

pub struct ContactValidation;

impl ContactValidation {
    fn contact_fields() -> Vec<FieldRule> {
        vec![
            FieldRule::text("first_name", 6, 100),
            FieldRule::text("last_name", 6, 100).optional(),
            FieldRule::email("email", 100).optional(),
            FieldRule::text("phone", 7, 20).optional(),
        ]
    }

    pub fn create() -> &'static Schema {
        static SCHEMA: Lazy<Schema> = Lazy::new(|| Schema::new(ContactValidation::contact_fields()));
        &SCHEMA
    }

    pub fn update() -> &'static Schema {
        static SCHEMA: Lazy<Schema> = Lazy::new(|| {
            let mut fields = vec![FieldRule::positive_int("id")];
            fields.extend(ContactValidation::contact_fields());
            Schema::new(fields)
        });
        &SCHEMA
    }

    pub fn search() -> &'static Schema {
        static SCHEMA: Lazy<Schema> = Lazy::new(|| {
            Schema::new(vec![
                FieldRule::text("name", 3, 100).optional(),
                FieldRule::email("email", 100).optional(),
                FieldRule::text("phone", 7, 100).optional(),
                FieldRule::positive_int("page").default_value(1),
                FieldRule::positive_int("size").default_value(crate::config::config().paging.default_size),
            ])
        });
        &SCHEMA
    }
}

pub struct AddressValidation;

impl AddressValidation {
    fn address_fields() -> Vec<FieldRule> {
        vec![
            FieldRule::positive_int("contact_id"),
            FieldRule::text("street", 1, 255).optional(),
            FieldRule::text("city", 1, 100).optional(),
            FieldRule::text("province", 1, 100).optional(),
            FieldRule::text("country", 1, 100),
            FieldRule::text("postal_code", 1, 10),
        ]
    }

    pub fn create() -> &'static Schema {
        static SCHEMA: Lazy<Schema> = Lazy::new(|| Schema::new(AddressValidation::address_fields()));
        &SCHEMA
    }

    pub fn update() -> &'static Schema {
        static SCHEMA: Lazy<Schema> = Lazy::new(|| {
            let mut fields = vec![FieldRule::positive_int("id")];
            fields.extend(AddressValidation::address_fields());
            Schema::new(fields)
        });
        &SCHEMA
    }

    pub fn get() -> &'static Schema {
        static SCHEMA: Lazy<Schema> = Lazy::new(|| {
            Schema::new(vec![
                FieldRule::positive_int("contact_id"),
                FieldRule::positive_int("id"),
            ])
        });
        &SCHEMA
    }
}

/// Validate a single identifier taken from a path segment
pub fn validate_id(field: &'static str, raw: &str) -> Result<i64, ValidationError> {
    let schema = Schema::new(vec![FieldRule::positive_int(field)]);
    let normalized = schema.validate(&json!({ field: raw }))?;
    normalized
        .get(field)
        .and_then(Value::as_i64)
        .ok_or_else(|| ValidationError::single(field, "Expected an integer"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_create_requires_first_name() {
        let err = ContactValidation::create()
            .validate(&json!({ "first_name": "" }))
            .unwrap_err();
        assert_eq!(err.fields(), vec!["first_name"]);

        let ok = ContactValidation::create()
            .validate(&json!({ "first_name": "JohnDoe" }))
            .unwrap();
        assert_eq!(ok.len(), 1);
    }

    #[test]
    fn contact_create_ignores_owner_field() {
        let ok = ContactValidation::create()
            .validate(&json!({ "first_name": "JohnDoe", "username": "someone-else" }))
            .unwrap();
        assert!(!ok.contains_key("username"));
    }

    #[test]
    fn search_defaults_page_and_size() {
        let ok = ContactValidation::search().validate(&json!({})).unwrap();
        assert_eq!(ok.get("page"), Some(&json!(1)));
        assert_eq!(ok.get("size"), Some(&json!(10)));
    }

    #[test]
    fn search_rejects_zero_size() {
        let err = ContactValidation::search()
            .validate(&json!({ "size": 0, "page": -1 }))
            .unwrap_err();
        assert_eq!(err.fields(), vec!["page", "size"]);
    }

    #[test]
    fn address_requires_country_and_postal_code() {
        let err = AddressValidation::create()
            .validate(&json!({ "contact_id": 1, "country": "", "postal_code": "" }))
            .unwrap_err();
        assert_eq!(err.fields(), vec!["country", "postal_code"]);
    }

    #[test]
    fn validates_path_ids() {
        assert_eq!(validate_id("contact_id", "42").unwrap(), 42);
        assert!(validate_id("contact_id", "0").is_err());
        assert!(validate_id("contact_id", "abc").is_err());
    }
}
