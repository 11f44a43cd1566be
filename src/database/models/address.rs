use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Row in `addresses`; owned through its contact
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Address {
    pub id: i64,
    pub contact_id: i64,
    pub street: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub country: String,
    pub postal_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AddressFields {
    pub street: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub country: String,
    pub postal_code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAddressRequest {
    pub contact_id: i64,
    #[serde(flatten)]
    pub fields: AddressFields,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAddressRequest {
    pub id: i64,
    pub contact_id: i64,
    #[serde(flatten)]
    pub fields: AddressFields,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GetAddressRequest {
    pub contact_id: i64,
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressResponse {
    pub id: i64,
    pub street: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub country: String,
    pub postal_code: String,
}

impl From<Address> for AddressResponse {
    fn from(address: Address) -> Self {
        Self {
            id: address.id,
            street: address.street,
            city: address.city,
            province: address.province,
            country: address.country,
            postal_code: address.postal_code,
        }
    }
}
