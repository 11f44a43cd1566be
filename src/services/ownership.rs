use std::sync::Arc;

use crate::database::models::{Address, Contact, User};
use crate::database::Store;
use crate::services::ServiceError;

/// Confirms a targeted resource belongs to the requesting user.
///
/// The owner is part of the lookup itself, so "exists but belongs to someone else"
/// produces the same `ResourceNotFound` as "does not exist".
#[derive(Clone)]
pub struct OwnershipGuard {
    store: Arc<dyn Store>,
}

impl OwnershipGuard {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn must_own(&self, user: &User, contact_id: i64) -> Result<Contact, ServiceError> {
        self.store
            .find_contact(&user.username, contact_id)
            .await?
            .ok_or(ServiceError::ResourceNotFound("Contact"))
    }

    /// Contact is checked first so a foreign or missing contact reports as such
    pub async fn must_own_address(&self, user: &User, contact_id: i64, address_id: i64) -> Result<Address, ServiceError> {
        self.must_own(user, contact_id).await?;
        self.store
            .find_address(&user.username, contact_id, address_id)
            .await?
            .ok_or(ServiceError::ResourceNotFound("Address"))
    }
}
