use serde_json::Value;
use std::sync::Arc;

use crate::database::models::{AddressResponse, CreateAddressRequest, GetAddressRequest, UpdateAddressRequest, User};
use crate::database::Store;
use crate::services::{with_path_params, OwnershipGuard, ServiceError};
use crate::validation::{validate_id, AddressValidation};

#[derive(Clone)]
pub struct AddressService {
    store: Arc<dyn Store>,
    guard: OwnershipGuard,
}

impl AddressService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        let guard = OwnershipGuard::new(store.clone());
        Self { store, guard }
    }

    /// Attach a new address to one of the user's contacts
    pub async fn create(&self, user: &User, contact_id: &str, input: Value) -> Result<AddressResponse, ServiceError> {
        let input = with_path_params(input, &[("contact_id", contact_id)]);
        let request: CreateAddressRequest = AddressValidation::create().parse(&input)?;

        let address = self
            .store
            .create_address(&user.username, request.contact_id, &request.fields)
            .await?
            .ok_or(ServiceError::ResourceNotFound("Contact"))?;
        Ok(address.into())
    }

    pub async fn get(&self, user: &User, contact_id: &str, address_id: &str) -> Result<AddressResponse, ServiceError> {
        let input = with_path_params(Value::Null, &[("contact_id", contact_id), ("id", address_id)]);
        let request: GetAddressRequest = AddressValidation::get().parse(&input)?;

        let address = self
            .guard
            .must_own_address(user, request.contact_id, request.id)
            .await?;
        Ok(address.into())
    }

    pub async fn update(
        &self,
        user: &User,
        contact_id: &str,
        address_id: &str,
        input: Value,
    ) -> Result<AddressResponse, ServiceError> {
        let input = with_path_params(input, &[("contact_id", contact_id), ("id", address_id)]);
        let request: UpdateAddressRequest = AddressValidation::update().parse(&input)?;

        self.guard.must_own(user, request.contact_id).await?;
        let address = self
            .store
            .update_address(&user.username, request.contact_id, request.id, &request.fields)
            .await?
            .ok_or(ServiceError::ResourceNotFound("Address"))?;
        Ok(address.into())
    }

    pub async fn delete(&self, user: &User, contact_id: &str, address_id: &str) -> Result<bool, ServiceError> {
        let input = with_path_params(Value::Null, &[("contact_id", contact_id), ("id", address_id)]);
        let request: GetAddressRequest = AddressValidation::get().parse(&input)?;

        self.guard.must_own(user, request.contact_id).await?;
        if !self
            .store
            .delete_address(&user.username, request.contact_id, request.id)
            .await?
        {
            return Err(ServiceError::ResourceNotFound("Address"));
        }
        Ok(true)
    }

    pub async fn list(&self, user: &User, contact_id: &str) -> Result<Vec<AddressResponse>, ServiceError> {
        let id = validate_id("contact_id", contact_id)?;
        let contact = self.guard.must_own(user, id).await?;
        let addresses = self.store.list_addresses(&user.username, contact.id).await?;
        Ok(addresses.into_iter().map(AddressResponse::from).collect())
    }
}
