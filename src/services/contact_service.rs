use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::database::models::{ContactFields, ContactResponse, SearchContactRequest, UpdateContactRequest, User};
use crate::database::Store;
use crate::filter::ContactFilter;
use crate::paging::{PageResult, Paging};
use crate::services::{with_path_params, OwnershipGuard, ServiceError};
use crate::validation::{validate_id, ContactValidation};

#[derive(Clone)]
pub struct ContactService {
    store: Arc<dyn Store>,
    guard: OwnershipGuard,
}

impl ContactService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        let guard = OwnershipGuard::new(store.clone());
        Self { store, guard }
    }

    /// The new contact always belongs to `user`, whatever owner the input names
    pub async fn create(&self, user: &User, input: &Value) -> Result<ContactResponse, ServiceError> {
        let fields: ContactFields = ContactValidation::create().parse(input)?;
        let contact = self.store.create_contact(&user.username, &fields).await?;
        debug!(username = %user.username, contact_id = contact.id, "contact created");
        Ok(contact.into())
    }

    pub async fn get(&self, user: &User, contact_id: &str) -> Result<ContactResponse, ServiceError> {
        let id = validate_id("contact_id", contact_id)?;
        Ok(self.guard.must_own(user, id).await?.into())
    }

    pub async fn update(&self, user: &User, contact_id: &str, input: Value) -> Result<ContactResponse, ServiceError> {
        let input = with_path_params(input, &[("id", contact_id)]);
        let request: UpdateContactRequest = ContactValidation::update().parse(&input)?;

        let contact = self
            .store
            .update_contact(&user.username, request.id, &request.fields)
            .await?
            .ok_or(ServiceError::ResourceNotFound("Contact"))?;
        Ok(contact.into())
    }

    pub async fn delete(&self, user: &User, contact_id: &str) -> Result<bool, ServiceError> {
        let id = validate_id("contact_id", contact_id)?;
        if !self.store.delete_contact(&user.username, id).await? {
            return Err(ServiceError::ResourceNotFound("Contact"));
        }
        debug!(username = %user.username, contact_id = id, "contact deleted");
        Ok(true)
    }

    /// Page through the user's contacts matching the optional criteria
    pub async fn search(&self, user: &User, input: &Value) -> Result<PageResult<ContactResponse>, ServiceError> {
        let criteria: SearchContactRequest = ContactValidation::search().parse(input)?;
        let predicate = ContactFilter::compile(user, &criteria);

        let total = self.store.count_contacts(&predicate).await?;
        let window = Paging::window(total, criteria.page, criteria.size);
        let contacts = if total == 0 {
            vec![]
        } else {
            self.store.list_contacts(&predicate, &window).await?
        };

        Ok(PageResult::new(contacts, criteria.page, criteria.size, window.total_page).map(ContactResponse::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{MemoryStore, NewUser};
    use serde_json::json;

    async fn setup() -> (ContactService, User, User) {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let alice = store
            .create_user(NewUser { username: "alice".into(), name: "Alice".into(), password: "h".into() })
            .await
            .unwrap();
        let bob = store
            .create_user(NewUser { username: "bob".into(), name: "Bob".into(), password: "h".into() })
            .await
            .unwrap();
        (ContactService::new(store), alice, bob)
    }

    #[tokio::test]
    async fn other_users_contact_looks_missing() {
        let (service, alice, bob) = setup().await;
        let created = service.create(&alice, &json!({ "first_name": "JohnDoe" })).await.unwrap();
        let id = created.id.to_string();

        let foreign = service.get(&bob, &id).await.unwrap_err();
        let missing = service.get(&bob, "9999").await.unwrap_err();
        assert!(matches!(foreign, ServiceError::ResourceNotFound("Contact")));
        assert_eq!(foreign.to_string(), missing.to_string());

        assert!(matches!(
            service.update(&bob, &id, json!({ "first_name": "Mallory" })).await,
            Err(ServiceError::ResourceNotFound(_))
        ));
        assert!(matches!(service.delete(&bob, &id).await, Err(ServiceError::ResourceNotFound(_))));
        assert_eq!(service.get(&alice, &id).await.unwrap().first_name, "JohnDoe");
    }

    #[tokio::test]
    async fn invalid_update_does_not_touch_storage() {
        let (service, alice, _) = setup().await;
        let created = service.create(&alice, &json!({ "first_name": "JohnDoe" })).await.unwrap();
        let id = created.id.to_string();

        let err = service.update(&alice, &id, json!({ "first_name": "" })).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(service.get(&alice, &id).await.unwrap().first_name, "JohnDoe");
    }

    #[tokio::test]
    async fn search_pages_through_own_contacts() {
        let (service, alice, bob) = setup().await;
        for i in 0..25 {
            service
                .create(&alice, &json!({ "first_name": format!("John{:03}", i), "last_name": format!("Doe{:03}", i) }))
                .await
                .unwrap();
        }
        service.create(&bob, &json!({ "first_name": "JohnBob" })).await.unwrap();

        let first = service.search(&alice, &json!({})).await.unwrap();
        assert_eq!(first.data.len(), 10);
        assert_eq!(first.paging.total_page, 3);

        let last = service.search(&alice, &json!({ "page": 3 })).await.unwrap();
        assert_eq!(last.data.len(), 5);
        assert_eq!(last.paging.current_page, 3);

        let beyond = service.search(&alice, &json!({ "page": 9 })).await.unwrap();
        assert!(beyond.data.is_empty());
        assert_eq!(beyond.paging.total_page, 3);
    }

    #[tokio::test]
    async fn search_with_no_matches_is_empty_not_an_error() {
        let (service, alice, bob) = setup().await;
        service.create(&bob, &json!({ "first_name": "JohnBob" })).await.unwrap();

        let result = service.search(&alice, &json!({ "page": 1, "size": 10 })).await.unwrap();
        assert!(result.data.is_empty());
        assert_eq!(result.paging.total_page, 0);
    }
}
