use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{Address, AddressFields, Contact, ContactFields, User};
use crate::database::store::{NewUser, Store, UserChanges};
use crate::filter::Predicate;
use crate::paging::Window;

#[derive(Default)]
struct MemoryState {
    users: HashMap<String, User>,
    contacts: BTreeMap<i64, Contact>,
    addresses: BTreeMap<i64, Address>,
    last_contact_id: i64,
    last_address_id: i64,
}

impl MemoryState {
    fn owned_contact(&self, owner: &str, id: i64) -> Option<&Contact> {
        self.contacts.get(&id).filter(|c| c.username == owner)
    }

    fn owned_address_id(&self, owner: &str, contact_id: i64, id: i64) -> Option<i64> {
        self.owned_contact(owner, contact_id)?;
        self.addresses
            .get(&id)
            .filter(|a| a.contact_id == contact_id)
            .map(|a| a.id)
    }
}

/// Process-local `Store` used for development runs and tests.
/// Each operation holds the lock for its whole read-modify-write.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.state.read().await.users.get(username).cloned())
    }

    async fn find_user_by_token(&self, token: &str) -> Result<Option<User>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| u.token.as_deref() == Some(token))
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut state = self.state.write().await;
        if state.users.contains_key(&user.username) {
            return Err(DatabaseError::UniqueViolation(format!("users.username = {}", user.username)));
        }
        let now = Utc::now();
        let created = User {
            username: user.username,
            name: user.name,
            password: user.password,
            token: None,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(created.username.clone(), created.clone());
        Ok(created)
    }

    async fn update_user(&self, username: &str, changes: UserChanges) -> Result<Option<User>, DatabaseError> {
        let mut state = self.state.write().await;
        Ok(state.users.get_mut(username).map(|user| {
            if let Some(name) = changes.name {
                user.name = name;
            }
            if let Some(password) = changes.password {
                user.password = password;
            }
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn set_token(&self, username: &str, token: Option<&str>) -> Result<Option<User>, DatabaseError> {
        let mut state = self.state.write().await;
        Ok(state.users.get_mut(username).map(|user| {
            user.token = token.map(str::to_string);
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn create_contact(&self, owner: &str, fields: &ContactFields) -> Result<Contact, DatabaseError> {
        let mut state = self.state.write().await;
        state.last_contact_id += 1;
        let now = Utc::now();
        let contact = Contact {
            id: state.last_contact_id,
            username: owner.to_string(),
            first_name: fields.first_name.clone(),
            last_name: fields.last_name.clone(),
            email: fields.email.clone(),
            phone: fields.phone.clone(),
            created_at: now,
            updated_at: now,
        };
        state.contacts.insert(contact.id, contact.clone());
        Ok(contact)
    }

    async fn find_contact(&self, owner: &str, id: i64) -> Result<Option<Contact>, DatabaseError> {
        Ok(self.state.read().await.owned_contact(owner, id).cloned())
    }

    async fn update_contact(&self, owner: &str, id: i64, fields: &ContactFields) -> Result<Option<Contact>, DatabaseError> {
        let mut state = self.state.write().await;
        let contact = match state.contacts.get_mut(&id).filter(|c| c.username == owner) {
            Some(contact) => contact,
            None => return Ok(None),
        };
        contact.first_name = fields.first_name.clone();
        contact.last_name = fields.last_name.clone();
        contact.email = fields.email.clone();
        contact.phone = fields.phone.clone();
        contact.updated_at = Utc::now();
        Ok(Some(contact.clone()))
    }

    async fn delete_contact(&self, owner: &str, id: i64) -> Result<bool, DatabaseError> {
        let mut state = self.state.write().await;
        if state.owned_contact(owner, id).is_none() {
            return Ok(false);
        }
        state.contacts.remove(&id);
        state.addresses.retain(|_, a| a.contact_id != id);
        Ok(true)
    }

    async fn count_contacts(&self, predicate: &Predicate) -> Result<i64, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.contacts.values().filter(|c| predicate.matches(c)).count() as i64)
    }

    async fn list_contacts(&self, predicate: &Predicate, window: &Window) -> Result<Vec<Contact>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .contacts
            .values()
            .filter(|c| predicate.matches(c))
            .skip(usize::try_from(window.skip).unwrap_or(usize::MAX))
            .take(usize::try_from(window.take).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn create_address(
        &self,
        owner: &str,
        contact_id: i64,
        fields: &AddressFields,
    ) -> Result<Option<Address>, DatabaseError> {
        let mut state = self.state.write().await;
        if state.owned_contact(owner, contact_id).is_none() {
            return Ok(None);
        }
        state.last_address_id += 1;
        let now = Utc::now();
        let address = Address {
            id: state.last_address_id,
            contact_id,
            street: fields.street.clone(),
            city: fields.city.clone(),
            province: fields.province.clone(),
            country: fields.country.clone(),
            postal_code: fields.postal_code.clone(),
            created_at: now,
            updated_at: now,
        };
        state.addresses.insert(address.id, address.clone());
        Ok(Some(address))
    }

    async fn find_address(&self, owner: &str, contact_id: i64, id: i64) -> Result<Option<Address>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .owned_address_id(owner, contact_id, id)
            .and_then(|id| state.addresses.get(&id))
            .cloned())
    }

    async fn update_address(
        &self,
        owner: &str,
        contact_id: i64,
        id: i64,
        fields: &AddressFields,
    ) -> Result<Option<Address>, DatabaseError> {
        let mut state = self.state.write().await;
        let id = match state.owned_address_id(owner, contact_id, id) {
            Some(id) => id,
            None => return Ok(None),
        };
        Ok(state.addresses.get_mut(&id).map(|address| {
            address.street = fields.street.clone();
            address.city = fields.city.clone();
            address.province = fields.province.clone();
            address.country = fields.country.clone();
            address.postal_code = fields.postal_code.clone();
            address.updated_at = Utc::now();
            address.clone()
        }))
    }

    async fn delete_address(&self, owner: &str, contact_id: i64, id: i64) -> Result<bool, DatabaseError> {
        let mut state = self.state.write().await;
        let found = state.owned_address_id(owner, contact_id, id);
        Ok(found.map_or(false, |id| state.addresses.remove(&id).is_some()))
    }

    async fn list_addresses(&self, owner: &str, contact_id: i64) -> Result<Vec<Address>, DatabaseError> {
        let state = self.state.read().await;
        if state.owned_contact(owner, contact_id).is_none() {
            return Ok(vec![]);
        }
        Ok(state
            .addresses
            .values()
            .filter(|a| a.contact_id == contact_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::ContactFilter;
    use crate::paging::Paging;

    fn fields(first_name: &str) -> ContactFields {
        ContactFields { first_name: first_name.to_string(), ..Default::default() }
    }

    fn address_fields() -> AddressFields {
        AddressFields { country: "Indonesia".into(), postal_code: "12345".into(), ..Default::default() }
    }

    async fn seeded() -> (MemoryStore, User, User) {
        let store = MemoryStore::new();
        let alice = store
            .create_user(NewUser { username: "alice".into(), name: "Alice".into(), password: "h".into() })
            .await
            .unwrap();
        let bob = store
            .create_user(NewUser { username: "bob".into(), name: "Bob".into(), password: "h".into() })
            .await
            .unwrap();
        (store, alice, bob)
    }

    #[tokio::test]
    async fn duplicate_username_is_a_unique_violation() {
        let (store, _, _) = seeded().await;
        let err = store
            .create_user(NewUser { username: "alice".into(), name: "Other".into(), password: "x".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::UniqueViolation(_)));
        assert_eq!(store.find_user("alice").await.unwrap().unwrap().name, "Alice");
    }

    #[tokio::test]
    async fn contact_lookups_are_owner_scoped() {
        let (store, _, _) = seeded().await;
        let contact = store.create_contact("alice", &fields("Johnny")).await.unwrap();

        assert!(store.find_contact("alice", contact.id).await.unwrap().is_some());
        assert!(store.find_contact("bob", contact.id).await.unwrap().is_none());
        assert!(store.update_contact("bob", contact.id, &fields("Mallory")).await.unwrap().is_none());
        assert!(!store.delete_contact("bob", contact.id).await.unwrap());
        assert_eq!(
            store.find_contact("alice", contact.id).await.unwrap().unwrap().first_name,
            "Johnny"
        );
    }

    #[tokio::test]
    async fn list_applies_predicate_and_window() {
        let (store, alice, bob) = seeded().await;
        for i in 0..25 {
            store.create_contact("alice", &fields(&format!("Johnny{}", i))).await.unwrap();
        }
        store.create_contact("bob", &fields("Johnny-bob")).await.unwrap();

        let predicate = ContactFilter::for_owner(&alice).build();
        assert_eq!(store.count_contacts(&predicate).await.unwrap(), 25);
        let page = store.list_contacts(&predicate, &Paging::window(25, 3, 10)).await.unwrap();
        assert_eq!(page.len(), 5);
        assert!(page.iter().all(|c| c.username == "alice"));

        let bobs = ContactFilter::for_owner(&bob).build();
        assert_eq!(store.count_contacts(&bobs).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn deleting_a_contact_removes_its_addresses() {
        let (store, _, _) = seeded().await;
        let contact = store.create_contact("alice", &fields("Johnny")).await.unwrap();
        let address = store
            .create_address("alice", contact.id, &address_fields())
            .await
            .unwrap()
            .unwrap();

        assert!(store.find_address("bob", contact.id, address.id).await.unwrap().is_none());
        assert!(store.delete_contact("alice", contact.id).await.unwrap());
        assert!(store.find_address("alice", contact.id, address.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_token_replaces_previous_token() {
        let (store, _, _) = seeded().await;
        store.set_token("alice", Some("first")).await.unwrap();
        store.set_token("alice", Some("second")).await.unwrap();
        assert!(store.find_user_by_token("first").await.unwrap().is_none());
        assert_eq!(store.find_user_by_token("second").await.unwrap().unwrap().username, "alice");

        store.set_token("alice", None).await.unwrap();
        assert!(store.find_user_by_token("second").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn address_create_requires_an_owned_live_contact() {
        let (store, _, _) = seeded().await;
        let contact = store.create_contact("alice", &fields("Johnny")).await.unwrap();

        assert!(store.create_address("bob", contact.id, &address_fields()).await.unwrap().is_none());

        store.delete_contact("alice", contact.id).await.unwrap();
        assert!(store.create_address("alice", contact.id, &address_fields()).await.unwrap().is_none());
        assert!(store.list_addresses("alice", contact.id).await.unwrap().is_empty());
    }
}
