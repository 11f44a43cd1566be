use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{Address, AddressFields, Contact, ContactFields, User};
use crate::filter::Predicate;
use crate::paging::Window;

/// Data for a new `users` row; `password` is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub password: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.password.is_none()
    }
}

/// Persistence operations the service layer relies on.
///
/// Every contact and address operation takes the owner's username and applies it in
/// the same lookup or statement as the identifier, so a row owned by someone else
/// behaves exactly like a missing row.
#[async_trait]
pub trait Store: Send + Sync {
    async fn health_check(&self) -> Result<(), DatabaseError>;

    async fn find_user(&self, username: &str) -> Result<Option<User>, DatabaseError>;

    async fn find_user_by_token(&self, token: &str) -> Result<Option<User>, DatabaseError>;

    /// Fails with `UniqueViolation` when the username is taken
    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError>;

    async fn update_user(&self, username: &str, changes: UserChanges) -> Result<Option<User>, DatabaseError>;

    /// Replace the live token in one atomic write; `None` revokes it
    async fn set_token(&self, username: &str, token: Option<&str>) -> Result<Option<User>, DatabaseError>;

    async fn create_contact(&self, owner: &str, fields: &ContactFields) -> Result<Contact, DatabaseError>;

    async fn find_contact(&self, owner: &str, id: i64) -> Result<Option<Contact>, DatabaseError>;

    async fn update_contact(&self, owner: &str, id: i64, fields: &ContactFields) -> Result<Option<Contact>, DatabaseError>;

    /// Returns whether a row was removed; addresses go with their contact
    async fn delete_contact(&self, owner: &str, id: i64) -> Result<bool, DatabaseError>;

    async fn count_contacts(&self, predicate: &Predicate) -> Result<i64, DatabaseError>;

    /// Matching contacts ordered by id, restricted to `window`
    async fn list_contacts(&self, predicate: &Predicate, window: &Window) -> Result<Vec<Contact>, DatabaseError>;

    /// `None` when the contact is missing or owned by someone else
    async fn create_address(
        &self,
        owner: &str,
        contact_id: i64,
        fields: &AddressFields,
    ) -> Result<Option<Address>, DatabaseError>;

    async fn find_address(&self, owner: &str, contact_id: i64, id: i64) -> Result<Option<Address>, DatabaseError>;

    async fn update_address(
        &self,
        owner: &str,
        contact_id: i64,
        id: i64,
        fields: &AddressFields,
    ) -> Result<Option<Address>, DatabaseError>;

    async fn delete_address(&self, owner: &str, contact_id: i64, id: i64) -> Result<bool, DatabaseError>;

    async fn list_addresses(&self, owner: &str, contact_id: i64) -> Result<Vec<Address>, DatabaseError>;
}
