use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::auth::SecretHasher;
use crate::database::models::{RegisterUserRequest, UpdateUserRequest, User, UserResponse};
use crate::database::{DatabaseError, NewUser, Store, UserChanges};
use crate::services::ServiceError;
use crate::validation::UserValidation;

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Store>,
    hasher: Arc<dyn SecretHasher>,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>, hasher: Arc<dyn SecretHasher>) -> Self {
        Self { store, hasher }
    }

    pub async fn register(&self, input: &Value) -> Result<UserResponse, ServiceError> {
        let request: RegisterUserRequest = UserValidation::register().parse(input)?;

        if self.store.find_user(&request.username).await?.is_some() {
            return Err(ServiceError::DuplicateIdentity);
        }

        let password = self.hasher.hash(&request.password)?;
        let user = self
            .store
            .create_user(NewUser {
                username: request.username,
                name: request.name,
                password,
            })
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent registration of the same username
                DatabaseError::UniqueViolation(_) => ServiceError::DuplicateIdentity,
                other => ServiceError::Database(other),
            })?;

        info!(username = %user.username, "user registered");
        Ok(UserResponse::from(&user))
    }

    pub fn current(&self, user: &User) -> UserResponse {
        UserResponse::from(user)
    }

    pub async fn update(&self, user: &User, input: &Value) -> Result<UserResponse, ServiceError> {
        let request: UpdateUserRequest = UserValidation::update().parse(input)?;

        let mut changes = UserChanges {
            name: request.name,
            password: None,
        };
        if let Some(password) = request.password.as_deref() {
            changes.password = Some(self.hasher.hash(password)?);
        }
        if changes.is_empty() {
            return Ok(UserResponse::from(user));
        }

        let updated = self
            .store
            .update_user(&user.username, changes)
            .await?
            .ok_or(ServiceError::InvalidCredential)?;
        Ok(UserResponse::from(&updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Argon2Hasher;
    use crate::database::MemoryStore;
    use serde_json::json;

    fn service() -> (UserService, Arc<dyn Store>) {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        (UserService::new(store.clone(), Arc::new(Argon2Hasher::new())), store)
    }

    #[tokio::test]
    async fn registers_and_hashes_password() {
        let (service, store) = service();
        let response = service
            .register(&json!({ "username": "testuser", "password": "test12", "name": "test" }))
            .await
            .unwrap();
        assert_eq!(response.username, "testuser");
        assert_eq!(response.token, None);

        let stored = store.find_user("testuser").await.unwrap().unwrap();
        assert_ne!(stored.password, "test12");
    }

    #[tokio::test]
    async fn duplicate_registration_leaves_first_user_unchanged() {
        let (service, store) = service();
        service
            .register(&json!({ "username": "testuser", "password": "test12", "name": "test" }))
            .await
            .unwrap();
        let err = service
            .register(&json!({ "username": "testuser", "password": "testpassword", "name": "other" }))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::DuplicateIdentity));
        assert_eq!(store.find_user("testuser").await.unwrap().unwrap().name, "test");
    }

    #[tokio::test]
    async fn invalid_registration_reports_all_fields() {
        let (service, _) = service();
        let err = service
            .register(&json!({ "username": "", "password": "", "name": "" }))
            .await
            .unwrap_err();
        match err {
            ServiceError::Validation(v) => assert_eq!(v.fields(), vec!["username", "password", "name"]),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn update_changes_only_supplied_fields() {
        let (service, store) = service();
        service
            .register(&json!({ "username": "testuser", "password": "test12", "name": "test" }))
            .await
            .unwrap();
        let user = store.find_user("testuser").await.unwrap().unwrap();

        let response = service.update(&user, &json!({ "name": "renamed" })).await.unwrap();
        assert_eq!(response.name, "renamed");
        let stored = store.find_user("testuser").await.unwrap().unwrap();
        assert_eq!(stored.password, user.password);
    }
}
