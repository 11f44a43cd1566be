use once_cell::sync::OnceCell;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::password::SecretHasher;
use crate::auth::token::{extract_token, generate_token};
use crate::database::models::{LoginUserRequest, User, UserResponse};
use crate::database::Store;
use crate::services::ServiceError;
use crate::validation::UserValidation;

/// Resolves credentials to users and manages the single live session token
#[derive(Clone)]
pub struct AuthGate {
    store: Arc<dyn Store>,
    hasher: Arc<dyn SecretHasher>,
    /// Verified against when the username is unknown, so both login paths cost one verify
    decoy_hash: Arc<OnceCell<String>>,
}

impl AuthGate {
    pub fn new(store: Arc<dyn Store>, hasher: Arc<dyn SecretHasher>) -> Self {
        Self {
            store,
            hasher,
            decoy_hash: Arc::new(OnceCell::new()),
        }
    }

    fn decoy_hash(&self) -> Result<&str, ServiceError> {
        let hash = self
            .decoy_hash
            .get_or_try_init(|| self.hasher.hash(&generate_token()))?;
        Ok(hash.as_str())
    }

    /// Resolve the Authorization header value to the user holding that live token
    pub async fn authenticate(&self, credential: Option<&str>) -> Result<User, ServiceError> {
        let token = extract_token(credential).ok_or(ServiceError::MissingCredential)?;

        match self.store.find_user_by_token(token).await? {
            Some(user) => Ok(user),
            None => {
                warn!("Authentication failed: token does not match a live session");
                Err(ServiceError::InvalidCredential)
            }
        }
    }

    /// Verify the password and issue a new token, replacing any previous one
    pub async fn login(&self, input: &Value) -> Result<UserResponse, ServiceError> {
        let request: LoginUserRequest = UserValidation::login().parse(input)?;

        let verified = match self.store.find_user(&request.username).await? {
            Some(user) => self.hasher.verify(&request.password, &user.password)?,
            None => {
                self.hasher.verify(&request.password, self.decoy_hash()?)?;
                false
            }
        };
        if !verified {
            warn!("Login rejected for '{}'", request.username);
            return Err(ServiceError::InvalidCredentials);
        }

        let token = generate_token();
        let user = self
            .store
            .set_token(&request.username, Some(&token))
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        if crate::config::config().security.enable_audit_logging {
            info!(username = %user.username, "session issued");
        }

        Ok(UserResponse {
            token: Some(token),
            ..UserResponse::from(&user)
        })
    }

    /// Revoke the live token; later requests with it fail authentication
    pub async fn logout(&self, user: &User) -> Result<(), ServiceError> {
        self.store.set_token(&user.username, None).await?;
        info!(username = %user.username, "session revoked");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::Argon2Hasher;
    use crate::database::{MemoryStore, NewUser};
    use crate::auth::password::SecretError;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Plaintext "hashing" that records how often `verify` runs
    #[derive(Default)]
    struct CountingHasher {
        verifies: AtomicUsize,
    }

    impl SecretHasher for CountingHasher {
        fn hash(&self, plaintext: &str) -> Result<String, SecretError> {
            Ok(format!("plain:{}", plaintext))
        }

        fn verify(&self, plaintext: &str, hashed: &str) -> Result<bool, SecretError> {
            self.verifies.fetch_add(1, Ordering::SeqCst);
            Ok(hashed == format!("plain:{}", plaintext))
        }
    }

    async fn gate_with_user() -> AuthGate {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let hasher = Arc::new(Argon2Hasher::new());
        store
            .create_user(NewUser {
                username: "testuser".into(),
                name: "test".into(),
                password: hasher.hash("test12").unwrap(),
            })
            .await
            .unwrap();
        AuthGate::new(store, hasher)
    }

    #[tokio::test]
    async fn missing_and_invalid_credentials_differ() {
        let gate = gate_with_user().await;
        assert!(matches!(gate.authenticate(None).await, Err(ServiceError::MissingCredential)));
        assert!(matches!(gate.authenticate(Some("")).await, Err(ServiceError::MissingCredential)));
        assert!(matches!(gate.authenticate(Some("wrong")).await, Err(ServiceError::InvalidCredential)));
    }

    #[tokio::test]
    async fn login_issues_a_token_that_authenticates() {
        let gate = gate_with_user().await;
        let response = gate.login(&json!({ "username": "testuser", "password": "test12" })).await.unwrap();
        let token = response.token.unwrap();
        let user = gate.authenticate(Some(&token)).await.unwrap();
        assert_eq!(user.username, "testuser");
    }

    #[tokio::test]
    async fn relogin_invalidates_previous_token() {
        let gate = gate_with_user().await;
        let creds = json!({ "username": "testuser", "password": "test12" });
        let first = gate.login(&creds).await.unwrap().token.unwrap();
        let second = gate.login(&creds).await.unwrap().token.unwrap();

        assert_ne!(first, second);
        assert!(matches!(gate.authenticate(Some(&first)).await, Err(ServiceError::InvalidCredential)));
        assert!(gate.authenticate(Some(&second)).await.is_ok());
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_are_indistinguishable() {
        let gate = gate_with_user().await;
        let unknown = gate
            .login(&json!({ "username": "wrong", "password": "test12" }))
            .await
            .unwrap_err();
        let wrong = gate
            .login(&json!({ "username": "testuser", "password": "wrongpassword" }))
            .await
            .unwrap_err();

        assert!(matches!(unknown, ServiceError::InvalidCredentials));
        assert!(matches!(wrong, ServiceError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn logout_revokes_the_token() {
        let gate = gate_with_user().await;
        let token = gate
            .login(&json!({ "username": "testuser", "password": "test12" }))
            .await
            .unwrap()
            .token
            .unwrap();
        let user = gate.authenticate(Some(&token)).await.unwrap();

        gate.logout(&user).await.unwrap();
        assert!(matches!(gate.authenticate(Some(&token)).await, Err(ServiceError::InvalidCredential)));
    }

    #[tokio::test]
    async fn unknown_user_still_pays_for_a_verify() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let hasher = Arc::new(CountingHasher::default());
        store
            .create_user(NewUser {
                username: "testuser".into(),
                name: "test".into(),
                password: hasher.hash("test12").unwrap(),
            })
            .await
            .unwrap();
        let gate = AuthGate::new(store, hasher.clone());

        gate.login(&json!({ "username": "testuser", "password": "nope" })).await.unwrap_err();
        assert_eq!(hasher.verifies.load(Ordering::SeqCst), 1);

        gate.login(&json!({ "username": "ghost", "password": "nope" })).await.unwrap_err();
        assert_eq!(hasher.verifies.load(Ordering::SeqCst), 2);

        // the decoy never matches, even for its own plaintext
        gate.login(&json!({ "username": "ghost", "password": "test12" })).await.unwrap_err();
        assert_eq!(hasher.verifies.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn concurrent_logins_leave_one_live_token() {
        let gate = gate_with_user().await;
        let creds = json!({ "username": "testuser", "password": "test12" });

        let (a, b) = tokio::join!(gate.login(&creds), gate.login(&creds));
        let a = a.unwrap().token.unwrap();
        let b = b.unwrap().token.unwrap();
        assert_ne!(a, b);

        let mut live = 0;
        for token in [&a, &b] {
            if gate.authenticate(Some(token)).await.is_ok() {
                live += 1;
            }
        }
        assert_eq!(live, 1);
    }
}
