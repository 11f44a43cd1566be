use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("Failed to hash secret: {0}")]
    Hash(String),

    #[error("Stored secret is malformed: {0}")]
    Malformed(String),
}

/// One-way secret hashing. Callers never look inside the hashed value.
pub trait SecretHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String, SecretError>;

    fn verify(&self, plaintext: &str, hashed: &str) -> Result<bool, SecretError>;
}

/// Argon2id with the crate's default parameters, stored in PHC string format
#[derive(Default, Clone)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecretHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String, SecretError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| SecretError::Hash(e.to_string()))
    }

    fn verify(&self, plaintext: &str, hashed: &str) -> Result<bool, SecretError> {
        let parsed = PasswordHash::new(hashed).map_err(|e| SecretError::Malformed(e.to_string()))?;
        match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(SecretError::Malformed(e.to_string())),
        }
    }
}
