pub mod gate;
pub mod password;
pub mod token;

pub use gate::AuthGate;
pub use password::{Argon2Hasher, SecretError, SecretHasher};
