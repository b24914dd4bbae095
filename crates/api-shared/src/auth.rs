//! Password hashing and session token issuance.
//!
//! Hashes are argon2 PHC strings. The store keeps them as opaque text; only this module knows
//! how to produce or check one.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("password cannot be empty")]
    EmptyPassword,
    #[error("failed to hash password: {0}")]
    Hash(argon2::password_hash::Error),
}

/// Hash `password` with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    if password.is_empty() {
        return Err(AuthError::EmptyPassword);
    }

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(AuthError::Hash)
}

/// Whether `password` matches `stored_hash`.
///
/// A missing or malformed hash never verifies.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    if stored_hash.is_empty() {
        return false;
    }

    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("stored password hash is malformed: {e}");
            false
        }
    }
}

/// Issue a new opaque bearer token.
pub fn issue_token() -> String {
    Uuid::new_v4().simple().to_string()
}
