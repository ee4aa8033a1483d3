use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

use crate::errors::ServiceError;

/// Hash with argon2id and a random salt, returning the PHC string.
pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ServiceError::validation("password", e.to_string()))
}

#[cfg(test)]
pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{password_hash::PasswordVerifier, PasswordHash};

    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(_) => false,
    }
}
