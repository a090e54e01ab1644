//! Handles user credentials. Passwords are validated into a [`Password`] before anything touches
//! the store, and only ever persisted as a salted Argon2 [`PasswordHash`].

use argon2::{
    password_hash::{self, rand_core::OsRng, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

mod entities;

pub use entities::{HashError, Password, PasswordError, PasswordHash, MIN_PASSWORD_LENGTH};

/// Hashes a password with a freshly generated salt, so hashing the same password twice yields
/// two different hashes.
pub fn hash(password: &Password) -> Result<PasswordHash, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| PasswordHash(hash.to_string()))
        .map_err(|e| {
            log::error!("argon2 hashing failed: {}", e);
            HashError(e.to_string())
        })
}

/// Checks a candidate password against a stored hash. A mismatch is `Ok(false)`; an error means
/// the stored hash itself could not be parsed or checked.
pub fn verify(hash: &PasswordHash, candidate: &str) -> Result<bool, HashError> {
    let parsed = password_hash::PasswordHash::new(hash.as_str()).map_err(|e| {
        log::error!("stored password hash is malformed: {}", e);
        HashError(e.to_string())
    })?;
    match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => {
            log::error!("argon2 verification failed: {}", e);
            Err(HashError(e.to_string()))
        }
    }
}
