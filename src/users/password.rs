//! Argon2id password hashing.

use argon2::{
    password_hash::{rand_core::OsRng, Error, PasswordHash, PasswordHasher, SaltString},
    Argon2, PasswordVerifier,
};

/// Hash a password with a fresh random salt
/// # Errors
/// Return error if hashing fails
pub fn hash(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);

    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Verify a password against a stored PHC-format hash. A malformed hash
/// verifies as false rather than erroring, login treats both the same.
#[must_use]
pub fn verify(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
