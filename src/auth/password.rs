//! Password hashing and verification using Argon2
//!
//! Argon2id with default parameters; hashes are stored as PHC strings, so
//! the salt and parameters travel with the hash. Plaintext passwords never
//! reach the store.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::ApiError;

/// Hash a password for storage
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a stored hash.
///
/// Returns false for a wrong password; a hash that does not parse as a PHC
/// string is a storage corruption and surfaces as an error instead.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, ApiError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| ApiError::Internal(format!("Invalid password hash format: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_accepts_only_the_right_password() {
        let hash = hash_password("pw1").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("pw1", &hash).unwrap());
        assert!(!verify_password("pw2", &hash).unwrap());
    }

    #[test]
    fn same_password_gets_fresh_salts() {
        let first = hash_password("pw1").unwrap();
        let second = hash_password("pw1").unwrap();

        assert_ne!(first, second);
        assert!(verify_password("pw1", &first).unwrap());
        assert!(verify_password("pw1", &second).unwrap());
    }

    #[test]
    fn corrupt_stored_hash_is_an_error_not_a_mismatch() {
        assert!(verify_password("pw1", "plainly-not-a-phc-string").is_err());
    }
}
