use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};

use crate::error::ApiError;

/// hash
///
/// Hashes a plaintext password with Argon2id and a fresh random salt,
/// returning the PHC string stored on the user record. The plaintext is
/// never persisted or logged.
pub fn hash(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

/// verify
///
/// Checks a plaintext password against a stored PHC string. An unparseable
/// stored hash counts as a mismatch rather than an error, so a corrupt
/// record can never authenticate.
pub fn verify(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let hashed = hash("root123").unwrap();
        assert!(verify("root123", &hashed));
        assert!(!verify("root124", &hashed));
    }

    #[test]
    fn salts_are_unique_per_hash() {
        let a = hash("root123").unwrap();
        let b = hash("root123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn corrupt_stored_hash_never_verifies() {
        assert!(!verify("root123", "not-a-phc-string"));
        assert!(!verify("root123", ""));
    }
}
