use chrono::Utc;
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{ApiError, AuthError},
    models::User,
};

/// Claims
///
/// The payload signed into every session token. Verification is stateless:
/// the signature plus the `exp` check is the entire session model, there is
/// no revocation list. A token stops working only when it expires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the UUID of the user the token was minted for.
    pub sub: Uuid,
    /// The user's role at issue time ("user" or "admin").
    pub role: String,
    /// Issued At (iat): Unix timestamp when the token was signed.
    pub iat: usize,
    /// Expiration Time (exp): Unix timestamp after which `verify` rejects
    /// the token with `ExpiredToken`.
    pub exp: usize,
}

/// issue
///
/// Signs a fresh HS256 token for `user` with a fixed TTL. Pure apart from
/// reading the clock; no store access and no side effects beyond signing.
pub fn issue(user: &User, secret: &str, ttl_secs: u64) -> Result<String, ApiError> {
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: user.id,
        role: user.role.clone(),
        iat: now,
        exp: now + ttl_secs as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))
}

/// verify
///
/// Decodes and validates a token, returning the embedded claims.
///
/// Failure kinds are kept distinct so the caller can report them precisely:
/// - `ExpiredToken` when the signature is fine but `exp` has passed
/// - `InvalidToken` when the signature does not verify
/// - `MalformedToken` when the encoding cannot be parsed at all
///
/// Verifying the same unexpired token twice yields identical claims.
pub fn verify(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        ErrorKind::InvalidSignature => AuthError::InvalidToken,
        _ => AuthError::MalformedToken,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-value-1234567890";

    fn test_user() -> User {
        User {
            id: Uuid::from_u128(1),
            role: "user".to_string(),
            ..User::default()
        }
    }

    #[test]
    fn issue_then_verify_roundtrip() {
        let token = issue(&test_user(), SECRET, 3600).unwrap();
        let claims = verify(&token, SECRET).unwrap();
        assert_eq!(claims.sub, Uuid::from_u128(1));
        assert_eq!(claims.role, "user");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn verify_is_idempotent_within_ttl() {
        let token = issue(&test_user(), SECRET, 3600).unwrap();
        let first = verify(&token, SECRET).unwrap();
        let second = verify(&token, SECRET).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn expired_token_is_rejected_with_expired_kind() {
        // Minted well in the past so the default validation leeway cannot
        // rescue it.
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: Uuid::from_u128(1),
            role: "user".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(verify(&token, SECRET), Err(AuthError::ExpiredToken));
    }

    #[test]
    fn wrong_secret_is_rejected_with_invalid_kind() {
        let token = issue(&test_user(), SECRET, 3600).unwrap();
        assert_eq!(
            verify(&token, "a-completely-different-secret"),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn garbage_is_rejected_with_malformed_kind() {
        assert_eq!(
            verify("not-a-jwt-at-all", SECRET),
            Err(AuthError::MalformedToken)
        );
    }
}
