use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    error::{ApiError, AuthError},
    repository::RepositoryState,
    token,
};

/// AuthUser
///
/// The resolved identity of an authenticated request: the output of the
/// authentication guard. Handlers take this as an argument wherever a route
/// requires a live, active user.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The unique identifier of the user, matching users.id.
    pub id: Uuid,
    /// The user's role, "user" or "admin".
    pub role: String,
}

/// Authentication Guard
///
/// Implemented as an Axum extractor so authentication stays separate from
/// handler logic. The check runs in a fixed order and terminates the request
/// at the first failure; nothing downstream executes after a rejection:
///
/// 1. Bearer extraction: missing header or missing "Bearer " prefix rejects
///    before any token work.
/// 2. Token verification: signature and expiry, each failure keeping its
///    specific kind.
/// 3. Credential store lookup: the token may be validly signed for a user
///    that was since removed or deactivated; both reject as unauthenticated.
///
/// The guard is idempotent and has no side effects beyond producing the
/// `AuthUser` value, so it is safe to compose before any other guard.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthenticated(AuthError::MissingToken))?;

        let bearer = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthenticated(AuthError::MalformedToken))?;

        let claims =
            token::verify(bearer, &config.jwt_secret).map_err(ApiError::Unauthenticated)?;

        // The claims alone are not enough: the user must still exist and be
        // active at request time.
        let user = repo
            .find_user(claims.sub)
            .await?
            .ok_or(ApiError::Unauthenticated(AuthError::UnknownUser))?;

        if user.status != "active" {
            return Err(ApiError::Unauthenticated(AuthError::InactiveUser));
        }

        Ok(AuthUser {
            id: user.id,
            role: user.role,
        })
    }
}
