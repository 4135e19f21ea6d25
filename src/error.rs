use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// AuthError
///
/// The specific reasons an authentication attempt can fail. The pipeline
/// surfaces all of them as a 401, but the kind is preserved in the response
/// message so that an expired token is distinguishable from a tampered one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization` header was present on the request.
    MissingToken,
    /// The header existed but lacked the `Bearer ` prefix, or the token
    /// encoding could not be parsed at all.
    MalformedToken,
    /// The token parsed but its signature did not verify.
    InvalidToken,
    /// The token was validly signed but its expiry has passed.
    ExpiredToken,
    /// The token resolved to a user id that no longer exists.
    UnknownUser,
    /// The user exists but their account status is not `active`.
    InactiveUser,
    /// Login-time failure: unknown email or wrong password. Kept uniform so
    /// the response does not reveal which of the two was wrong.
    BadCredentials,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingToken => write!(f, "missing bearer token"),
            AuthError::MalformedToken => write!(f, "malformed token"),
            AuthError::InvalidToken => write!(f, "invalid token signature"),
            AuthError::ExpiredToken => write!(f, "token expired"),
            AuthError::UnknownUser => write!(f, "user no longer exists"),
            AuthError::InactiveUser => write!(f, "user account is inactive"),
            AuthError::BadCredentials => write!(f, "invalid email or password"),
        }
    }
}

/// ApiError
///
/// The crate-wide error taxonomy. Every guard and handler terminates with one
/// of these; the `IntoResponse` impl is the single place where kinds are
/// mapped to HTTP status codes and the structured JSON error body.
///
/// Guards never suppress their own failures: the first error short-circuits
/// the pipeline and no downstream guard or handler runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The caller could not be authenticated (maps to 401).
    Unauthenticated(AuthError),
    /// The caller is authenticated but does not own the resource (403).
    Forbidden,
    /// The path identifier did not resolve to a resource (404).
    /// Carries the resource noun for the message ("post", "user").
    NotFound(&'static str),
    /// Malformed input payload (400).
    Validation(String),
    /// A collaborator (database, object storage, signer) failed. Surfaced as
    /// a generic 500 so infrastructure detail never leaks to the caller.
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthenticated(e) => write!(f, "unauthenticated: {e}"),
            ApiError::Forbidden => write!(f, "forbidden"),
            ApiError::NotFound(what) => write!(f, "{what} not found"),
            ApiError::Validation(msg) => write!(f, "validation error: {msg}"),
            ApiError::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl ApiError {
    /// The machine-readable kind placed in the JSON error body.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated(_) => "unauthenticated",
            ApiError::Forbidden => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Validation(_) => "validation_error",
            ApiError::Internal(_) => "internal",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            ApiError::Unauthenticated(e) => e.to_string(),
            ApiError::Forbidden => "you are not the owner of this resource".to_string(),
            ApiError::NotFound(what) => format!("{what} not found"),
            ApiError::Validation(msg) => msg.clone(),
            ApiError::Internal(msg) => {
                // The detail is logged server-side only.
                tracing::error!("internal error: {msg}");
                "internal server error".to_string()
            }
        };

        let body = Json(json!({
            "error": {
                "kind": self.kind(),
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Database failures are infrastructure errors, never authorization
/// decisions: they surface as a generic 500 and are not retried here.
impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Internal(format!("database error: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(
            ApiError::Unauthenticated(AuthError::MissingToken).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound("post").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal("db down".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn expired_and_malformed_tokens_are_distinguishable() {
        let expired = ApiError::Unauthenticated(AuthError::ExpiredToken);
        let malformed = ApiError::Unauthenticated(AuthError::MalformedToken);
        // Same status, different message.
        assert_eq!(expired.status_code(), malformed.status_code());
        assert_ne!(expired.to_string(), malformed.to_string());
    }

    #[test]
    fn internal_detail_is_not_leaked_in_the_response() {
        let response = ApiError::Internal("connection refused to 10.0.0.5".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn sqlx_errors_convert_to_internal() {
        let err: ApiError = sqlx::Error::RowNotFound.into();
        assert_eq!(err.kind(), "internal");
    }
}
