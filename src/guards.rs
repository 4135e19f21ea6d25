use axum::{
    extract::{FromRef, FromRequestParts, Path},
    http::request::Parts,
};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    config::AppConfig,
    error::ApiError,
    models::Post,
    repository::RepositoryState,
};

/// Existence Guard
///
/// Loads the post named by the `{id}` path segment before the handler runs,
/// short-circuiting with a 404 when it does not resolve. Detail reads use
/// this guard alone; mutating routes compose it inside `OwnedPost`.
///
/// Existence is always evaluated before ownership: an absent resource reports
/// `NotFound` regardless of who is asking, so the API never leaks ownership
/// information about ids that do not exist.
pub struct ExistingPost(pub Post);

impl<S> FromRequestParts<S> for ExistingPost
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);

        let Path(id) = Path::<Uuid>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Validation("post id must be a valid UUID".to_string()))?;

        let post = repo.find_post(id).await?.ok_or(ApiError::NotFound("post"))?;

        Ok(ExistingPost(post))
    }
}

/// Ownership Guard
///
/// The full pipeline for mutating routes, run strictly in order:
/// authentication first, then existence, then the owner comparison. The
/// ordering is load-bearing twice over: anonymous callers are rejected before
/// any post lookup happens, and a missing post reports `NotFound` before any
/// `Forbidden` could be produced.
///
/// Ownership is strict: only `post.user_id == user.id` passes. The admin role
/// grants no bypass here.
pub struct OwnedPost {
    pub user: AuthUser,
    pub post: Post,
}

impl<S> FromRequestParts<S> for OwnedPost
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let ExistingPost(post) = ExistingPost::from_request_parts(parts, state).await?;

        if post.user_id != user.id {
            return Err(ApiError::Forbidden);
        }

        Ok(OwnedPost { user, post })
    }
}
