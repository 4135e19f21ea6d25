use crate::{AppState, auth_middleware, handlers};
use axum::{Router, middleware, routing::get};

/// Posts Router Module
///
/// The `/` and `/{id}` paths mix route classes by method: reads are public,
/// while create/update/delete authenticate via their extractors (`AuthUser`
/// for create, the full `OwnedPost` pipeline for mutation). The purely
/// authenticated listings (`/me`, `/profile/{id}`) get the router-level
/// authentication layer on top, matching the defense-in-depth applied to
/// the other protected route groups.
pub fn post_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        // GET /api/v1/posts/me
        // Lists the authenticated caller's own posts.
        .route("/me", get(handlers::get_my_posts))
        // GET /api/v1/posts/profile/{id}
        // Lists another user's posts; 404s when that user does not exist.
        .route("/profile/{id}", get(handlers::get_profile_posts))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        // GET  /api/v1/posts — public listing, newest first.
        // POST /api/v1/posts — authenticated create (AuthUser extractor).
        .route(
            "/",
            get(handlers::list_posts).post(handlers::create_post),
        )
        // GET    /api/v1/posts/{id} — public detail (existence guard only).
        // PATCH  /api/v1/posts/{id} — owner-only partial update.
        // DELETE /api/v1/posts/{id} — owner-only delete.
        // The mutating methods run the full guard pipeline through the
        // OwnedPost extractor: authentication, then existence, then the
        // owner match.
        .route(
            "/{id}",
            get(handlers::get_post)
                .patch(handlers::update_post)
                .delete(handlers::delete_post),
        )
        .merge(protected)
}
