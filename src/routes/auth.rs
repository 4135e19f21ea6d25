use crate::{AppState, auth_middleware, handlers};
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Auth Router Module
///
/// Signup and login are the two routes where guards are the target rather
/// than a gate: they carry no authentication layer, only payload validation.
/// Renewal, by contrast, is a protected route and sits behind the
/// authentication layer like every other authenticated endpoint.
pub fn auth_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        // GET /api/v1/auth/renew
        // Re-issues a session token for the authenticated caller.
        .route("/renew", get(handlers::renew))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        // POST /api/v1/auth/signup
        // Creates the account, hashes the password, returns a first token.
        .route("/signup", post(handlers::signup))
        // POST /api/v1/auth/login
        // Exchanges credentials for a session token.
        .route("/login", post(handlers::login))
        .merge(protected)
}
