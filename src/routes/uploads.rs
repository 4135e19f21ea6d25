use crate::{AppState, auth_middleware, handlers};
use axum::{Router, middleware, routing::post};

/// Uploads Router Module
///
/// The media pipeline: authenticated clients request a short-lived presigned
/// URL here, PUT the image straight to object storage, then reference the
/// returned key in a signup or post payload. The application server never
/// proxies file bytes.
pub fn upload_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // POST /api/v1/uploads/presigned
        .route("/presigned", post(handlers::get_presigned_url))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
