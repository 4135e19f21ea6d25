use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::Next,
    response::Response,
    routing::get,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod guards;
pub mod handlers;
pub mod models;
pub mod password;
pub mod repository;
pub mod storage;
pub mod token;

// Routing, organized per route group.
pub mod routes;
use auth::AuthUser;

// --- Public Re-exports ---

// Core state types for the application entry point (main.rs) and tests.
pub use config::AppConfig;
pub use repository::{PostgresRepository, RepositoryState};
pub use storage::{MockStorageService, S3StorageClient, StorageState};

/// ApiDoc
///
/// Auto-generates the OpenAPI document from the `#[utoipa::path]` and
/// `#[derive(ToSchema)]` annotations. Served as JSON at
/// `/api-docs/openapi.json` and browsable at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::signup, handlers::login, handlers::renew,
        handlers::list_posts, handlers::get_post, handlers::create_post,
        handlers::get_my_posts, handlers::get_profile_posts,
        handlers::update_post, handlers::delete_post,
        handlers::get_presigned_url,
    ),
    components(
        schemas(
            models::User, models::Post, models::SignupRequest, models::LoginRequest,
            models::AuthResponse, models::CreatePostRequest, models::UpdatePostRequest,
            models::PresignedUrlRequest, models::PresignedUrlResponse,
        )
    ),
    tags(
        (name = "blog-api", description = "Blog REST API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, immutable container holding all application services, shared
/// across every request.
#[derive(Clone)]
pub struct AppState {
    /// Repository layer: credential and post stores behind one trait object.
    pub repo: RepositoryState,
    /// Storage layer: presigned-URL generation for image uploads.
    pub storage: StorageState,
    /// The loaded, immutable configuration.
    pub config: AppConfig,
}

// FromRef lets guards and handlers pull individual components out of the
// shared state instead of depending on all of it.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Router-level authentication for the fully-protected route groups. The
/// `AuthUser` extractor *is* the authentication guard; running it here means
/// an anonymous request is rejected with 401 before the handler (and before
/// any resource lookup) ever runs.
pub(crate) async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routing structure, the shared state, and the outer
/// observability and CORS layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        // Documentation: auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // GET /health
        // Unauthenticated liveness probe for monitors and load balancers.
        .route("/health", get(|| async { "ok" }))
        // The API surface, one router per route group. Each group applies
        // its own guard layers internally.
        .nest("/api/v1/auth", routes::auth::auth_routes(state.clone()))
        .nest("/api/v1/posts", routes::posts::post_routes(state.clone()))
        .nest("/api/v1/uploads", routes::uploads::upload_routes(state.clone()))
        .with_state(state);

    // Observability and correlation layers, applied outermost.
    base_router
        .layer(
            ServiceBuilder::new()
                // Generate a unique UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // Wrap the request/response lifecycle in a tracing span that
                // carries the request id.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // Return the generated x-request-id header to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Customizes span creation for `TraceLayer`: every log line of a single
/// request is correlated by its `x-request-id`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
