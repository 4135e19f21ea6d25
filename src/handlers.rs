use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, AuthError},
    guards::{ExistingPost, OwnedPost},
    models::{
        AuthResponse, CreatePostRequest, LoginRequest, NewUser, Post, PresignedUrlRequest,
        PresignedUrlResponse, SignupRequest, UpdatePostRequest,
    },
    password, token,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

// --- Auth handlers ---

/// signup
///
/// [Public Route] Registers a new user and logs them straight in.
/// The password is hashed before the user record ever reaches the store; the
/// optional profile image key comes from the presigned-upload flow.
#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created", body = AuthResponse),
        (status = 400, description = "Invalid payload or email taken")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    payload.validate()?;

    if state
        .repo
        .find_user_by_email(&payload.email)
        .await?
        .is_some()
    {
        return Err(ApiError::Validation("email is already registered".into()));
    }

    let password_hash = password::hash(&payload.password)?;

    let user = state
        .repo
        .create_user(NewUser {
            name: payload.name,
            email: payload.email,
            description: payload.description,
            password_hash,
            profile_image: payload.profile_image_key,
        })
        .await?;

    let token = token::issue(&user, &state.config.jwt_secret, state.config.token_ttl_secs)?;

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

/// login
///
/// [Public Route] Exchanges email + password for a session token.
/// Unknown email and wrong password reject identically so the response does
/// not reveal which part failed; deactivated accounts cannot log in.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Bad credentials or inactive account")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.validate()?;

    let user = state
        .repo
        .find_user_by_email(&payload.email)
        .await?
        .ok_or(ApiError::Unauthenticated(AuthError::BadCredentials))?;

    if !password::verify(&payload.password, &user.password_hash) {
        return Err(ApiError::Unauthenticated(AuthError::BadCredentials));
    }

    if user.status != "active" {
        return Err(ApiError::Unauthenticated(AuthError::InactiveUser));
    }

    let token = token::issue(&user, &state.config.jwt_secret, state.config.token_ttl_secs)?;

    Ok(Json(AuthResponse { token, user }))
}

/// renew
///
/// [Authenticated Route] Issues a fresh token for the already-authenticated
/// caller, restarting the TTL. The user is re-resolved so the new token
/// carries their current role.
#[utoipa::path(
    get,
    path = "/api/v1/auth/renew",
    responses((status = 200, description = "Fresh token", body = AuthResponse))
)]
pub async fn renew(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = state
        .repo
        .find_user(id)
        .await?
        .ok_or(ApiError::Unauthenticated(AuthError::UnknownUser))?;

    let token = token::issue(&user, &state.config.jwt_secret, state.config.token_ttl_secs)?;

    Ok(Json(AuthResponse { token, user }))
}

// --- Post handlers ---

/// list_posts
///
/// [Public Route] Lists all posts, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/posts",
    responses((status = 200, description = "All posts", body = [Post]))
)]
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<Post>>, ApiError> {
    Ok(Json(state.repo.list_posts().await?))
}

/// get_post
///
/// [Public Route] Retrieves one post by id. The existence guard has already
/// loaded it (or answered 404), so the handler just returns it.
#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Found", body = Post),
        (status = 404, description = "Post not found")
    )
)]
pub async fn get_post(ExistingPost(post): ExistingPost) -> Json<Post> {
    Json(post)
}

/// create_post
///
/// [Authenticated Route] Creates a post owned by the caller. The owner id is
/// always taken from the authenticated session, never from the payload.
#[utoipa::path(
    post,
    path = "/api/v1/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Created", body = Post),
        (status = 400, description = "Invalid payload")
    )
)]
pub async fn create_post(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    payload.validate()?;
    let post = state.repo.create_post(payload, id).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// get_my_posts
///
/// [Authenticated Route] Lists all posts owned by the requesting user.
#[utoipa::path(
    get,
    path = "/api/v1/posts/me",
    responses((status = 200, description = "My posts", body = [Post]))
)]
pub async fn get_my_posts(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Post>>, ApiError> {
    Ok(Json(state.repo.posts_by_owner(id).await?))
}

/// get_profile_posts
///
/// [Authenticated Route] Lists another user's posts by their profile id.
/// The target user's existence is checked first so a bad id reports 404
/// rather than an empty list.
#[utoipa::path(
    get,
    path = "/api/v1/posts/profile/{id}",
    params(("id" = Uuid, Path, description = "Profile user ID")),
    responses(
        (status = 200, description = "User's posts", body = [Post]),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_profile_posts(
    AuthUser { .. }: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<Post>>, ApiError> {
    state
        .repo
        .find_user(user_id)
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    Ok(Json(state.repo.posts_by_owner(user_id).await?))
}

/// update_post
///
/// [Mutating Route] Partially updates a post. The ownership guard has
/// already run the full pipeline (authentication, existence, owner match),
/// so the write is a plain by-id update.
#[utoipa::path(
    patch,
    path = "/api/v1/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Updated", body = Post),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn update_post(
    OwnedPost { post, .. }: OwnedPost,
    State(state): State<AppState>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<Json<Post>, ApiError> {
    payload.validate()?;

    // The row can disappear between the guard's load and the write.
    state
        .repo
        .update_post(post.id, payload)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("post"))
}

/// delete_post
///
/// [Mutating Route] Deletes a post after the ownership pipeline passes.
#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn delete_post(
    OwnedPost { post, .. }: OwnedPost,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    if state.repo.delete_post(post.id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("post"))
    }
}

// --- Upload handler ---

/// get_presigned_url
///
/// [Authenticated Route] Generates a short-lived URL for a direct
/// client-to-storage image upload. The object key is unique and derived
/// server-side; only the file extension comes from the client.
#[utoipa::path(
    post,
    path = "/api/v1/uploads/presigned",
    request_body = PresignedUrlRequest,
    responses((status = 200, description = "Upload URL", body = PresignedUrlResponse))
)]
pub async fn get_presigned_url(
    AuthUser { .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<PresignedUrlRequest>,
) -> Result<Json<PresignedUrlResponse>, ApiError> {
    let extension = std::path::Path::new(&payload.filename)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("bin");
    let object_key = format!("uploads/{}.{}", Uuid::new_v4(), extension);

    let upload_url = state
        .storage
        .presigned_upload_url(&object_key, &payload.file_type)
        .await?;

    Ok(Json(PresignedUrlResponse {
        upload_url,
        resource_key: object_key,
    }))
}
