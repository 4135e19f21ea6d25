use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{Method, Request, Uri, header, request::Parts},
};
use blog_api::{
    AppState, MockStorageService,
    auth::AuthUser,
    error::{ApiError, AuthError},
    models::{CreatePostRequest, NewUser, Post, UpdatePostRequest, User},
    repository::Repository,
    token::Claims,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::sync::Arc;
use uuid::Uuid;

// --- Mock Repository for Auth Logic ---

#[derive(Default)]
struct MockAuthRepo {
    user_to_return: Option<User>,
}

#[async_trait]
impl Repository for MockAuthRepo {
    async fn find_user(&self, _id: Uuid) -> Result<Option<User>, sqlx::Error> {
        Ok(self.user_to_return.clone())
    }
    async fn find_user_by_email(&self, _email: &str) -> Result<Option<User>, sqlx::Error> {
        Ok(self.user_to_return.clone())
    }
    async fn create_user(&self, _user: NewUser) -> Result<User, sqlx::Error> {
        Ok(User::default())
    }
    async fn list_posts(&self) -> Result<Vec<Post>, sqlx::Error> {
        Ok(vec![])
    }
    async fn find_post(&self, _id: Uuid) -> Result<Option<Post>, sqlx::Error> {
        Ok(None)
    }
    async fn posts_by_owner(&self, _user_id: Uuid) -> Result<Vec<Post>, sqlx::Error> {
        Ok(vec![])
    }
    async fn create_post(
        &self,
        _req: CreatePostRequest,
        _user_id: Uuid,
    ) -> Result<Post, sqlx::Error> {
        Ok(Post::default())
    }
    async fn update_post(
        &self,
        _id: Uuid,
        _req: UpdatePostRequest,
    ) -> Result<Option<Post>, sqlx::Error> {
        Ok(None)
    }
    async fn delete_post(&self, _id: Uuid) -> Result<bool, sqlx::Error> {
        Ok(false)
    }
}

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";
const TEST_USER_ID: Uuid = Uuid::from_u128(1);

fn create_token(user_id: Uuid, iat: i64, exp: i64, secret: &str) -> String {
    let claims = Claims {
        sub: user_id,
        role: "user".to_string(),
        iat: iat as usize,
        exp: exp as usize,
    };

    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

fn fresh_token(user_id: Uuid) -> String {
    let now = chrono::Utc::now().timestamp();
    create_token(user_id, now, now + 3600, TEST_JWT_SECRET)
}

fn active_user(id: Uuid) -> User {
    User {
        id,
        name: "luis".to_string(),
        email: "luis@mail.com".to_string(),
        description: "programmer".to_string(),
        role: "user".to_string(),
        status: "active".to_string(),
        ..User::default()
    }
}

fn create_app_state(repo: MockAuthRepo) -> AppState {
    let mut config = blog_api::AppConfig::default();
    config.jwt_secret = TEST_JWT_SECRET.to_string();

    AppState {
        repo: Arc::new(repo),
        storage: Arc::new(MockStorageService::new()),
        config,
    }
}

fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

fn parts_with_bearer(token: &str) -> Parts {
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    );
    parts
}

// --- Tests ---

#[tokio::test]
async fn valid_token_resolves_the_user() {
    let app_state = create_app_state(MockAuthRepo {
        user_to_return: Some(active_user(TEST_USER_ID)),
    });

    let mut parts = parts_with_bearer(&fresh_token(TEST_USER_ID));
    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    let user = auth_user.unwrap();
    assert_eq!(user.id, TEST_USER_ID);
    assert_eq!(user.role, "user");
}

#[tokio::test]
async fn missing_header_is_rejected() {
    let app_state = create_app_state(MockAuthRepo::default());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert_eq!(
        auth_user.unwrap_err(),
        ApiError::Unauthenticated(AuthError::MissingToken)
    );
}

#[tokio::test]
async fn missing_bearer_prefix_is_rejected_as_malformed() {
    let app_state = create_app_state(MockAuthRepo {
        user_to_return: Some(active_user(TEST_USER_ID)),
    });

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Token {}", fresh_token(TEST_USER_ID))).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert_eq!(
        auth_user.unwrap_err(),
        ApiError::Unauthenticated(AuthError::MalformedToken)
    );
}

#[tokio::test]
async fn expired_token_is_rejected_with_expired_kind() {
    let app_state = create_app_state(MockAuthRepo {
        user_to_return: Some(active_user(TEST_USER_ID)),
    });

    // Far enough in the past that validation leeway cannot rescue it.
    let now = chrono::Utc::now().timestamp();
    let token = create_token(TEST_USER_ID, now - 7200, now - 3600, TEST_JWT_SECRET);

    let mut parts = parts_with_bearer(&token);
    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert_eq!(
        auth_user.unwrap_err(),
        ApiError::Unauthenticated(AuthError::ExpiredToken)
    );
}

#[tokio::test]
async fn tampered_signature_is_rejected_with_invalid_kind() {
    let app_state = create_app_state(MockAuthRepo {
        user_to_return: Some(active_user(TEST_USER_ID)),
    });

    let now = chrono::Utc::now().timestamp();
    let token = create_token(TEST_USER_ID, now, now + 3600, "some-other-secret");

    let mut parts = parts_with_bearer(&token);
    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert_eq!(
        auth_user.unwrap_err(),
        ApiError::Unauthenticated(AuthError::InvalidToken)
    );
}

#[tokio::test]
async fn deleted_user_is_rejected_even_with_a_valid_token() {
    // Token is validly signed, but the repo no longer knows the user.
    let app_state = create_app_state(MockAuthRepo {
        user_to_return: None,
    });

    let mut parts = parts_with_bearer(&fresh_token(TEST_USER_ID));
    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert_eq!(
        auth_user.unwrap_err(),
        ApiError::Unauthenticated(AuthError::UnknownUser)
    );
}

#[tokio::test]
async fn inactive_user_is_rejected() {
    let mut user = active_user(TEST_USER_ID);
    user.status = "inactive".to_string();

    let app_state = create_app_state(MockAuthRepo {
        user_to_return: Some(user),
    });

    let mut parts = parts_with_bearer(&fresh_token(TEST_USER_ID));
    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;

    assert_eq!(
        auth_user.unwrap_err(),
        ApiError::Unauthenticated(AuthError::InactiveUser)
    );
}

#[tokio::test]
async fn verification_is_idempotent_for_the_same_token() {
    let token = fresh_token(TEST_USER_ID);

    let first = blog_api::token::verify(&token, TEST_JWT_SECRET).unwrap();
    let second = blog_api::token::verify(&token, TEST_JWT_SECRET).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.sub, TEST_USER_ID);
}
