use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;

/// The original upload pipeline accepts at most three images per post.
pub const MAX_POST_IMAGES: usize = 3;

const MAX_TITLE_LEN: usize = 200;
const MIN_PASSWORD_LEN: usize = 6;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// The canonical identity record stored in the `users` table. The password
/// hash travels with the row for login verification but is never serialized
/// into a response body.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    // Unique; doubles as the login identifier.
    pub email: String,
    pub description: String,
    // Argon2 PHC string. Write-only: excluded from every response.
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub password_hash: String,
    // "user" or "admin".
    pub role: String,
    // "active" or "inactive". Inactive users cannot authenticate.
    pub status: String,
    // Object-storage key of the profile image, if one was uploaded.
    pub profile_image: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// NewUser
///
/// The fields the repository needs to insert a user. The id, role, status
/// and timestamps are assigned at insertion time.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub description: String,
    pub password_hash: String,
    pub profile_image: Option<String>,
}

/// Post
///
/// A blog post from the `posts` table. `user_id` records the owner at
/// creation time; ownership never transfers.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    // Ordered object-storage keys, at most MAX_POST_IMAGES entries.
    pub images: Vec<String>,
    // FK to users.id (owner).
    pub user_id: Uuid,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// SignupRequest
///
/// Input payload for POST /api/v1/auth/signup. The profile image key is
/// produced by the presigned-upload flow before signup is submitted.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub description: String,
    pub password: String,
    #[serde(default)]
    pub profile_image_key: Option<String>,
}

impl SignupRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::Validation("name must not be empty".into()));
        }
        if !is_plausible_email(&self.email) {
            return Err(ApiError::Validation("email is not valid".into()));
        }
        if self.description.trim().is_empty() {
            return Err(ApiError::Validation("description must not be empty".into()));
        }
        if self.password.len() < MIN_PASSWORD_LEN {
            return Err(ApiError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Ok(())
    }
}

/// LoginRequest
///
/// Input payload for POST /api/v1/auth/login.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(ApiError::Validation(
                "email and password are required".into(),
            ));
        }
        Ok(())
    }
}

/// AuthResponse
///
/// Output of signup, login and renew: the signed session token together
/// with the (hash-free) user record.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// CreatePostRequest
///
/// Input payload for POST /api/v1/posts. Image keys come from the
/// presigned-upload flow, completed by the client beforehand.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub image_keys: Vec<String>,
}

impl CreatePostRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_title(&self.title)?;
        if self.content.trim().is_empty() {
            return Err(ApiError::Validation("content must not be empty".into()));
        }
        validate_image_count(self.image_keys.len())
    }
}

/// UpdatePostRequest
///
/// Partial update payload for PATCH /api/v1/posts/{id}. `Option<T>` fields
/// with `skip_serializing_if` keep absent fields out of the payload, and the
/// repository only overwrites columns that were provided.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdatePostRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_keys: Option<Vec<String>>,
}

impl UpdatePostRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(content) = &self.content {
            if content.trim().is_empty() {
                return Err(ApiError::Validation("content must not be empty".into()));
            }
        }
        if let Some(keys) = &self.image_keys {
            validate_image_count(keys.len())?;
        }
        Ok(())
    }
}

/// PresignedUrlRequest
///
/// Input payload for requesting a short-lived upload URL
/// (POST /api/v1/uploads/presigned).
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, TS, Default)]
#[ts(export)]
pub struct PresignedUrlRequest {
    /// The original filename, used to derive the file extension.
    #[schema(example = "sunset.jpg")]
    pub filename: String,
    /// The MIME type the upload will be constrained to.
    #[schema(example = "image/jpeg")]
    pub file_type: String,
}

/// PresignedUrlResponse
///
/// The temporary URL for the client's direct-to-storage PUT, plus the object
/// key to reference the file in subsequent signup/post payloads.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS, Default)]
#[ts(export)]
pub struct PresignedUrlResponse {
    pub upload_url: String,
    pub resource_key: String,
}

// --- Validation helpers ---

fn validate_title(title: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::Validation("title must not be empty".into()));
    }
    if title.len() > MAX_TITLE_LEN {
        return Err(ApiError::Validation(format!(
            "title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_image_count(count: usize) -> Result<(), ApiError> {
    if count > MAX_POST_IMAGES {
        return Err(ApiError::Validation(format!(
            "a post can carry at most {MAX_POST_IMAGES} images"
        )));
    }
    Ok(())
}

fn is_plausible_email(email: &str) -> bool {
    let trimmed = email.trim();
    // Deliberately loose: one '@' with non-empty local and domain parts.
    match trimmed.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !trimmed.contains(char::is_whitespace)
        }
        None => false,
    }
}
