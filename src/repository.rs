use crate::models::{CreatePostRequest, NewUser, Post, UpdatePostRequest, User};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// The abstract persistence contract behind the guard pipeline and the
/// handlers. Guards and handlers depend only on this trait, so the backing
/// store can be Postgres in production and an in-memory mock in tests.
///
/// Authorization decisions are deliberately *not* made here: existence and
/// ownership are evaluated by the guard pipeline before any mutating method
/// is called, so the mutations below operate purely by id. Store failures
/// propagate as `sqlx::Error` and are mapped to a generic server error at
/// the edge, never retried inside the pipeline.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Credential store ---
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
    async fn create_user(&self, user: NewUser) -> Result<User, sqlx::Error>;

    // --- Post store ---
    async fn list_posts(&self) -> Result<Vec<Post>, sqlx::Error>;
    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, sqlx::Error>;
    async fn posts_by_owner(&self, user_id: Uuid) -> Result<Vec<Post>, sqlx::Error>;
    async fn create_post(
        &self,
        req: CreatePostRequest,
        user_id: Uuid,
    ) -> Result<Post, sqlx::Error>;
    /// Partial update by id. Returns `None` when the row vanished between
    /// the existence check and the write.
    async fn update_post(
        &self,
        id: Uuid,
        req: UpdatePostRequest,
    ) -> Result<Option<Post>, sqlx::Error>;
    /// Returns true if a row was deleted.
    async fn delete_post(&self, id: Uuid) -> Result<bool, sqlx::Error>;
}

/// RepositoryState
///
/// The concrete type used to share persistence access across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

const USER_COLUMNS: &str =
    "id, name, email, description, password_hash, role, status, profile_image, created_at";
const POST_COLUMNS: &str = "id, title, content, images, user_id, created_at, updated_at";

/// PostgresRepository
///
/// The production implementation of `Repository`, backed by a PgPool.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    /// New accounts always start as an active, non-admin user.
    async fn create_user(&self, user: NewUser) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, name, email, description, password_hash, role, status, profile_image, created_at) \
             VALUES ($1, $2, $3, $4, $5, 'user', 'active', $6, NOW()) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user.name)
        .bind(user.email)
        .bind(user.description)
        .bind(user.password_hash)
        .bind(user.profile_image)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_posts(&self) -> Result<Vec<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn posts_by_owner(&self, user_id: Uuid) -> Result<Vec<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn create_post(
        &self,
        req: CreatePostRequest,
        user_id: Uuid,
    ) -> Result<Post, sqlx::Error> {
        sqlx::query_as::<_, Post>(&format!(
            "INSERT INTO posts (id, title, content, images, user_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, NOW(), NOW()) \
             RETURNING {POST_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(req.title)
        .bind(req.content)
        .bind(req.image_keys)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
    }

    /// COALESCE keeps columns whose field was absent from the payload.
    async fn update_post(
        &self,
        id: Uuid,
        req: UpdatePostRequest,
    ) -> Result<Option<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>(&format!(
            "UPDATE posts \
             SET title = COALESCE($2, title), \
                 content = COALESCE($3, content), \
                 images = COALESCE($4, images), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {POST_COLUMNS}"
        ))
        .bind(id)
        .bind(req.title)
        .bind(req.content)
        .bind(req.image_keys)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
