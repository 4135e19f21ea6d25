use async_trait::async_trait;
use aws_sdk_s3 as s3;
use s3::presigning::PresigningConfig;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ApiError;

/// StorageService
///
/// The abstract contract for the image storage layer. Uploads never pass
/// through the application server: the handler hands the client a short-lived
/// presigned URL and the client PUTs the file straight to the bucket. The
/// resulting object key is what post and profile records reference.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Ensures the configured bucket exists. Used in the local setup to
    /// provision the bucket in MinIO automatically; a no-op elsewhere.
    async fn ensure_bucket_exists(&self);

    /// Generates a temporary signed URL allowing the client to upload one
    /// object directly to the bucket, constrained to `content_type`.
    async fn presigned_upload_url(
        &self,
        key: &str,
        content_type: &str,
    ) -> Result<String, ApiError>;
}

/// StorageState
///
/// The concrete type used to share storage access across the application
/// state.
pub type StorageState = Arc<dyn StorageService>;

/// How long a presigned upload URL stays valid.
const UPLOAD_URL_TTL: Duration = Duration::from_secs(600);

/// S3StorageClient
///
/// The production implementation over the AWS SDK. `force_path_style(true)`
/// keeps it compatible with MinIO and other S3-compatible gateways.
#[derive(Clone)]
pub struct S3StorageClient {
    client: s3::Client,
    bucket_name: String,
}

impl S3StorageClient {
    pub async fn new(
        endpoint: &str,
        region: &str,
        access_key: &str,
        secret_key: &str,
        bucket: &str,
    ) -> Self {
        let credentials =
            s3::config::Credentials::new(access_key, secret_key, None, None, "static");

        let config = s3::Config::builder()
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .region(s3::config::Region::new(region.to_string()))
            .behavior_version_latest()
            // Path-style addressing (http://endpoint/bucket/key) is required
            // for MinIO-style gateways.
            .force_path_style(true)
            .build();

        Self {
            client: s3::Client::from_conf(config),
            bucket_name: bucket.to_string(),
        }
    }
}

#[async_trait]
impl StorageService for S3StorageClient {
    /// CreateBucket is idempotent, so this is safe to call at every startup.
    async fn ensure_bucket_exists(&self) {
        let _ = self
            .client
            .create_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await;
    }

    async fn presigned_upload_url(
        &self,
        key: &str,
        content_type: &str,
    ) -> Result<String, ApiError> {
        let presigning = PresigningConfig::expires_in(UPLOAD_URL_TTL)
            .map_err(|e| ApiError::Internal(format!("presigning config: {e}")))?;

        let presigned_req = self
            .client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            // The signature binds the upload to this Content-Type.
            .content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(|e| ApiError::Internal(format!("presigning failed: {e}")))?;

        Ok(presigned_req.uri().to_string())
    }
}

/// sanitize_key
///
/// Strips directory navigation components (`..`, `.`, empty segments) from a
/// user-influenced key segment.
fn sanitize_key(key: &str) -> String {
    key.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// MockStorageService
///
/// Test double for `StorageService`: deterministic URLs, no network.
#[derive(Clone)]
pub struct MockStorageService {
    /// When true, all operations return a simulated failure.
    pub should_fail: bool,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self { should_fail: false }
    }

    pub fn new_failing() -> Self {
        Self { should_fail: true }
    }
}

impl Default for MockStorageService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn ensure_bucket_exists(&self) {}

    async fn presigned_upload_url(
        &self,
        key: &str,
        _content_type: &str,
    ) -> Result<String, ApiError> {
        if self.should_fail {
            return Err(ApiError::Internal(
                "mock storage failure requested".to_string(),
            ));
        }

        let sanitized_key = sanitize_key(key);
        Ok(format!(
            "http://localhost:9000/mock-bucket/{sanitized_key}?signature=fake"
        ))
    }
}
