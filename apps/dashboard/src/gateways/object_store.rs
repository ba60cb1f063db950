use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::info;

use crate::gateways::GatewayError;
use crate::models::UserIdentity;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// `<prefix><sanitized identity>.pdf`. Deterministic per user, so a second
/// upload replaces the first.
pub fn resume_key(prefix: &str, user: &UserIdentity) -> String {
    format!("{prefix}{}.pdf", user.sanitized())
}

/// Blob storage backend. Writes overwrite; there is no versioning.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), GatewayError>;
}

pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), GatewayError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| GatewayError::Storage(format!("S3 upload failed: {e}")))?;

        info!("Uploaded resume to s3://{}/{}", self.bucket, key);
        Ok(())
    }
}

/// Uploads resumes under their user-derived key.
#[derive(Clone)]
pub struct ObjectStoreGateway {
    store: Arc<dyn ObjectStore>,
    prefix: String,
}

impl ObjectStoreGateway {
    pub fn new(store: Arc<dyn ObjectStore>, prefix: String) -> Self {
        Self { store, prefix }
    }

    /// Stores `file` as the user's resume and returns the storage key.
    pub async fn upload(&self, file: Bytes, user: &UserIdentity) -> Result<String, GatewayError> {
        let key = resume_key(&self.prefix, user);
        self.store.put_object(&key, file, PDF_CONTENT_TYPE).await?;
        Ok(key)
    }
}
