use anyhow::Context;
use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client as S3Client;
use std::path::Path;

use super::ObjectStore;
use crate::{Result, TranscriberError};

/// [`ObjectStore`] backed by one S3 bucket
pub struct S3Store {
    client: S3Client,
    bucket: String,
}

impl S3Store {
    pub fn new(sdk_config: &aws_types::SdkConfig, bucket: impl Into<String>) -> Self {
        Self {
            client: S3Client::new(sdk_config),
            bucket: bucket.into(),
        }
    }

    pub fn locator(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket, key)
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(&self, key: &str, local_file: &Path) -> Result<String> {
        tracing::info!("Uploading audio to S3: {}", self.locator(key));

        let content = tokio::fs::read(local_file)
            .await
            .with_context(|| format!("Failed to read {}", local_file.display()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(content.into())
            .content_type("audio/wav")
            .send()
            .await
            .map_err(|e| TranscriberError::Upload(format!("{}: {}", key, DisplayErrorContext(&e))))?;

        Ok(self.locator(key))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let response = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match response {
            Ok(_) => Ok(true),
            Err(err) => {
                let service_error = err.into_service_error();
                if service_error.is_not_found() {
                    Ok(false)
                } else {
                    Err(anyhow::Error::new(service_error).context("Failed to check S3 object"))
                }
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        tracing::debug!("Cleaning up S3 object: {}", key);

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .context("Failed to clean up S3 object")?;

        Ok(())
    }
}
