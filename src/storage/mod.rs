use async_trait::async_trait;
use std::path::Path;

pub mod s3;

use crate::Result;

pub use s3::S3Store;

/// Bucket holding audio while a transcription job reads it
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload `local_file` under `key`, returning a locator the speech service can read
    async fn put(&self, key: &str, local_file: &Path) -> Result<String>;

    /// Check whether an object exists under `key`
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Delete the object under `key`
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Object key for an uploaded file: its local file name behind an optional prefix
pub fn object_key(prefix: Option<&str>, local_file: &Path) -> String {
    let name = local_file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}{}", prefix.unwrap_or(""), name)
}

/// Delete `key` if it exists. Failures are logged and swallowed.
pub async fn release_object(store: &dyn ObjectStore, key: &str) {
    match store.exists(key).await {
        Ok(true) => match store.delete(key).await {
            Ok(()) => tracing::debug!("Deleted uploaded object: {}", key),
            Err(e) => tracing::warn!("Could not delete uploaded object {}: {:#}", key, e),
        },
        Ok(false) => tracing::debug!("Uploaded object already gone: {}", key),
        Err(e) => tracing::warn!("Could not check uploaded object {}: {:#}", key, e),
    }
}
